//! `accumulate_attribute`: propagate a per-link attribute up or down the network.

use crate::graph::TopologyOptions;
use crate::propagation::{self, CumulativeMap};
use crate::store::{Direction, LinkId};
use crate::io;
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "accumulate_attribute")]
#[command(version, about = "Accumulate a per-link attribute along the drainage network", long_about = None)]
#[command(group(ArgGroup::new("direction").required(true).args(["up", "down"])))]
pub struct AccumulateArgs {
    /// Input .csv file with lines 'link_id,attribute'
    #[arg(long = "in-csv", alias = "in_csv", value_name = "IN_CSV_PATH")]
    pub in_csv: PathBuf,

    /// Input .rvr topology file
    #[arg(long = "in-rvr", alias = "in_rvr", value_name = "IN_RVR_PATH")]
    pub in_rvr: PathBuf,

    /// Outlet link id
    #[arg(long, value_name = "LINK_ID")]
    pub linkid: LinkId,

    /// Output .csv file with lines 'link_id,cumulative_value'
    #[arg(long = "out-csv", alias = "out_csv", value_name = "OUT_CSV_PATH")]
    pub out_csv: PathBuf,

    /// Accumulate from the headwaters toward the outlet
    #[arg(long)]
    pub up: bool,

    /// Accumulate from the outlet toward the headwaters
    #[arg(long)]
    pub down: bool,

    /// Abort if the topology header disagrees with the number of records
    #[arg(long)]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl AccumulateArgs {
    pub fn direction(&self) -> Direction {
        if self.up { Direction::Upstream } else { Direction::Downstream }
    }
}

/// Reads both inputs, propagates, and writes the output file.
///
/// Nothing is written unless propagation succeeds.
pub fn run(args: &AccumulateArgs) -> Result<CumulativeMap> {
    let attributes = io::read_attributes(&args.in_csv)
        .with_context(|| format!("Failed to read attributes from '{}'", args.in_csv.display()))?;
    let options = TopologyOptions { strict_node_count: args.strict };
    let topology = io::read_topology(&args.in_rvr, options)
        .with_context(|| format!("Failed to read topology from '{}'", args.in_rvr.display()))?;

    let direction = args.direction();
    info!("Accumulating '{}'", direction);
    let cumulative = propagation::accumulate(direction, args.linkid, &topology, &attributes)
        .with_context(|| format!("Output file '{}' was NOT generated", args.out_csv.display()))?;

    io::write_cumulative(&args.out_csv, &cumulative).context("Failed to write output")?;
    Ok(cumulative)
}
