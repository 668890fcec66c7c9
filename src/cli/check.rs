//! `check_topology`: report loops and downstream bifurcations in an RVR file.

use crate::graph::TopologyOptions;
use crate::io;
use crate::validation::{CheckSelection, TopologyValidator, ValidationReport};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckArg {
    /// Loop check only
    Loop,
    /// Downstream bifurcation check only
    Downbif,
    /// Every check
    All,
}

impl From<CheckArg> for CheckSelection {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::Loop => CheckSelection::Loop,
            CheckArg::Downbif => CheckSelection::Bifurcation,
            CheckArg::All => CheckSelection::All,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "check_topology")]
#[command(version, about = "Check an .rvr file for topological inconsistencies (loops or downstream bifurcation)", long_about = None)]
pub struct CheckArgs {
    /// Path of the .rvr file to evaluate
    #[arg(long = "in-rvr", alias = "in_rvr", value_name = "RVR_PATH")]
    pub in_rvr: PathBuf,

    /// Which check to perform
    #[arg(long, value_enum, default_value_t = CheckArg::All)]
    pub check: CheckArg,

    /// Also write the full report as JSON to this path
    #[arg(long, value_name = "JSON_PATH")]
    pub json: Option<PathBuf>,

    /// Abort if the header disagrees with the number of records
    #[arg(long)]
    pub strict: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: &CheckArgs) -> Result<ValidationReport> {
    let topology = io::read_topology(&args.in_rvr, TopologyOptions { strict_node_count: args.strict })
        .with_context(|| format!("Failed to read topology from '{}'", args.in_rvr.display()))?;

    let report = TopologyValidator::new(&topology).run(args.check.into());
    print_summary(&report);

    if let Some(path) = &args.json {
        io::write_report(path, &report).with_context(|| format!("Failed to write report to '{}'", path.display()))?;
    }
    Ok(report)
}

fn print_summary(report: &ValidationReport) {
    let verdict = |ok: bool| if ok { "SUCCESS" } else { "FAIL" };
    for error in &report.errors {
        println!("FAIL: {}", error.message);
    }
    if let Some(ok) = report.bifurcation_ok {
        println!("Downstream Bifurcation check: {}", verdict(ok));
    }
    if let Some(ok) = report.loop_ok {
        println!("Looping check: {}", verdict(ok));
    }
}
