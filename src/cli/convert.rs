//! `edges_to_rvr`: build an RVR file from `link_id,downstream_link_id` pairs.

use crate::graph::Topology;
use crate::io;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "edges_to_rvr")]
#[command(version, about = "Convert a 'link_id,downstream_link_id' .csv file into an .rvr file", long_about = None)]
pub struct ConvertArgs {
    /// Input .csv file
    #[arg(long = "in-csv", alias = "in_csv", value_name = "CSV_PATH")]
    pub in_csv: PathBuf,

    /// Output .rvr file
    #[arg(long = "out-rvr", alias = "out_rvr", value_name = "RVR_PATH")]
    pub out_rvr: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: &ConvertArgs) -> Result<Topology> {
    let pairs = io::read_downstream_pairs(&args.in_csv)
        .with_context(|| format!("Failed to read pairs from '{}'", args.in_csv.display()))?;
    let topology = Topology::from_downstream_pairs(pairs);
    io::write_topology(&args.out_rvr, &topology).context("Failed to write output")?;
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::accumulate_upstream;
    use crate::store::LinkId;
    use crate::validation::TopologyValidator;
    use std::fs;

    #[test]
    fn test_pairs_become_rvr() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("pairs.csv");
        fs::write(&csv, "2,1\n3,1\n4,2\n").unwrap();

        let args = ConvertArgs { in_csv: csv, out_rvr: dir.path().join("out.rvr"), verbose: false };
        run(&args).unwrap();
        assert_eq!(fs::read_to_string(&args.out_rvr).unwrap(), "4\n1 2 2 3\n2 1 4\n3 0\n4 0\n");
    }

    #[test]
    fn test_repeated_and_redefined_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("pairs.csv");
        let out_rvr = dir.path().join("out.rvr");

        fs::write(&csv, "2,1\n2,1\n").unwrap();
        let args = ConvertArgs { in_csv: csv.clone(), out_rvr: out_rvr.clone(), verbose: false };
        let topology = run(&args).unwrap();
        assert_eq!(fs::read_to_string(&out_rvr).unwrap(), "2\n1 1 2\n2 0\n");

        let attributes = [(LinkId(1), 1.0), (LinkId(2), 1.0)].into_iter().collect();
        let up = accumulate_upstream(LinkId(1), &topology, &attributes).unwrap();
        assert_eq!(up.get(LinkId(1)), Some(2.0));

        // 2 is moved from 1 to 3; the later line wins.
        fs::write(&csv, "2,1\n3,1\n2,3\n").unwrap();
        let topology = run(&args).unwrap();
        assert_eq!(fs::read_to_string(&out_rvr).unwrap(), "3\n3 1 2\n2 0\n1 1 3\n");
        assert!(TopologyValidator::new(&topology).validate().is_ok());
    }

    #[test]
    fn test_missing_output_argument() {
        assert!(ConvertArgs::try_parse_from(["edges_to_rvr", "--in-csv", "p.csv"]).is_err());
    }
}
