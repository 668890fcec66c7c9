//! Accumulate a per-link attribute up or down a drainage network.

use anyhow::Result;
use clap::Parser;
use drainage_core::cli::{self, accumulate::AccumulateArgs};

fn main() -> Result<()> {
    let args = AccumulateArgs::parse();
    cli::setup_logging(args.verbose);
    cli::accumulate::run(&args)?;
    Ok(())
}
