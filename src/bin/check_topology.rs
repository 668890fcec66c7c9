//! Check an RVR topology for loops and downstream bifurcations.

use anyhow::Result;
use clap::Parser;
use drainage_core::cli::{self, check::CheckArgs};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = CheckArgs::parse();
    cli::setup_logging(args.verbose);
    let report = cli::check::run(&args)?;
    Ok(if report.is_valid() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
