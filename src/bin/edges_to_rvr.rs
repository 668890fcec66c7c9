//! Convert `link_id,downstream_link_id` pairs into an RVR topology file.

use anyhow::Result;
use clap::Parser;
use drainage_core::cli::{self, convert::ConvertArgs};

fn main() -> Result<()> {
    let args = ConvertArgs::parse();
    cli::setup_logging(args.verbose);
    cli::convert::run(&args)?;
    Ok(())
}
