//! srcdoc CLI binary entry point

use anyhow::Result;
use srcdoc_cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
