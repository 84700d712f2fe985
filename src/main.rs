use anyhow::Result;
use clap::Parser;

use jobpool::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
