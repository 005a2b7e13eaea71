use anyhow::Result;
use clap::Parser;

use parex::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
