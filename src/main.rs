use anyhow::Result;
use clap::Parser;

use zipmerge::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
