use anyhow::Result;
use clap::Parser;

use textsieve::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
