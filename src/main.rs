mod cli;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    cli::app::run(Cli::parse())
}
