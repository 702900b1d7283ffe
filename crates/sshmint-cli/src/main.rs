// ABOUTME: Entry point for the sshmint command
// ABOUTME: Parses arguments, sets up logging and dispatches to the library

use anyhow::Result;
use clap::Parser;
use sshmint_cli::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    sshmint_log::init(cli.verbose);

    sshmint_cli::run(cli)
}
