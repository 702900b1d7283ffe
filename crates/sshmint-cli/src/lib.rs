// ABOUTME: Library half of the sshmint binary.
// ABOUTME: Argument types, settings, passphrase source and the add workflow.

pub mod add;
pub mod cli;
pub mod identity;
pub mod passphrase;
pub mod settings;

use anyhow::Result;
use cli::{Cli, Commands};
use settings::Settings;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;

    match &cli.command {
        Commands::Add(args) => add::run(cli.config.as_deref(), &settings, args),
    }
}
