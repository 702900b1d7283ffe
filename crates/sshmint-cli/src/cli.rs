// ABOUTME: Command-line interface definition for sshmint.
// ABOUTME: Global options plus the `add` subcommand, parsed with clap derive.

use clap::{ArgAction, Args, Parser, Subcommand};
use sshmint_keys::{KeyAlgorithm, KeyError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sshmint")]
#[command(about = "Generate SSH keys and register them in your SSH config")]
#[command(version)]
pub struct Cli {
    /// Path to the SSH config file (defaults to ~/.ssh/config)
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the sshmint settings file (defaults to ~/.config/sshmint/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a key pair and add a Host entry for it
    Add(AddArgs),
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// Name for the key pair; also the Host alias and key file name
    #[arg(long)]
    pub name: String,

    /// Comment (e.g. email) to include in the public key
    #[arg(long)]
    pub comment: Option<String>,

    /// HostName to connect to (defaults to the name)
    #[arg(long, value_name = "HOSTNAME")]
    pub host: Option<String>,

    /// Key algorithm: ed25519 or rsa
    #[arg(long, value_name = "TYPE", value_parser = parse_algorithm)]
    pub key_type: Option<KeyAlgorithm>,

    /// Directory to store generated keys in (defaults to the SSH config's directory)
    #[arg(long, visible_alias = "key-dir", value_name = "DIR")]
    pub key_directory: Option<PathBuf>,

    /// Do not add the new key to the running ssh-agent
    #[arg(long)]
    pub no_agent: bool,

    /// Do not save the passphrase in the system keyring; print it instead
    #[arg(long)]
    pub no_store: bool,

    /// Write the private key unencrypted
    #[arg(long)]
    pub no_passphrase: bool,
}

fn parse_algorithm(value: &str) -> Result<KeyAlgorithm, String> {
    value.parse().map_err(|e: KeyError| e.to_string())
}
