// ABOUTME: The `sshmint add` workflow.
// ABOUTME: Generate, save, store passphrase, register with ssh-agent, update ssh_config.

use crate::cli::AddArgs;
use crate::identity::default_comment;
use crate::passphrase::generate_passphrase;
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};
use sshmint_config::update_host_in_config;
use sshmint_keys::{
    add_to_agent, fingerprint, generate, public_key_path, save_key_pair,
    save_key_pair_unencrypted, KeyAlgorithm, KeyError,
};
use sshmint_secrets::{open_store, MemoryStore, SecretStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const STEPS: usize = 4;

/// Everything `add` needs, resolved from flags, settings and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPlan {
    pub name: String,
    pub host_name: String,
    pub comment: String,
    pub algorithm: KeyAlgorithm,
    pub key_path: PathBuf,
    pub ssh_config: PathBuf,
    pub encrypt: bool,
    pub store_passphrase: bool,
    pub add_to_agent: bool,
}

impl AddPlan {
    /// Resolve the plan. Flags win over settings, settings over defaults.
    ///
    /// Fails if the name is not a plain file name or the key directory is
    /// missing or not a directory.
    pub fn resolve(config: Option<&Path>, args: &AddArgs, settings: &Settings) -> Result<Self> {
        validate_name(&args.name)?;

        let ssh_config = match config {
            Some(path) => path.to_path_buf(),
            None => match settings.ssh_config_expanded() {
                Some(path) => path,
                None => default_ssh_config()?,
            },
        };

        let key_directory = args
            .key_directory
            .clone()
            .or_else(|| settings.key_directory_expanded())
            .unwrap_or_else(|| config_directory(&ssh_config));
        let key_directory = absolute(&key_directory)?;
        check_key_directory(&key_directory)?;

        let algorithm = match args.key_type {
            Some(algorithm) => algorithm,
            None => settings.key_algorithm()?.unwrap_or_default(),
        };

        Ok(Self {
            name: args.name.clone(),
            host_name: args.host.clone().unwrap_or_else(|| args.name.clone()),
            comment: args.comment.clone().unwrap_or_else(default_comment),
            algorithm,
            key_path: key_directory.join(&args.name),
            ssh_config,
            encrypt: !args.no_passphrase,
            store_passphrase: !args.no_store && settings.store_passphrase,
            add_to_agent: !args.no_agent && settings.add_to_agent,
        })
    }
}

/// What `execute` did, for callers that report or test it.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub fingerprint: String,
    pub passphrase_store: Option<&'static str>,
    pub added_to_agent: bool,
}

/// Entry point for `sshmint add`.
pub fn run(config: Option<&Path>, settings: &Settings, args: &AddArgs) -> Result<()> {
    let plan = AddPlan::resolve(config, args, settings)?;

    // Open the keyring before any file is written so an unsupported
    // desktop fails without leaving a key behind.
    let memory = MemoryStore::new();
    let store: Box<dyn SecretStore> = if plan.encrypt && plan.store_passphrase {
        open_store().context("No system keyring for the passphrase (use --no-store to skip)")?
    } else {
        Box::new(memory.clone())
    };

    let outcome = execute(&plan, store)?;

    if plan.encrypt && !plan.store_passphrase {
        if let Some(passphrase) = memory.get(&outcome.key_path.display().to_string()) {
            println!();
            println!(
                "{} Passphrase was not stored anywhere. Keep it now:",
                "!".yellow().bold()
            );
            println!("  {passphrase}");
        }
    }

    println!();
    println!(
        "{} {} is ready: ssh {}",
        "✓".green().bold(),
        format!("Host {}", plan.name).bold(),
        plan.name
    );
    Ok(())
}

/// Carry out a resolved plan, storing the passphrase in `store`.
pub fn execute(plan: &AddPlan, store: Box<dyn SecretStore>) -> Result<AddOutcome> {
    println!(
        "{} Generating {} key pair...",
        step(1),
        plan.algorithm.as_str()
    );
    let pair = generate(plan.algorithm, plan.comment.clone())
        .context("Failed to generate key pair")?;
    let fingerprint = fingerprint(&pair).context("Failed to compute key fingerprint")?;
    println!("  Fingerprint: {}", fingerprint.dimmed());

    if plan.key_path.exists() {
        tracing::warn!(path = %plan.key_path.display(), "overwriting existing key file");
    }

    let passphrase = plan.encrypt.then(generate_passphrase);
    let saved = match &passphrase {
        Some(passphrase) => save_key_pair(&pair, &plan.key_path, Some(passphrase.as_str())),
        None => save_key_pair_unencrypted(&pair, &plan.key_path),
    };
    saved.with_context(|| format!("Failed to save key to {}", plan.key_path.display()))?;

    let public_key_path = public_key_path(&plan.key_path);
    println!(
        "  Wrote {} and {}",
        plan.key_path.display(),
        public_key_path.display()
    );

    let passphrase_store = match &passphrase {
        Some(passphrase) => {
            let name = store.name();
            println!("{} Storing passphrase in {}...", step(2), name);
            let identifier = plan.key_path.display().to_string();
            save_secret(store, &identifier, passphrase)?;
            Some(name)
        }
        None => {
            println!("{} Key is unencrypted, no passphrase to store", step(2));
            store.close().context("Failed to close secret store")?;
            None
        }
    };

    let added_to_agent = if plan.add_to_agent {
        println!("{} Adding key to ssh-agent...", step(3));
        register_with_agent(&pair)?;
        true
    } else {
        println!("{} Skipping ssh-agent", step(3));
        false
    };

    println!("{} Updating {}...", step(4), plan.ssh_config.display());
    update_host_in_config(&plan.ssh_config, &plan.name, &plan.host_name, &plan.key_path)
        .with_context(|| format!("Failed to update {}", plan.ssh_config.display()))?;

    tracing::info!(name = %plan.name, key = %plan.key_path.display(), "identity added");
    Ok(AddOutcome {
        key_path: plan.key_path.clone(),
        public_key_path,
        fingerprint,
        passphrase_store,
        added_to_agent,
    })
}

/// Save, then close; a close failure is only reported when the save worked.
fn save_secret(mut store: Box<dyn SecretStore>, identifier: &str, secret: &str) -> Result<()> {
    let saved = store.save(identifier, secret);
    let closed = store.close();
    saved.context("Failed to store passphrase")?;
    closed.context("Failed to close secret store")?;
    Ok(())
}

fn register_with_agent(pair: &sshmint_keys::KeyPair) -> Result<()> {
    match add_to_agent(pair) {
        Ok(()) => Ok(()),
        Err(e @ KeyError::AgentUnavailable) => {
            Err(e).context("Failed to add key to ssh-agent (use --no-agent to skip)")
        }
        Err(e) => Err(e).context("Failed to add key to ssh-agent"),
    }
}

fn step(n: usize) -> ColoredString {
    format!("[{n}/{STEPS}]").dimmed()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name is required");
    }
    if name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains(char::is_whitespace)
    {
        bail!("invalid name {name:?}: must be a single file name without whitespace");
    }
    Ok(())
}

fn default_ssh_config() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".ssh").join("config"))
}

fn config_directory(ssh_config: &Path) -> PathBuf {
    ssh_config
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(cwd.join(path))
}

fn check_key_directory(dir: &Path) -> Result<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => bail!("key directory path is not a directory: {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            bail!("key directory does not exist: {}", dir.display())
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            bail!("cannot access key directory: {}", dir.display())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to inspect key directory {}", dir.display())),
    }
}
