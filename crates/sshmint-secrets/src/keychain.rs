// ABOUTME: macOS Keychain backend driven through `security -i`.
// ABOUTME: Stores generic passwords under the OpenSSH service, keyed by key path.

use crate::command::Program;
use crate::error::Result;
use crate::store::SecretStore;
use std::fmt::Write as _;

const SERVICE: &str = "OpenSSH";

/// Keychain items readable by `ssh-add --apple-load-keychain`.
#[derive(Debug, Clone)]
pub struct KeychainStore {
    program: Program,
}

impl KeychainStore {
    pub fn new() -> Self {
        Self::with_program(Program::new("security"))
    }

    pub fn with_program(program: Program) -> Self {
        Self { program }
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainStore {
    fn name(&self) -> &'static str {
        "macOS Keychain"
    }

    fn save(&mut self, identifier: &str, secret: &str) -> Result<()> {
        // Interactive mode reads the command from stdin, keeping the secret off argv.
        self.program
            .run(["-i"], add_command(identifier, secret).as_bytes())?;
        tracing::info!(identifier, "stored passphrase in keychain");
        Ok(())
    }
}

fn add_command(identifier: &str, secret: &str) -> String {
    let mut line = String::from("add-generic-password -U");
    let _ = write!(line, " -s {}", quote(SERVICE));
    let _ = write!(line, " -a {}", quote(identifier));
    let _ = write!(line, " -l {}", quote(&format!("SSH: {identifier}")));
    let _ = write!(line, " -w {}", quote(secret));
    line.push('\n');
    line
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
