// ABOUTME: freedesktop Secret Service backend (GNOME Keyring) using secret-tool.
// ABOUTME: Items carry the `unique=ssh-store:<path>` attribute gnome-keyring's ssh integration uses.

use crate::command::Program;
use crate::error::Result;
use crate::store::SecretStore;

#[derive(Debug, Clone)]
pub struct SecretServiceStore {
    program: Program,
}

impl SecretServiceStore {
    pub fn new() -> Self {
        Self::with_program(Program::new("secret-tool"))
    }

    pub fn with_program(program: Program) -> Self {
        Self { program }
    }
}

impl Default for SecretServiceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for SecretServiceStore {
    fn name(&self) -> &'static str {
        "Secret Service"
    }

    fn save(&mut self, identifier: &str, secret: &str) -> Result<()> {
        let label = format!("Unlock password for: {identifier}");
        let unique = format!("ssh-store:{identifier}");
        self.program.run(
            ["store", "--label", label.as_str(), "unique", unique.as_str()],
            secret.as_bytes(),
        )?;
        tracing::info!(identifier, "stored passphrase in secret service");
        Ok(())
    }
}
