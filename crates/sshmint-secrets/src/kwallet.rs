// ABOUTME: KDE Wallet backend using kwallet-query.
// ABOUTME: Writes into the ksshaskpass folder that ksshaskpass reads from.

use crate::command::Program;
use crate::error::Result;
use crate::store::SecretStore;

const FOLDER: &str = "ksshaskpass";
const WALLET: &str = "kdewallet";

#[derive(Debug, Clone)]
pub struct KWalletStore {
    program: Program,
}

impl KWalletStore {
    pub fn new() -> Self {
        Self::with_program(Program::new("kwallet-query"))
    }

    pub fn with_program(program: Program) -> Self {
        Self { program }
    }
}

impl Default for KWalletStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KWalletStore {
    fn name(&self) -> &'static str {
        "KWallet"
    }

    fn save(&mut self, identifier: &str, secret: &str) -> Result<()> {
        self.program.run(
            ["--folder", FOLDER, "--write-password", identifier, WALLET],
            secret.as_bytes(),
        )?;
        tracing::info!(identifier, folder = FOLDER, "stored passphrase in kwallet");
        Ok(())
    }
}
