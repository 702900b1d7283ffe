// ABOUTME: The SecretStore capability plus the in-memory and no-op stores.
// ABOUTME: Platform backends implement the same trait in their own modules.

use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Somewhere to put a key's passphrase so the user never has to type it.
///
/// `identifier` is the private key path, which is also the lookup key the
/// platform's ssh-askpass integration uses.
pub trait SecretStore {
    /// Short backend name for logs and messages.
    fn name(&self) -> &'static str;

    /// Store `secret` under `identifier`, replacing any previous value.
    fn save(&mut self, identifier: &str, secret: &str) -> Result<()>;

    /// Release the store. Errors here are reported after a successful save.
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn save(&mut self, identifier: &str, secret: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), secret.to_string());
        tracing::debug!(identifier, "stored secret in memory");
        Ok(())
    }
}

/// Accepts and discards every secret. Used on Windows, where OpenSSH has no
/// passphrase lookup to integrate with.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl SecretStore for NoopStore {
    fn name(&self) -> &'static str {
        "none"
    }

    fn save(&mut self, identifier: &str, _secret: &str) -> Result<()> {
        tracing::debug!(identifier, "secret store is a no-op on this platform");
        Ok(())
    }
}
