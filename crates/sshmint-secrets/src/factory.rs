// ABOUTME: Chooses the secret store backend for the running platform.
// ABOUTME: Decides once from the target OS and XDG_CURRENT_DESKTOP.

use crate::error::{Result, StoreError};
use crate::keychain::KeychainStore;
use crate::kwallet::KWalletStore;
use crate::secret_service::SecretServiceStore;
use crate::store::{NoopStore, SecretStore};

/// Environment variable naming the running desktop session(s).
pub const DESKTOP_ENV: &str = "XDG_CURRENT_DESKTOP";

/// The platform backends sshmint knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Keychain,
    KWallet,
    SecretService,
    Noop,
}

impl Backend {
    pub fn open(self) -> Box<dyn SecretStore> {
        match self {
            Backend::Keychain => Box::new(KeychainStore::new()),
            Backend::KWallet => Box::new(KWalletStore::new()),
            Backend::SecretService => Box::new(SecretServiceStore::new()),
            Backend::Noop => Box::new(NoopStore),
        }
    }
}

/// Pick a backend for `os` (as in `std::env::consts::OS`) and the value of
/// `XDG_CURRENT_DESKTOP`, if any.
pub fn detect_backend(os: &str, desktop: Option<&str>) -> Result<Backend> {
    match os {
        "macos" => Ok(Backend::Keychain),
        "windows" => Ok(Backend::Noop),
        "linux" => {
            // the variable is a colon-separated list such as "ubuntu:GNOME"
            let desktop = desktop.unwrap_or_default().to_ascii_lowercase();
            if desktop.contains("kde") {
                Ok(Backend::KWallet)
            } else if desktop.contains("gnome") {
                Ok(Backend::SecretService)
            } else if desktop.is_empty() {
                Err(StoreError::Unsupported("linux (no desktop session)".to_string()))
            } else {
                Err(StoreError::Unsupported(format!("linux (desktop: {desktop})")))
            }
        }
        other => Err(StoreError::Unsupported(other.to_string())),
    }
}

/// Open the secret store for the current process environment.
///
/// # Errors
/// Returns `StoreError::Unsupported` when no backend fits the platform.
pub fn open_store() -> Result<Box<dyn SecretStore>> {
    let desktop = std::env::var(DESKTOP_ENV).ok();
    let backend = detect_backend(std::env::consts::OS, desktop.as_deref())?;
    let store = backend.open();
    tracing::debug!(backend = store.name(), "opened secret store");
    Ok(store)
}
