// ABOUTME: Passphrase storage for generated SSH keys.
// ABOUTME: One SecretStore trait, a backend per platform and a factory that picks one.

//! # sshmint-secrets
//!
//! After `sshmint` writes an encrypted private key it hands the passphrase
//! to the desktop keyring so `ssh-add` and askpass helpers can unlock the
//! key without prompting.
//!
//! | platform            | backend                                    |
//! |---------------------|--------------------------------------------|
//! | macOS               | Keychain via `security -i`                 |
//! | Linux, KDE          | KWallet via `kwallet-query`                |
//! | Linux, GNOME        | Secret Service via `secret-tool`           |
//! | Windows             | no-op                                      |
//!
//! Callers only see [`SecretStore`]; [`open_store`] makes the choice.

mod command;
mod error;
mod factory;
mod keychain;
mod kwallet;
mod secret_service;
mod store;

pub use command::Program;
pub use error::{Result, StoreError};
pub use factory::{detect_backend, open_store, Backend, DESKTOP_ENV};
pub use keychain::KeychainStore;
pub use kwallet::KWalletStore;
pub use secret_service::SecretServiceStore;
pub use store::{MemoryStore, NoopStore, SecretStore};
