// ABOUTME: SSH key pair generation and on-disk encoding for sshmint.
// ABOUTME: Generates ed25519/RSA keys, writes PEM + OpenSSH files, talks to ssh-agent.

//! # sshmint-keys
//!
//! Key pair handling for the `sshmint` command.
//!
//! ## Features
//!
//! - **Generation**: fresh ed25519 or 4096-bit RSA key pairs from the OS RNG
//! - **Encoding**: PKCS#8 (ed25519) or PKCS#1 (RSA) PEM private keys, optionally
//!   passphrase-encrypted, and single-line OpenSSH public keys
//! - **Persistence**: `<name>` and `<name>.pub` written with mode 0600
//! - **Agent**: register a generated identity with the running ssh-agent
//!
//! ## Example
//!
//! ```no_run
//! use sshmint_keys::{fingerprint, generate, save_key_pair, KeyAlgorithm};
//! use std::path::Path;
//!
//! let pair = generate(KeyAlgorithm::Ed25519, "me@laptop (sshmint)").expect("key should generate");
//! save_key_pair(&pair, Path::new("/home/me/.ssh/example"), Some("passphrase"))
//!     .expect("key should save");
//! println!("{}", fingerprint(&pair).expect("fingerprint should compute"));
//! ```

mod agent;
mod encode;
mod error;
mod fingerprint;
mod key;
mod keypair;
mod legacy;

#[cfg(test)]
mod testing;

pub use agent::{add_identity_message, add_to_agent, add_to_agent_at, agent_socket, AUTH_SOCK_ENV};
pub use encode::{
    decode_private_key, encode_private_key, encode_public_key, ENCRYPTED_PKCS8_PEM_LABEL,
    PKCS8_PEM_LABEL, RSA_PEM_LABEL,
};
pub use error::{KeyError, Result};
pub use fingerprint::fingerprint;
pub use key::{load_key_pair, public_key_path, save_key_pair, save_key_pair_unencrypted};
pub use keypair::{generate, generate_with_rng, KeyAlgorithm, KeyMaterial, KeyPair, RSA_KEY_SIZE};

// Re-exported so callers can hold passphrase-bearing buffers without another dependency
pub use pkcs8::der::zeroize::Zeroizing;
