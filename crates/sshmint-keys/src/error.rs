// ABOUTME: Error types for key generation, encoding and persistence using thiserror.
// ABOUTME: Groups failures into algorithm, encoding, decoding, IO and agent errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing or persisting an SSH identity.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The requested key algorithm is not one sshmint can generate.
    #[error("unsupported key algorithm: {0} (supported: ed25519, rsa)")]
    UnsupportedAlgorithm(String),

    /// The key material is of a type the encoder does not handle.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Failed to generate key material.
    #[error("failed to generate key: {0}")]
    GenerateKey(String),

    /// Failed to marshal or encrypt a private key.
    #[error("failed to encode private key: {0}")]
    EncodePrivateKey(String),

    /// Failed to marshal a public key into OpenSSH format.
    #[error("failed to encode public key: {0}")]
    EncodePublicKey(String),

    /// Failed to parse or decrypt a private key document.
    #[error("failed to decode private key: {0}")]
    DecodeKey(String),

    /// The private key document is encrypted and no passphrase was given.
    #[error("private key is encrypted but no passphrase was supplied")]
    PassphraseRequired,

    /// Failed to read a key file from disk.
    #[error("failed to read key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a key file to disk.
    #[error("failed to write key to {path}: {source}")]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set file permissions.
    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `SSH_AUTH_SOCK` is not set or the platform has no agent socket.
    #[error("no SSH agent available (SSH_AUTH_SOCK is not set)")]
    AgentUnavailable,

    /// Failed to talk to the agent socket.
    #[error("could not connect to SSH agent at {socket}: {source}")]
    AgentConnect {
        socket: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The agent sent a reply that does not follow the protocol.
    #[error("unexpected reply from SSH agent: {0}")]
    AgentProtocol(String),

    /// The agent refused to add the identity.
    #[error("SSH agent refused to add the key")]
    AgentRejected,
}

/// Result type alias using KeyError.
pub type Result<T> = std::result::Result<T, KeyError>;
