// ABOUTME: Error types for reading and writing SSH client config files.
// ABOUTME: Every variant names the file that failed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read an existing config file.
    #[error("failed to read SSH config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or write the config file.
    #[error("failed to write SSH config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
