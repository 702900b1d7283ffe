// ABOUTME: Error types for secret store backends using thiserror.
// ABOUTME: Distinguishes unsupported platforms, missing helpers and helper failures.

use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No secret store backend exists for this platform or desktop.
    #[error("no supported secret store on {0}")]
    Unsupported(String),

    /// The helper program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The helper program ran and reported failure.
    #[error("{program} failed ({status}): {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Failed to exchange data with a running helper.
    #[error("secret store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_unsupported_display() {
        let err = StoreError::Unsupported("linux (desktop: xfce)".to_string());
        assert_eq!(
            err.to_string(),
            "no supported secret store on linux (desktop: xfce)"
        );
    }

    #[test]
    fn test_spawn_error_has_source() {
        let err = StoreError::Spawn {
            program: "secret-tool".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to run secret-tool: not found");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_error_converts() {
        let err: StoreError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
