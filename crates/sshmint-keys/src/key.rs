// ABOUTME: Persistence of generated key pairs to the filesystem.
// ABOUTME: Writes `<name>` and `<name>.pub` with owner-only permissions.

use crate::encode::{decode_private_key, encode_private_key, encode_public_key};
use crate::error::{KeyError, Result};
use crate::keypair::KeyPair;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of the public key that accompanies `key_path` (`<key_path>.pub`).
pub fn public_key_path(key_path: &Path) -> PathBuf {
    let mut path = key_path.as_os_str().to_owned();
    path.push(".pub");
    PathBuf::from(path)
}

/// Save a key pair under `key_path`.
///
/// With a non-empty passphrase the encrypted private key is written to
/// `key_path`; the public key line always goes to `<key_path>.pub`. Both
/// files are created 0600 and truncated if they already exist.
///
/// A failure part-way through is returned as a single error. A file written
/// before the failure is left in place.
///
/// # Errors
/// Returns an encoding error before touching the filesystem, or
/// `KeyError::WriteKey` / `KeyError::SetPermissions` naming the failed path.
pub fn save_key_pair(pair: &KeyPair, key_path: &Path, passphrase: Option<&str>) -> Result<()> {
    let private_key = match passphrase.filter(|p| !p.is_empty()) {
        Some(passphrase) => Some(encode_private_key(pair, Some(passphrase))?),
        None => None,
    };
    let public_key = encode_public_key(pair)?;

    if let Some(private_key) = private_key {
        write_key_file(key_path, private_key.as_bytes())?;
    }
    let pub_key_path = public_key_path(key_path);
    write_key_file(&pub_key_path, public_key.as_bytes())?;

    tracing::info!(
        private = %key_path.display(),
        public = %pub_key_path.display(),
        "saved key pair"
    );
    Ok(())
}

/// Save a key pair with an unencrypted private key document.
///
/// # Errors
/// Same as [`save_key_pair`].
pub fn save_key_pair_unencrypted(pair: &KeyPair, key_path: &Path) -> Result<()> {
    let private_key = encode_private_key(pair, None)?;
    let public_key = encode_public_key(pair)?;

    write_key_file(key_path, private_key.as_bytes())?;
    let pub_key_path = public_key_path(key_path);
    write_key_file(&pub_key_path, public_key.as_bytes())?;

    tracing::warn!(path = %key_path.display(), "saved private key without a passphrase");
    Ok(())
}

/// Load a private key document written by [`save_key_pair`].
///
/// # Errors
/// Returns `KeyError::ReadKey` if the file cannot be read, otherwise the
/// decoding errors of [`decode_private_key`].
pub fn load_key_pair(key_path: &Path, passphrase: Option<&str>) -> Result<KeyPair> {
    let document = std::fs::read_to_string(key_path).map_err(|e| KeyError::ReadKey {
        path: key_path.to_path_buf(),
        source: e,
    })?;
    decode_private_key(&document, passphrase)
}

fn write_key_file(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source| KeyError::WriteKey {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;

    // `mode` only applies on creation; tighten files that already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(|e| KeyError::SetPermissions {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    file.write_all(contents).map_err(write_err)?;
    file.flush().map_err(write_err)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote key file");
    Ok(())
}
