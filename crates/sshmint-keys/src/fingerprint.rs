// ABOUTME: SSH public key fingerprint computation.
// ABOUTME: SHA256 over the wire-encoded public key, printed the way ssh-keygen -l does.

use crate::error::Result;
use crate::keypair::KeyPair;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Compute the `SHA256:<base64>` fingerprint of a key pair's public half.
///
/// The digest covers the same wire encoding that appears base64-encoded in
/// the `.pub` file, and the output uses unpadded base64 like `ssh-keygen -l`.
///
/// # Errors
/// Returns `KeyError::EncodePublicKey` if the key cannot be wire-encoded.
pub fn fingerprint(pair: &KeyPair) -> Result<String> {
    let hash = Sha256::digest(pair.public_key_blob()?);
    Ok(format!(
        "SHA256:{}",
        base64::engine::general_purpose::STANDARD_NO_PAD.encode(hash)
    ))
}
