// ABOUTME: Key pair generation for the algorithms sshmint provisions.
// ABOUTME: KeyPair is a tagged value over ed25519 and RSA private keys.

use crate::error::{KeyError, Result};
use ed25519_dalek::SigningKey;
use rand::{CryptoRng, RngCore};
use rsa::RsaPrivateKey;
use ssh_encoding::Encode;
use ssh_key::private::KeypairData;
use ssh_key::public::{Ed25519PublicKey, KeyData};
use ssh_key::{Algorithm, PrivateKey, PublicKey};
use std::fmt;
use std::str::FromStr;

/// RSA modulus size. Not configurable.
pub const RSA_KEY_SIZE: usize = 4096;

/// Key algorithms sshmint can generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    #[default]
    Ed25519,
    Rsa,
}

impl KeyAlgorithm {
    /// Name accepted on the command line and in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::Rsa => "rsa",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ed25519" => Ok(KeyAlgorithm::Ed25519),
            "rsa" => Ok(KeyAlgorithm::Rsa),
            other => Err(KeyError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl TryFrom<&Algorithm> for KeyAlgorithm {
    type Error = KeyError;

    fn try_from(algorithm: &Algorithm) -> Result<Self> {
        match algorithm {
            Algorithm::Ed25519 => Ok(KeyAlgorithm::Ed25519),
            Algorithm::Rsa { .. } => Ok(KeyAlgorithm::Rsa),
            other => Err(KeyError::UnsupportedAlgorithm(other.as_str().to_string())),
        }
    }
}

/// Private key material, tagged by algorithm.
#[derive(Clone, PartialEq)]
pub enum KeyMaterial {
    Ed25519(SigningKey),
    Rsa(Box<RsaPrivateKey>),
}

/// A generated SSH identity held in memory.
///
/// The public half is always derived from the private value, so the two
/// cannot drift apart. Only the serialized forms are ever written to disk.
#[derive(Clone, PartialEq)]
pub struct KeyPair {
    material: KeyMaterial,
    comment: String,
}

impl KeyPair {
    /// Wrap an existing ed25519 signing key.
    pub fn from_ed25519(key: SigningKey, comment: impl Into<String>) -> Self {
        Self {
            material: KeyMaterial::Ed25519(key),
            comment: comment.into(),
        }
    }

    /// Wrap an existing RSA private key.
    pub fn from_rsa(key: RsaPrivateKey, comment: impl Into<String>) -> Self {
        Self {
            material: KeyMaterial::Rsa(Box::new(key)),
            comment: comment.into(),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self.material {
            KeyMaterial::Ed25519(_) => KeyAlgorithm::Ed25519,
            KeyMaterial::Rsa(_) => KeyAlgorithm::Rsa,
        }
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// Comment as supplied by the caller, untrimmed.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Comment as it appears in the public key line: trimmed, single line.
    pub fn public_comment(&self) -> String {
        self.comment.trim().replace(['\r', '\n'], " ")
    }

    /// Public half as an `ssh_key` value, carrying the public comment.
    ///
    /// # Errors
    /// Returns `KeyError::EncodePublicKey` if the RSA modulus cannot be
    /// represented in SSH wire format.
    pub fn public_key(&self) -> Result<PublicKey> {
        let key_data = match &self.material {
            KeyMaterial::Ed25519(key) => {
                KeyData::Ed25519(Ed25519PublicKey(key.verifying_key().to_bytes()))
            }
            KeyMaterial::Rsa(key) => {
                let public = ssh_key::public::RsaPublicKey::try_from(&key.to_public_key())
                    .map_err(|e| KeyError::EncodePublicKey(e.to_string()))?;
                KeyData::Rsa(public)
            }
        };
        Ok(PublicKey::new(key_data, self.public_comment()))
    }

    /// SSH wire encoding of the public key, as base64-encoded in `.pub`
    /// files and hashed for fingerprints.
    ///
    /// # Errors
    /// Returns `KeyError::EncodePublicKey` if the key cannot be wire-encoded.
    pub fn public_key_blob(&self) -> Result<Vec<u8>> {
        let public = self.public_key()?;
        let mut blob = Vec::new();
        public
            .key_data()
            .encode(&mut blob)
            .map_err(|e| KeyError::EncodePublicKey(e.to_string()))?;
        Ok(blob)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .field("comment", &self.comment)
            .finish_non_exhaustive()
    }
}

impl TryFrom<&PrivateKey> for KeyPair {
    type Error = KeyError;

    /// Adopt a key read from an OpenSSH private key file.
    fn try_from(key: &PrivateKey) -> Result<Self> {
        match key.key_data() {
            KeypairData::Ed25519(keypair) => Ok(KeyPair::from_ed25519(
                SigningKey::from_bytes(&keypair.private.to_bytes()),
                key.comment(),
            )),
            KeypairData::Rsa(keypair) => {
                let rsa_key = RsaPrivateKey::try_from(keypair)
                    .map_err(|e| KeyError::DecodeKey(e.to_string()))?;
                Ok(KeyPair::from_rsa(rsa_key, key.comment()))
            }
            KeypairData::Encrypted(_) => Err(KeyError::PassphraseRequired),
            other => {
                let name = other
                    .algorithm()
                    .map(|alg| alg.as_str().to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                Err(KeyError::UnsupportedAlgorithm(name))
            }
        }
    }
}

/// Generate a new key pair using the thread-local CSPRNG.
///
/// # Errors
/// Returns `KeyError::GenerateKey` if RSA prime generation fails.
pub fn generate(algorithm: KeyAlgorithm, comment: impl Into<String>) -> Result<KeyPair> {
    generate_with_rng(algorithm, comment, &mut rand::thread_rng())
}

/// Generate a new key pair from the supplied random source.
///
/// Production callers go through [`generate`]; this entry point exists so a
/// seeded generator can produce reproducible vectors.
pub fn generate_with_rng<R>(
    algorithm: KeyAlgorithm,
    comment: impl Into<String>,
    rng: &mut R,
) -> Result<KeyPair>
where
    R: RngCore + CryptoRng,
{
    let comment = comment.into();
    tracing::debug!(algorithm = %algorithm, "generating key pair");

    let pair = match algorithm {
        KeyAlgorithm::Ed25519 => KeyPair::from_ed25519(SigningKey::generate(rng), comment),
        KeyAlgorithm::Rsa => KeyPair::from_rsa(generate_rsa(rng, RSA_KEY_SIZE)?, comment),
    };
    Ok(pair)
}

pub(crate) fn generate_rsa<R>(rng: &mut R, bits: usize) -> Result<RsaPrivateKey>
where
    R: RngCore + CryptoRng,
{
    RsaPrivateKey::new(rng, bits).map_err(|e| KeyError::GenerateKey(e.to_string()))
}
