// ABOUTME: Serialization of key pairs to private key documents and OpenSSH public key lines.
// ABOUTME: PKCS#8 for ed25519, classic PKCS#1 for RSA, plus the matching decoders.

use crate::error::{KeyError, Result};
use crate::keypair::{KeyMaterial, KeyPair};
use crate::legacy;
use base64::Engine;
use ed25519_dalek::SigningKey;
use pkcs8::der::zeroize::Zeroizing;
use pkcs8::pkcs5::pbes2;
use pkcs8::{
    DecodePrivateKey, EncodePrivateKey, EncryptedPrivateKeyInfo, LineEnding, PrivateKeyInfo,
    SecretDocument,
};
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::RsaPrivateKey;
use ssh_key::Algorithm;

/// Armor label of an unencrypted PKCS#8 document.
pub const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";
/// Armor label of an encrypted PKCS#8 document.
pub const ENCRYPTED_PKCS8_PEM_LABEL: &str = "ENCRYPTED PRIVATE KEY";
/// Armor label of a classic PKCS#1 RSA document, encrypted or not.
pub const RSA_PEM_LABEL: &str = "RSA PRIVATE KEY";

const PBKDF2_ITERATIONS: u32 = 10_000;
const PBKDF2_SALT_LEN: usize = 16;
const AES_IV_LEN: usize = 16;

/// Serialize the private key as an armored document.
///
/// A non-empty passphrase selects the encrypted form. Ed25519 keys become
/// PKCS#8 (`ENCRYPTED PRIVATE KEY` / `PRIVATE KEY`); RSA keys stay in the
/// classic PKCS#1 `RSA PRIVATE KEY` form that older tooling expects, with
/// OpenSSL `DEK-Info` encryption when a passphrase is given.
///
/// # Errors
/// Returns `KeyError::EncodePrivateKey` if marshaling or encryption fails.
pub fn encode_private_key(pair: &KeyPair, passphrase: Option<&str>) -> Result<Zeroizing<String>> {
    let passphrase = passphrase.filter(|p| !p.is_empty());

    match pair.material() {
        KeyMaterial::Ed25519(key) => encode_pkcs8(key, passphrase),
        KeyMaterial::Rsa(key) => encode_pkcs1(key, passphrase),
    }
}

fn encode_pkcs8(key: &SigningKey, passphrase: Option<&str>) -> Result<Zeroizing<String>> {
    let der = key.to_pkcs8_der().map_err(private_err)?;

    let Some(passphrase) = passphrase else {
        return der.to_pem(PKCS8_PEM_LABEL, LineEnding::LF).map_err(private_err);
    };

    let mut rng = rand::thread_rng();
    let mut salt = [0u8; PBKDF2_SALT_LEN];
    let mut iv = [0u8; AES_IV_LEN];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut iv);

    let params = pbes2::Parameters::pbkdf2_sha256_aes256cbc(PBKDF2_ITERATIONS, &salt, &iv)
        .map_err(private_err)?;
    let info = PrivateKeyInfo::try_from(der.as_bytes()).map_err(private_err)?;
    let encrypted = info
        .encrypt_with_params(params, passphrase.as_bytes())
        .map_err(private_err)?;

    encrypted
        .to_pem(ENCRYPTED_PKCS8_PEM_LABEL, LineEnding::LF)
        .map_err(private_err)
}

fn encode_pkcs1(key: &RsaPrivateKey, passphrase: Option<&str>) -> Result<Zeroizing<String>> {
    match passphrase {
        None => key
            .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
            .map_err(private_err),
        Some(passphrase) => {
            let der = key.to_pkcs1_der().map_err(private_err)?;
            legacy::encrypt_pem(RSA_PEM_LABEL, der.as_bytes(), passphrase.as_bytes())
        }
    }
}

/// Serialize the public key as one OpenSSH `authorized_keys` line.
///
/// The line is `<type> <base64>[ <comment>]\n`. The type is taken from the
/// key value itself, and the comment is only present when non-empty after
/// trimming.
///
/// # Errors
/// Returns `KeyError::EncodePublicKey` if the key cannot be wire-encoded and
/// `KeyError::UnsupportedKeyType` if it has no OpenSSH type name.
pub fn encode_public_key(pair: &KeyPair) -> Result<String> {
    let public = pair.public_key()?;
    let key_data = public.key_data();

    let algorithm = key_data.algorithm();
    if let Algorithm::Other(name) = &algorithm {
        return Err(KeyError::UnsupportedKeyType(name.as_str().to_string()));
    }

    let blob = pair.public_key_blob()?;

    let mut line = String::with_capacity(blob.len() * 4 / 3 + 64);
    line.push_str(algorithm.as_str());
    line.push(' ');
    line.push_str(&base64::engine::general_purpose::STANDARD.encode(blob));

    let comment = public.comment();
    if !comment.is_empty() {
        line.push(' ');
        line.push_str(comment);
    }
    line.push('\n');

    Ok(line)
}

/// Parse a document produced by [`encode_private_key`] back into a key pair.
///
/// The private key formats carry no comment, so the returned pair has an
/// empty one.
///
/// # Errors
/// Returns `KeyError::PassphraseRequired` for an encrypted document without
/// a passphrase and `KeyError::DecodeKey` for wrong passphrases, unknown
/// labels or malformed contents.
pub fn decode_private_key(document: &str, passphrase: Option<&str>) -> Result<KeyPair> {
    let passphrase = passphrase.filter(|p| !p.is_empty());

    if legacy::is_encrypted(document) {
        let passphrase = passphrase.ok_or(KeyError::PassphraseRequired)?;
        let (label, der) = legacy::decrypt_pem(document, passphrase.as_bytes())?;
        if label != RSA_PEM_LABEL {
            return Err(KeyError::DecodeKey(format!(
                "unexpected label for encrypted PEM: {label}"
            )));
        }
        return decode_pkcs1(&der);
    }

    let (label, doc) = SecretDocument::from_pem(document).map_err(decode_err)?;
    match label {
        RSA_PEM_LABEL => decode_pkcs1(doc.as_bytes()),
        PKCS8_PEM_LABEL => decode_pkcs8(doc.as_bytes()),
        ENCRYPTED_PKCS8_PEM_LABEL => {
            let passphrase = passphrase.ok_or(KeyError::PassphraseRequired)?;
            let info = EncryptedPrivateKeyInfo::try_from(doc.as_bytes()).map_err(decode_err)?;
            let decrypted = info.decrypt(passphrase.as_bytes()).map_err(decode_err)?;
            decode_pkcs8(decrypted.as_bytes())
        }
        other => Err(KeyError::DecodeKey(format!("unrecognized PEM label: {other}"))),
    }
}

fn decode_pkcs1(der: &[u8]) -> Result<KeyPair> {
    let key = RsaPrivateKey::from_pkcs1_der(der).map_err(decode_err)?;
    Ok(KeyPair::from_rsa(key, ""))
}

fn decode_pkcs8(der: &[u8]) -> Result<KeyPair> {
    if let Ok(key) = SigningKey::from_pkcs8_der(der) {
        return Ok(KeyPair::from_ed25519(key, ""));
    }
    let key = RsaPrivateKey::from_pkcs8_der(der).map_err(decode_err)?;
    Ok(KeyPair::from_rsa(key, ""))
}

fn private_err(e: impl std::fmt::Display) -> KeyError {
    KeyError::EncodePrivateKey(e.to_string())
}

fn decode_err(e: impl std::fmt::Display) -> KeyError {
    KeyError::DecodeKey(e.to_string())
}
