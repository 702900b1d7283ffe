// ABOUTME: OpenSSL-style encrypted PEM used for classic RSA private keys.
// ABOUTME: DES-EDE3-CBC with an MD5 EVP_BytesToKey derivation and DEK-Info headers.

use crate::error::{KeyError, Result};
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use pkcs8::der::zeroize::Zeroizing;
use rand::RngCore;
use std::fmt::Write as _;

type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;

const PROC_TYPE_HEADER: &str = "Proc-Type";
const PROC_TYPE_ENCRYPTED: &str = "4,ENCRYPTED";
const DEK_INFO_HEADER: &str = "DEK-Info";
const DEK_CIPHER: &str = "DES-EDE3-CBC";

const IV_LEN: usize = 8;
const KEY_LEN: usize = 24;
const LINE_WIDTH: usize = 64;

/// Encrypt `der` under `passphrase` and armor it with encryption headers.
pub(crate) fn encrypt_pem(label: &str, der: &[u8], passphrase: &[u8]) -> Result<Zeroizing<String>> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    encrypt_pem_with_iv(label, der, passphrase, &iv)
}

fn encrypt_pem_with_iv(
    label: &str,
    der: &[u8],
    passphrase: &[u8],
    iv: &[u8; IV_LEN],
) -> Result<Zeroizing<String>> {
    let key = derive_key(passphrase, iv);
    let cipher = TdesCbcEnc::new_from_slices(&key[..], iv)
        .map_err(|e| KeyError::EncodePrivateKey(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(der);

    let encoded = base64::engine::general_purpose::STANDARD.encode(ciphertext);
    let mut out = Zeroizing::new(String::with_capacity(encoded.len() + 200));
    let _ = writeln!(out, "-----BEGIN {label}-----");
    let _ = writeln!(out, "{PROC_TYPE_HEADER}: {PROC_TYPE_ENCRYPTED}");
    let _ = writeln!(out, "{DEK_INFO_HEADER}: {DEK_CIPHER},{}", hex::encode_upper(iv));
    out.push('\n');
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII, so every chunk boundary is a char boundary
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    let _ = writeln!(out, "-----END {label}-----");
    Ok(out)
}

/// Whether `document` carries a `Proc-Type: 4,ENCRYPTED` header.
pub(crate) fn is_encrypted(document: &str) -> bool {
    document.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim() == PROC_TYPE_HEADER && value.trim() == PROC_TYPE_ENCRYPTED
        })
    })
}

/// Decrypt an armored document produced by [`encrypt_pem`].
///
/// Returns the armor label and the plaintext DER.
pub(crate) fn decrypt_pem(
    document: &str,
    passphrase: &[u8],
) -> Result<(String, Zeroizing<Vec<u8>>)> {
    let armor = parse_armor(document)?;

    let dek_info = armor
        .header(DEK_INFO_HEADER)
        .ok_or_else(|| KeyError::DecodeKey("missing DEK-Info header".to_string()))?;
    let (cipher_name, iv_hex) = dek_info
        .split_once(',')
        .ok_or_else(|| KeyError::DecodeKey(format!("malformed DEK-Info: {dek_info}")))?;
    if cipher_name.trim() != DEK_CIPHER {
        return Err(KeyError::DecodeKey(format!(
            "unsupported PEM cipher: {}",
            cipher_name.trim()
        )));
    }

    let iv: [u8; IV_LEN] = hex::decode(iv_hex.trim())
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| KeyError::DecodeKey(format!("malformed DEK-Info IV: {iv_hex}")))?;

    let key = derive_key(passphrase, &iv);
    let cipher = TdesCbcDec::new_from_slices(&key[..], &iv)
        .map_err(|e| KeyError::DecodeKey(e.to_string()))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&armor.body)
        .map_err(|_| KeyError::DecodeKey("incorrect passphrase or corrupt key".to_string()))?;

    Ok((armor.label, Zeroizing::new(plaintext)))
}

/// OpenSSL `EVP_BytesToKey` with MD5, one round, salted with the first
/// eight bytes of the IV.
fn derive_key(passphrase: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let mut digest: Vec<u8> = Vec::new();
    let mut filled = 0;

    while filled < KEY_LEN {
        let mut hasher = Md5::new();
        hasher.update(&digest);
        hasher.update(passphrase);
        hasher.update(&salt[..IV_LEN.min(salt.len())]);
        digest = hasher.finalize().to_vec();

        let take = (KEY_LEN - filled).min(digest.len());
        key[filled..filled + take].copy_from_slice(&digest[..take]);
        filled += take;
    }

    key
}

struct Armor {
    label: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Armor {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn parse_armor(document: &str) -> Result<Armor> {
    let mut lines = document.lines().map(str::trim_end);

    let label = lines
        .by_ref()
        .find_map(|line| {
            line.strip_prefix("-----BEGIN ")
                .and_then(|rest| rest.strip_suffix("-----"))
        })
        .ok_or_else(|| KeyError::DecodeKey("missing PEM begin line".to_string()))?
        .to_string();
    let end_line = format!("-----END {label}-----");

    let mut headers = Vec::new();
    let mut body = String::new();
    let mut in_headers = true;
    let mut closed = false;

    for line in lines {
        if line == end_line {
            closed = true;
            break;
        }
        if in_headers {
            if line.is_empty() {
                in_headers = false;
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
                continue;
            }
            in_headers = false;
        }
        body.push_str(line.trim());
    }

    if !closed {
        return Err(KeyError::DecodeKey(format!("missing `{end_line}`")));
    }

    let body = base64::engine::general_purpose::STANDARD
        .decode(body.as_bytes())
        .map_err(|e| KeyError::DecodeKey(format!("invalid base64 body: {e}")))?;

    Ok(Armor {
        label,
        headers,
        body,
    })
}
