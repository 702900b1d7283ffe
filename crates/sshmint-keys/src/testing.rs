// ABOUTME: Shared fixtures for unit tests in this crate.
// ABOUTME: Generates one RSA key per test binary since RSA generation is slow.

use crate::keypair::{generate_rsa, KeyPair};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::RsaPrivateKey;
use std::sync::OnceLock;

static RSA_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

pub(crate) fn rsa_key() -> RsaPrivateKey {
    RSA_KEY
        .get_or_init(|| {
            generate_rsa(&mut StdRng::seed_from_u64(0x5eed), 2048)
                .expect("should generate 2048-bit test key")
        })
        .clone()
}

pub(crate) fn rsa_pair(comment: &str) -> KeyPair {
    KeyPair::from_rsa(rsa_key(), comment)
}
