// ABOUTME: Random passphrase generation for new private keys.
// ABOUTME: 64 characters, exactly 10 digits and 10 symbols, no repeated characters.

use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};
use sshmint_keys::Zeroizing;

pub const PASSPHRASE_LEN: usize = 64;
pub const DIGIT_COUNT: usize = 10;
pub const SYMBOL_COUNT: usize = 10;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
// no quotes, backticks or backslashes: the passphrase travels through
// keyring helper command lines
const SYMBOLS: &[u8] = b"~!@#$%^&*()_+-={}|[]:<>?,./";

/// Generate a passphrase from the thread-local CSPRNG.
pub fn generate_passphrase() -> Zeroizing<String> {
    generate_passphrase_with_rng(&mut rand::thread_rng())
}

pub fn generate_passphrase_with_rng<R: Rng + CryptoRng>(rng: &mut R) -> Zeroizing<String> {
    let letter_count = PASSPHRASE_LEN - DIGIT_COUNT - SYMBOL_COUNT;

    let mut chars: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(PASSPHRASE_LEN));
    chars.extend(LETTERS.choose_multiple(rng, letter_count));
    chars.extend(DIGITS.choose_multiple(rng, DIGIT_COUNT));
    chars.extend(SYMBOLS.choose_multiple(rng, SYMBOL_COUNT));
    chars.shuffle(rng);

    // every source byte is ASCII
    Zeroizing::new(chars.iter().map(|&b| char::from(b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_composition() {
        let passphrase = generate_passphrase();

        assert_eq!(passphrase.len(), PASSPHRASE_LEN);
        assert_eq!(passphrase.chars().filter(char::is_ascii_digit).count(), DIGIT_COUNT);
        assert_eq!(
            passphrase.bytes().filter(|b| SYMBOLS.contains(b)).count(),
            SYMBOL_COUNT
        );
        assert_eq!(
            passphrase.chars().filter(char::is_ascii_alphabetic).count(),
            PASSPHRASE_LEN - DIGIT_COUNT - SYMBOL_COUNT
        );
    }

    #[test]
    fn test_no_repeated_or_quoting_characters() {
        let passphrase = generate_passphrase();
        let unique: HashSet<char> = passphrase.chars().collect();
        assert_eq!(unique.len(), PASSPHRASE_LEN);
        assert!(!passphrase.contains(['"', '\'', '`', '\\']));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_passphrase_with_rng(&mut StdRng::seed_from_u64(1));
        let b = generate_passphrase_with_rng(&mut StdRng::seed_from_u64(1));
        let c = generate_passphrase_with_rng(&mut StdRng::seed_from_u64(2));
        assert_eq!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn test_symbol_set_is_large_enough() {
        let unique: HashSet<&u8> = SYMBOLS.iter().collect();
        assert_eq!(unique.len(), SYMBOLS.len());
        assert!(SYMBOLS.len() >= SYMBOL_COUNT);
        assert!(LETTERS.len() >= PASSPHRASE_LEN - DIGIT_COUNT - SYMBOL_COUNT);
    }
}
