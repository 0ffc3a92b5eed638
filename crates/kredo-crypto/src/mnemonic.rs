//! # BIP39 Mnemonics
//!
//! Human-transcribable seed phrases for identities. A phrase is accepted only
//! if it has at least [`MIN_MNEMONIC_WORDS`] words and passes the BIP39
//! English wordlist checksum.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;

/// Minimum accepted phrase length.
pub const MIN_MNEMONIC_WORDS: usize = 12;

/// Generate a fresh 12-word English mnemonic (128 bits of entropy).
pub fn generate_mnemonic() -> Result<String, CryptoError> {
    let mut entropy = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| CryptoError::InvalidSeedPhrase(e.to_string()));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

/// Parse and validate a phrase: word count first, then checksum.
pub fn validate_mnemonic(phrase: &str) -> Result<Mnemonic, CryptoError> {
    let words = phrase.split_whitespace().count();
    if words < MIN_MNEMONIC_WORDS {
        return Err(CryptoError::InvalidSeedPhrase(format!(
            "expected at least {MIN_MNEMONIC_WORDS} words, got {words}"
        )));
    }
    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| CryptoError::InvalidSeedPhrase(e.to_string()))
}

/// Derive the 32-byte identity seed from a phrase.
///
/// The seed is the first half of the BIP39 seed computed with an empty
/// passphrase.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let mnemonic = validate_mnemonic(phrase)?;
    let full = Zeroizing::new(mnemonic.to_seed(""));
    let mut seed = Zeroizing::new([0u8; 32]);
    seed.copy_from_slice(&full[..32]);
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_phrase_has_twelve_valid_words() {
        let phrase = generate_mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        validate_mnemonic(&phrase).unwrap();
    }

    #[test]
    fn short_phrase_rejected() {
        let err = validate_mnemonic("abandon abandon about").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSeedPhrase(_)));
    }

    #[test]
    fn bad_checksum_rejected() {
        let bad = VALID.replace("about", "abandon");
        assert!(matches!(
            validate_mnemonic(&bad),
            Err(CryptoError::InvalidSeedPhrase(_))
        ));
    }

    #[test]
    fn seed_is_deterministic() {
        let a = mnemonic_to_seed(VALID).unwrap();
        let b = mnemonic_to_seed(VALID).unwrap();
        assert_eq!(*a, *b);
    }
}
