//! TON mnemonic key derivation.
//!
//! A TON mnemonic is 24 words. The wallet key is derived in two steps:
//!
//! ```text
//! entropy = HMAC-SHA512(key = words.join(" "), msg = "")
//! seed    = PBKDF2-HMAC-SHA512(entropy, "TON default seed", 100000, 64 bytes)
//! private = seed[0..32]
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{WalletError, WalletResult};
use crate::keys::Ed25519Keypair;

/// Number of words in a TON mnemonic.
pub const MNEMONIC_WORDS: usize = 24;

/// Number of PBKDF2 iterations for seed derivation.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt for TON seed derivation.
const TON_SEED_SALT: &[u8] = b"TON default seed";

/// Mnemonic phrase for wallet key derivation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic {
    words: Vec<String>,
}

impl Mnemonic {
    /// Parse a whitespace-separated phrase. Exactly 24 words are required.
    /// Words are kept as given and not checked against a word list.
    pub fn from_phrase(phrase: &str) -> WalletResult<Self> {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();

        if words.len() != MNEMONIC_WORDS {
            return Err(WalletError::WrongWordCount(words.len()));
        }

        Ok(Self { words })
    }

    /// Get the words in this mnemonic.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Convert to phrase string.
    pub fn to_phrase(&self) -> String {
        self.words.join(" ")
    }

    /// Derive the 64-byte seed.
    pub fn to_seed(&self) -> WalletResult<[u8; 64]> {
        let mut phrase = self.to_phrase();
        let mut mac = Hmac::<Sha512>::new_from_slice(phrase.as_bytes())
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;
        phrase.zeroize();
        mac.update(b"");
        let mut entropy = [0u8; 64];
        entropy.copy_from_slice(&mac.finalize().into_bytes());

        let mut seed = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(&entropy, TON_SEED_SALT, PBKDF2_ITERATIONS, &mut seed);
        entropy.zeroize();

        Ok(seed)
    }

    /// Derive the Ed25519 keypair.
    pub fn to_keypair(&self) -> WalletResult<Ed25519Keypair> {
        let mut seed = self.to_seed()?;
        let mut private_key = [0u8; 32];
        private_key.copy_from_slice(&seed[..32]);
        seed.zeroize();

        Ok(Ed25519Keypair::from_private_key(private_key))
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mnemonic({} words)", self.words.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TEST_PHRASE as PHRASE;

    #[test]
    fn test_from_phrase_word_count() {
        assert!(Mnemonic::from_phrase(PHRASE).is_ok());
        assert!(matches!(
            Mnemonic::from_phrase("one two three"),
            Err(WalletError::WrongWordCount(3))
        ));
        assert!(matches!(
            Mnemonic::from_phrase(""),
            Err(WalletError::WrongWordCount(0))
        ));
    }

    #[test]
    fn test_whitespace_normalized() {
        let messy = format!("  {}\n", PHRASE.replace(' ', "\t "));
        let a = Mnemonic::from_phrase(&messy).unwrap();
        let b = Mnemonic::from_phrase(PHRASE).unwrap();
        assert_eq!(a.words(), b.words());
        assert_eq!(a.to_seed().unwrap(), b.to_seed().unwrap());
    }

    #[test]
    fn test_case_preserved() {
        let upper = Mnemonic::from_phrase(&PHRASE.to_uppercase()).unwrap();
        let lower = Mnemonic::from_phrase(PHRASE).unwrap();
        assert_eq!(upper.to_phrase(), PHRASE.to_uppercase());
        assert_ne!(upper.to_seed().unwrap(), lower.to_seed().unwrap());
    }

    #[test]
    fn test_seed_vector() {
        let mnemonic = Mnemonic::from_phrase(PHRASE).unwrap();
        assert_eq!(
            hex::encode(mnemonic.to_seed().unwrap()),
            "25de517b8bc64311004febd377bf001953cc6261063bb2e531ce07f5a608fe84\
             ffce31e5e3dd3691a6737274c1296f4f23e88c70c9136ba5a2a4da3e0a6d2f09"
        );
    }

    #[test]
    fn test_public_key_vector() {
        let keypair = Mnemonic::from_phrase(PHRASE).unwrap().to_keypair().unwrap();
        assert_eq!(
            hex::encode(keypair.public_key()),
            "6141b8f893a3330a2df127018497a34fa00d901a3ccd693f9d3adb11a2b175b5"
        );
    }

    #[test]
    fn test_debug_hides_words() {
        let mnemonic = Mnemonic::from_phrase(PHRASE).unwrap();
        assert_eq!(format!("{:?}", mnemonic), "Mnemonic(24 words)");
    }
}
