//! Ed25519 signing keys for wallet contracts.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{WalletError, WalletResult};

/// An Ed25519 keypair derived from a wallet mnemonic.
///
/// The 32-byte private key is wiped on drop. The public key is what wallet
/// contracts store in their data cell.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519Keypair {
    private_key: [u8; 32],
    #[zeroize(skip)]
    public_key: [u8; 32],
    // SigningKey wipes itself on drop; private_key above holds the same secret.
    #[zeroize(skip)]
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Create a keypair from a 32-byte private key (seed).
    pub fn from_private_key(private_key: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&private_key);
        let public_key = signing_key.verifying_key().to_bytes();

        Self {
            private_key,
            public_key,
            signing_key,
        }
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> WalletResult<()> {
        let signature = Signature::from_bytes(signature);
        self.signing_key
            .verifying_key()
            .verify(message, &signature)
            .map_err(|_| WalletError::InvalidSignature)
    }
}

impl std::fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("public_key", &hex::encode(self.public_key))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let keypair = Ed25519Keypair::from_private_key([7u8; 32]);
        let signature = keypair.sign(b"ton20");
        assert!(keypair.verify(b"ton20", &signature).is_ok());
        assert!(matches!(
            keypair.verify(b"ton21", &signature),
            Err(WalletError::InvalidSignature)
        ));
    }

    #[test]
    fn test_deterministic_public_key() {
        let a = Ed25519Keypair::from_private_key([1u8; 32]);
        let b = Ed25519Keypair::from_private_key([1u8; 32]);
        let c = Ed25519Keypair::from_private_key([2u8; 32]);
        assert_eq!(a.public_key(), b.public_key());
        assert_ne!(a.public_key(), c.public_key());
    }

    #[test]
    fn test_debug_hides_private_key() {
        let keypair = Ed25519Keypair::from_private_key([9u8; 32]);
        let debug = format!("{:?}", keypair);
        assert!(debug.contains(&hex::encode(keypair.public_key())));
        assert!(!debug.contains(&hex::encode([9u8; 32])));
    }
}
