//! Signing capability used to authorize relays.
//!
//! The relay pipeline only needs something that turns bytes into a signature
//! string, so [`Signer`] is a single-method trait. [`KeySigner`] is the local
//! ed25519 implementation; remote or hardware-backed signers implement the
//! same trait.

use crate::error::SignerError;
use crate::identity::PublicKey;
use ed25519_dalek::{Signer as _, SigningKey, KEYPAIR_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

/// Produces a signature string over a payload.
#[cfg_attr(test, mockall::automock)]
pub trait Signer: Send + Sync {
    /// Sign `payload`, returning the hex-encoded signature.
    fn sign(&self, payload: &[u8]) -> Result<String, SignerError>;
}

/// An ed25519 signer holding its private key in memory.
#[derive(Clone)]
pub struct KeySigner {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeySigner {
    pub fn new(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Generates a random key using the operating system's RNG.
    pub fn generate() -> Self {
        Self::new(SigningKey::generate(&mut OsRng))
    }

    /// Loads a signer from a hex-encoded private key.
    ///
    /// Accepts either the 32-byte seed or the 64-byte `seed || public key`
    /// form exported by wallets. For the 64-byte form the embedded public key
    /// must match the seed.
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(private_key.trim_start_matches("0x"))
            .map_err(|e| SignerError::InvalidKey(format!("Failed to decode private key: {}", e)))?;

        let signing_key = match bytes.len() {
            SECRET_KEY_LENGTH => {
                let mut seed = [0u8; SECRET_KEY_LENGTH];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            KEYPAIR_LENGTH => {
                let mut keypair = [0u8; KEYPAIR_LENGTH];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| SignerError::InvalidKey(format!("Keypair mismatch: {}", e)))?
            }
            len => {
                return Err(SignerError::InvalidKey(format!(
                    "expected {} or {} bytes, got {}",
                    SECRET_KEY_LENGTH, KEYPAIR_LENGTH, len
                )))
            }
        };

        Ok(Self::new(signing_key))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> String {
        self.public_key.address()
    }

    /// Exports the private key in the 64-byte `seed || public key` form.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_keypair_bytes())
    }
}

impl Signer for KeySigner {
    fn sign(&self, payload: &[u8]) -> Result<String, SignerError> {
        let signature = self.signing_key.sign(payload);
        Ok(hex::encode(signature.to_bytes()))
    }
}

impl std::fmt::Debug for KeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySigner")
            .field("public_key", &self.public_key)
            .finish()
    }
}
