//! Public-key identity for accounts on the Viper network.
//!
//! Accounts are ed25519 keys. An account's address is the first 20 bytes of
//! the SHA-256 digest of its public key.

use crate::error::{Error, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an account address.
pub const ADDRESS_LENGTH: usize = 20;

/// An ed25519 public key, hex-encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parses a hex-encoded 32-byte public key.
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes = hex::decode(public_key)
            .map_err(|e| Error::InvalidPublicKey(format!("{}: {}", public_key, e)))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            Error::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| Error::InvalidPublicKey(format!("{}: {}", public_key, e)))?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Raw address bytes derived from this key.
    pub fn address_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        let digest = Sha256::digest(self.as_bytes());
        let mut address = [0u8; ADDRESS_LENGTH];
        address.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        address
    }

    /// Hex-encoded address derived from this key.
    pub fn address(&self) -> String {
        hex::encode(self.address_bytes())
    }

    /// Checks a hex-encoded signature over `payload`.
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(bytes) = hex::decode(signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };
        self.0.verify(payload, &signature).is_ok()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
