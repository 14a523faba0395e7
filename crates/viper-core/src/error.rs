//! Error types for Viper network clients.

use thiserror::Error;

/// The main error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Canonical serialization failed while hashing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A hex-encoded address could not be decoded
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A hex-encoded public key could not be parsed
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The signing capability failed
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
}

/// Errors returned by a [`Signer`](crate::signing::Signer) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The private key material was rejected
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// The signing operation itself failed
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display() {
        let address_error = Error::InvalidAddress("zz: Invalid character 'z' at position 0".to_string());
        assert_eq!(
            format!("{}", address_error),
            "Invalid address: zz: Invalid character 'z' at position 0"
        );

        let key_error = Error::InvalidPublicKey("wrong length".to_string());
        assert_eq!(format!("{}", key_error), "Invalid public key: wrong length");

        let signer_error = Error::Signer(SignerError::Signing("hsm offline".to_string()));
        assert_eq!(format!("{}", signer_error), "Signer error: Signing failed: hsm offline");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let converted: Error = json_error.into();

        assert!(matches!(converted, Error::Serialization(_)));
        assert!(StdError::source(&converted).is_some());
    }

    #[test]
    fn test_signer_error_is_comparable() {
        let a = SignerError::InvalidKey("short".to_string());
        assert_eq!(a.clone(), a);
        assert_ne!(a, SignerError::Signing("short".to_string()));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
