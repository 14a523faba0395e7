//! Error types for relay construction and dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use viper_core::SignerError;

/// Preconditions checked before any node selection or signing.
///
/// Variants are listed in the order the relayer checks them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    #[error("no signer provided")]
    NoSigner,
    #[error("no provider provided")]
    NoProvider,
    #[error("no session provided")]
    NoSession,
    #[error("no AAT provided")]
    NoAat,
    #[error("session has no nodes")]
    SessionHasNoNodes,
    #[error("no session header provided")]
    NoSessionHeader,
    #[error("node not in session")]
    NodeNotInSession,
}

/// Structured error returned by a node that rejected a relay.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Request failed with code: {code}, codespace: {codespace} and message: {message}")]
pub struct RelayError {
    pub code: i64,
    pub codespace: String,
    pub message: String,
}

/// Failures of the transport that delivers a relay to a node.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The node answered with a 5xx status
    #[error("Server error on connection: status {status}")]
    Server { status: u16 },

    /// The node answered with a 4xx status and no structured error
    #[error("Client error on connection: status {status}")]
    Client { status: u16 },

    #[error("Unexpected response code on connection: status {status}")]
    UnexpectedStatus { status: u16 },

    /// The node rejected the relay with a structured error body
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("Non-JSON response: {0}")]
    NonJsonResponse(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Every way a relay attempt can fail.
#[derive(Error, Debug)]
pub enum RelayerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Canonical serialization of the request, token or proof failed
    #[error("Hashing error: {0}")]
    Hashing(#[from] viper_core::Error),

    #[error("Entropy error: {0}")]
    Entropy(#[from] rand::Error),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    /// Passed through from the provider unchanged
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl RelayerError {
    /// The failed precondition, if this error is one.
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            RelayerError::Validation(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience type alias for relay results.
pub type Result<T> = std::result::Result<T, RelayerError>;
