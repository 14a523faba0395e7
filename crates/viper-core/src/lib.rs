//! # Viper Core
//!
//! This crate provides the foundational types for clients of the Viper
//! proof-of-relay network: the session and relay data model, the canonical
//! hashing that binds relay proofs to requests, and the signing capability
//! used to authorize them.
//!
//! ## Core Components
//!
//! ### Message Protocol ([`protocol`])
//!
//! Sessions, nodes, application authentication tokens (AATs), relay payloads
//! and relay proofs, serialized with the network's field names.
//!
//! ### Canonical Hashing ([`hashing`])
//!
//! Deterministic SHA3-256 digests over byte-exact JSON:
//! - [`hash_aat`] and [`hash_request`] for the hex digests embedded in proofs
//! - [`proof_bytes`] for the bytes a client signs
//!
//! ### Signing ([`signing`]) and Identity ([`identity`])
//!
//! The single-method [`Signer`] capability, an ed25519 [`KeySigner`], and
//! hex-encoded public keys with address derivation.
//!
//! ### Transaction Messages ([`transaction`])
//!
//! Constructors for send, stake, unstake and unjail messages.
//!
//! ## Usage Examples
//!
//! ```rust
//! use viper_core::{hash_request, RelayMeta, RelayPayload, RequestHash};
//!
//! let request = RequestHash {
//!     payload: RelayPayload {
//!         data: r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#.to_string(),
//!         method: "POST".to_string(),
//!         path: String::new(),
//!         headers: None,
//!     },
//!     meta: RelayMeta { block_height: 100 },
//! };
//!
//! let digest = hash_request(&request)?;
//! assert_eq!(digest.len(), 64);
//! # Ok::<(), viper_core::Error>(())
//! ```
//!
//! ```rust
//! use viper_core::{Aat, KeySigner};
//!
//! let app = KeySigner::generate();
//! let client = KeySigner::generate();
//! let aat = Aat::new("0.0.1", app.public_key().to_hex(), client.public_key().to_hex())
//!     .sign(&app)?;
//! assert!(!aat.signature.is_empty());
//! # Ok::<(), viper_core::Error>(())
//! ```

pub mod error;
pub mod hashing;
pub mod identity;
pub mod protocol;
pub mod signing;
pub mod transaction;

pub use error::{Error, Result, SignerError};
pub use hashing::{canonical_json, hash_aat, hash_request, proof_bytes};
pub use identity::PublicKey;
pub use protocol::{
    Aat, Node, RelayInput, RelayMeta, RelayOutput, RelayPayload, RelayProof, RequestHash, Session,
    SessionHeader,
};
pub use signing::{KeySigner, Signer};
pub use transaction::TransactionMessage;
