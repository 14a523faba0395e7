//! # Viper Relayer
//!
//! Client-side relay construction and dispatch for the Viper network.
//!
//! Given a session, an application authentication token and a raw request,
//! the [`Relayer`] picks an authorized node, builds and signs a relay proof,
//! sends the relay through a [`Provider`] and returns the node's answer along
//! with the proof and node it used.
//!
//! - [`selection`]: session membership and uniform random node choice
//! - [`proof`]: entropy and signed proof assembly
//! - [`provider`]: the transport capability and its HTTP implementation
//! - [`relayer`]: the orchestrator and its validation gates
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use viper_core::{Aat, KeySigner, Node, Session, SessionHeader};
//! use viper_relayer::{HttpProvider, Relayer, RelayerInput};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = KeySigner::generate();
//! let relayer = Relayer::builder()
//!     .signer(client.clone())
//!     .provider(HttpProvider::new(Duration::from_secs(30))?)
//!     .build();
//!
//! let input = RelayerInput {
//!     blockchain: "0021".to_string(),
//!     data: r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#.to_string(),
//!     method: "POST".to_string(),
//!     session: Some(Session::new(
//!         SessionHeader { app_public_key: "…".into(), chain: "0021".into(), session_height: 100 },
//!         vec![Node::new("…", "https://node1.example.com")],
//!     )),
//!     aat: Some(Aat::new("0.0.1", "…", client.public_key().to_hex())),
//!     ..Default::default()
//! };
//!
//! let output = relayer.relay(&input, None).await?;
//! println!("{}", output.relay_output.response);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod proof;
pub mod provider;
pub mod relayer;
pub mod selection;

pub use error::{ProviderError, RelayError, RelayerError, Result, ValidationError};
pub use proof::{build_signed_proof, new_entropy};
pub use provider::{HttpProvider, Provider, RelayRequestOptions};
pub use relayer::{Relayer, RelayerBuilder, RelayerInput, RelayerOutput};
pub use selection::{is_node_in_session, random_session_node, select_node};
