//! The relay orchestrator.
//!
//! [`Relayer::relay`] runs one relay as a fixed sequence: validate the
//! input, resolve the servicer, hash the request, draw entropy, sign the
//! proof and hand the relay to the provider. The first failing step ends
//! the attempt; nothing is retried here.

use crate::error::{Result, ValidationError};
use crate::proof::{build_signed_proof, new_entropy};
use crate::provider::{Provider, RelayRequestOptions};
use crate::selection::select_node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use viper_core::{
    Aat, Node, RelayInput, RelayMeta, RelayOutput, RelayPayload, RelayProof, RequestHash, Session,
    SessionHeader, Signer,
};

/// Everything needed to send one relay.
///
/// Missing fields deserialize to their defaults; the relay gates then
/// report whichever required part is absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RelayerInput {
    pub blockchain: String,
    pub data: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub method: String,
    /// Servicer to use; a random session node is chosen when absent.
    pub node: Option<Node>,
    pub path: String,
    pub aat: Option<Aat>,
    pub session: Option<Session>,
}

/// Result of a successful relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayerOutput {
    pub relay_output: RelayOutput,
    pub proof: RelayProof,
    pub node: Node,
}

/// Relay parts that passed every precondition.
struct Validated<'a> {
    signer: &'a dyn Signer,
    provider: &'a dyn Provider,
    session: &'a Session,
    header: &'a SessionHeader,
    aat: &'a Aat,
}

/// Builds and sends signed relays through an injected signer and provider.
///
/// Both capabilities are fixed at construction. A relayer is safe to share
/// across tasks whenever its signer and provider are.
#[derive(Clone, Default)]
pub struct Relayer {
    signer: Option<Arc<dyn Signer>>,
    provider: Option<Arc<dyn Provider>>,
}

impl Relayer {
    pub fn new(signer: Option<Arc<dyn Signer>>, provider: Option<Arc<dyn Provider>>) -> Self {
        Self { signer, provider }
    }

    pub fn builder() -> RelayerBuilder {
        RelayerBuilder::default()
    }

    /// Check preconditions in their fixed order, stopping at the first failure.
    fn validate<'a>(&'a self, input: &'a RelayerInput) -> std::result::Result<Validated<'a>, ValidationError> {
        let signer = self.signer.as_deref().ok_or(ValidationError::NoSigner)?;
        let provider = self.provider.as_deref().ok_or(ValidationError::NoProvider)?;
        let session = input.session.as_ref().ok_or(ValidationError::NoSession)?;
        let aat = input.aat.as_ref().ok_or(ValidationError::NoAat)?;
        if session.nodes.is_empty() {
            return Err(ValidationError::SessionHasNoNodes);
        }
        let header = session.header.as_ref().ok_or(ValidationError::NoSessionHeader)?;

        Ok(Validated {
            signer,
            provider,
            session,
            header,
            aat,
        })
    }

    /// Send one relay, returning the node's answer with the proof and node used.
    ///
    /// Provider failures are returned unchanged inside
    /// [`RelayerError::Provider`](crate::error::RelayerError::Provider).
    pub async fn relay(
        &self,
        input: &RelayerInput,
        options: Option<&RelayRequestOptions>,
    ) -> Result<RelayerOutput> {
        let validated = self.validate(input)?;
        let node = select_node(validated.session, input.node.as_ref())?;
        debug!("Selected servicer {} at {}", node.public_key, node.service_url);

        let request = RequestHash {
            payload: RelayPayload {
                data: input.data.clone(),
                method: input.method.clone(),
                path: input.path.clone(),
                headers: input.headers.clone(),
            },
            meta: RelayMeta {
                block_height: validated.header.session_height,
            },
        };

        let entropy = new_entropy()?;
        let proof = build_signed_proof(
            validated.signer,
            node,
            &request,
            &input.blockchain,
            validated.aat,
            entropy,
        )?;

        let relay = RelayInput {
            payload: request.payload,
            meta: request.meta,
            proof,
        };

        let relay_output = validated
            .provider
            .relay(&node.service_url, &relay, options)
            .await?;
        info!(
            "Relay on {} serviced by {} at session height {}",
            input.blockchain, node.public_key, relay.meta.block_height
        );

        Ok(RelayerOutput {
            relay_output,
            proof: relay.proof,
            node: node.clone(),
        })
    }
}

impl std::fmt::Debug for Relayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relayer")
            .field("has_signer", &self.signer.is_some())
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

/// Assembles a [`Relayer`] from its capabilities.
#[derive(Default)]
pub struct RelayerBuilder {
    signer: Option<Arc<dyn Signer>>,
    provider: Option<Arc<dyn Provider>>,
}

impl RelayerBuilder {
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn build(self) -> Relayer {
        Relayer::new(self.signer, self.provider)
    }
}
