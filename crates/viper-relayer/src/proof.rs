//! Relay proof assembly.
//!
//! A proof is built in two passes over the same fields: the unsigned proof
//! is reduced to its signing bytes by [`viper_core::proof_bytes`], then the
//! signature is attached to an otherwise identical proof.

use crate::error::Result;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use viper_core::{hash_request, proof_bytes, Aat, Node, RelayProof, RequestHash, Signer};

/// Draw fresh proof entropy, uniform in `[0, 2^63)`.
pub fn new_entropy() -> Result<i64> {
    let mut bytes = [0u8; 8];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok((u64::from_le_bytes(bytes) >> 1) as i64)
}

/// Build and sign the proof authorizing `node` to service `request`.
///
/// The session height is taken from the request metadata, so the proof
/// and the relay it accompanies always agree on it.
pub fn build_signed_proof(
    signer: &dyn Signer,
    node: &Node,
    request: &RequestHash,
    blockchain: &str,
    aat: &Aat,
    entropy: i64,
) -> Result<RelayProof> {
    let request_hash = hash_request(request)?;

    let unsigned = RelayProof {
        request_hash,
        entropy,
        session_block_height: request.meta.block_height,
        servicer_pub_key: node.public_key.clone(),
        blockchain: blockchain.to_string(),
        aat: aat.clone(),
        signature: String::new(),
    };

    let signing_bytes = proof_bytes(&unsigned)?;
    debug!(
        "Signing proof for servicer {} (request hash {})",
        unsigned.servicer_pub_key, unsigned.request_hash
    );
    let signature = signer.sign(&signing_bytes)?;

    Ok(RelayProof {
        signature,
        ..unsigned
    })
}
