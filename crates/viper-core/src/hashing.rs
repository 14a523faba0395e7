//! Canonical hashing of tokens, requests and relay proofs.
//!
//! Every node re-derives these digests to verify a relay, so the serialized
//! bytes must match the network's JSON encoder exactly:
//!
//! - compact output, struct fields in declaration order, map keys sorted;
//! - `<`, `>`, `&`, U+2028 and U+2029 escaped as `\u003c`, `\u003e`,
//!   `\u0026`, `\u2028` and `\u2029`.
//!
//! The digest is SHA3-256. Token and request hashes are lowercase hex; the
//! proof digest is handed to the signer as raw bytes.

use crate::error::Result;
use crate::protocol::{Aat, RelayProof, RequestHash};
use crate::signing::Signer;
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use std::io;

/// Length in bytes of every digest produced here.
pub const DIGEST_LENGTH: usize = 32;

/// serde_json formatter that escapes HTML-significant characters and the
/// JavaScript line terminators the same way the network does.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl serde_json::ser::Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            if start < index {
                writer.write_all(fragment[start..index].as_bytes())?;
            }
            writer.write_all(escaped.as_bytes())?;
            start = index + ch.len_utf8();
        }
        if start < fragment.len() {
            writer.write_all(fragment[start..].as_bytes())?;
        }
        Ok(())
    }
}

/// Serializes `value` to the canonical JSON bytes used for hashing.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, CanonicalFormatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// SHA3-256 of `bytes`.
pub fn sha3_256(bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    Sha3_256::digest(bytes).into()
}

fn digest_of<T: Serialize + ?Sized>(value: &T) -> Result<[u8; DIGEST_LENGTH]> {
    Ok(sha3_256(&canonical_json(value)?))
}

/// Token with its signature cleared, in wire field order.
#[derive(Serialize)]
struct UnsignedAat<'a> {
    version: &'a str,
    app_pub_key: &'a str,
    client_pub_key: &'a str,
    signature: &'a str,
}

impl<'a> From<&'a Aat> for UnsignedAat<'a> {
    fn from(aat: &'a Aat) -> Self {
        Self {
            version: &aat.version,
            app_pub_key: &aat.app_pub_key,
            client_pub_key: &aat.client_pub_key,
            signature: "",
        }
    }
}

fn aat_digest(aat: &Aat) -> Result<[u8; DIGEST_LENGTH]> {
    digest_of(&UnsignedAat::from(aat))
}

/// Hex digest of a token with its signature field treated as empty.
pub fn hash_aat(aat: &Aat) -> Result<String> {
    Ok(hex::encode(aat_digest(aat)?))
}

/// Hex digest of a request payload together with its relay metadata.
pub fn hash_request(request: &RequestHash) -> Result<String> {
    Ok(hex::encode(digest_of(request)?))
}

/// The proof as it is signed: the token replaced by its hash and the
/// signature forced empty. The field order here is the network's, not
/// [`RelayProof`]'s.
#[derive(Serialize)]
struct ProofForSignature<'a> {
    entropy: i64,
    session_block_height: i64,
    servicer_pub_key: &'a str,
    blockchain: &'a str,
    signature: &'a str,
    token: String,
    request_hash: &'a str,
}

/// Bytes a client signs to authorize `proof`.
///
/// `proof.signature` is ignored, so the digest of a signed proof equals
/// the digest of the same proof before signing.
pub fn proof_bytes(proof: &RelayProof) -> Result<[u8; DIGEST_LENGTH]> {
    let for_signature = ProofForSignature {
        entropy: proof.entropy,
        session_block_height: proof.session_block_height,
        servicer_pub_key: &proof.servicer_pub_key,
        blockchain: &proof.blockchain,
        signature: "",
        token: hash_aat(&proof.aat)?,
        request_hash: &proof.request_hash,
    };
    digest_of(&for_signature)
}

impl Aat {
    /// Hex digest of this token with the signature cleared.
    pub fn hash(&self) -> Result<String> {
        hash_aat(self)
    }

    /// Signs this token on behalf of its application.
    ///
    /// The application signs the raw digest of the signature-cleared token.
    pub fn sign(mut self, app_signer: &dyn Signer) -> Result<Self> {
        let digest = aat_digest(&self)?;
        self.signature = app_signer.sign(&digest)?;
        Ok(self)
    }
}
