//! Protocol definitions for relays on the Viper network.
//!
//! This module defines the session, token and relay structures exchanged
//! between a client and the service nodes of its session. Field declaration
//! order is significant: several of these types are hashed through
//! [`crate::hashing`], and serde serializes struct fields in declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header identifying which application and chain a session serves.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionHeader {
    /// Public key of the application the session was dispatched for.
    pub app_public_key: String,
    /// Identifier of the relay chain (e.g. "0021").
    pub chain: String,
    /// Block height at which the session started.
    pub session_height: i64,
}

/// A service endpoint that can answer relays.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Hex-encoded address of the node.
    #[serde(default)]
    pub address: String,
    /// Chains the node is staked for.
    #[serde(default)]
    pub chains: Vec<String>,
    /// Whether the node is currently jailed.
    #[serde(default)]
    pub jailed: bool,
    /// Hex-encoded public key; the node's identity within a session.
    pub public_key: String,
    /// Base URL relays are posted to.
    #[serde(default)]
    pub service_url: String,
}

impl Node {
    /// Creates a node from its identity and endpoint.
    pub fn new(public_key: impl Into<String>, service_url: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            service_url: service_url.into(),
            ..Default::default()
        }
    }
}

/// The set of nodes authorized to serve an application on one chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub header: Option<SessionHeader>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Session {
    pub fn new(header: SessionHeader, nodes: Vec<Node>) -> Self {
        Self {
            header: Some(header),
            key: String::new(),
            nodes,
        }
    }
}

/// Application Authentication Token granting a client the right to relay
/// on an application's behalf.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Aat {
    pub version: String,
    pub app_pub_key: String,
    pub client_pub_key: String,
    /// Application signature over the token with this field cleared.
    pub signature: String,
}

impl Aat {
    /// Creates an unsigned token.
    pub fn new(
        version: impl Into<String>,
        app_pub_key: impl Into<String>,
        client_pub_key: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            app_pub_key: app_pub_key.into(),
            client_pub_key: client_pub_key.into(),
            signature: String::new(),
        }
    }
}

/// The application-level request carried by a relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayPayload {
    pub data: String,
    pub method: String,
    pub path: String,
    /// Serialized as `null` when absent; keys are always emitted sorted.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Protocol metadata accompanying a relay.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayMeta {
    /// Must equal the session height the proof is built for.
    pub block_height: i64,
}

/// The structure hashed into [`RelayProof::request_hash`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHash {
    pub payload: RelayPayload,
    pub meta: RelayMeta,
}

/// Signed artifact binding a request to a session, a servicer and a token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayProof {
    pub request_hash: String,
    pub entropy: i64,
    pub session_block_height: i64,
    pub servicer_pub_key: String,
    pub blockchain: String,
    pub aat: Aat,
    pub signature: String,
}

/// Body posted to a node's relay route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelayInput {
    pub payload: RelayPayload,
    pub meta: RelayMeta,
    pub proof: RelayProof,
}

/// A node's answer to a relay.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayOutput {
    pub response: String,
    pub signature: String,
}

/// Protocol constants.
pub mod constants {
    /// Route on a node's service URL that accepts relays.
    pub const CLIENT_RELAY_ROUTE: &str = "/v1/client/relay";

    /// Current AAT version.
    pub const AAT_VERSION: &str = "0.0.1";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_deserializes_dispatch_shape() {
        let json = r#"{
            "address": "0a5c2e4ab8bb1a9e3b0fe4bffc8b3cdb11df1b0e",
            "chains": ["0021", "0040"],
            "jailed": false,
            "public_key": "38dd8ce5ea93f6bd7bd12210ab5e6fdbb7a5ebb4d8ce3e80b5bfaa3a658c1f1b",
            "service_url": "https://node1.example.com:443",
            "status": 2,
            "tokens": "15000000000"
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.chains, vec!["0021", "0040"]);
        assert_eq!(node.service_url, "https://node1.example.com:443");
    }

    #[test]
    fn test_node_minimal() {
        let node: Node = serde_json::from_str(r#"{"public_key": "AOG"}"#).unwrap();
        assert_eq!(node, Node::new("AOG", ""));
    }

    #[test]
    fn test_session_without_header() {
        let session: Session = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
        assert!(session.header.is_none());
        assert!(session.nodes.is_empty());
    }

    #[test]
    fn test_relay_input_field_names() {
        let input = RelayInput {
            payload: RelayPayload {
                data: "{}".to_string(),
                method: "POST".to_string(),
                path: String::new(),
                headers: None,
            },
            meta: RelayMeta { block_height: 5 },
            proof: RelayProof::default(),
        };

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["meta"]["block_height"], 5);
        assert!(value["payload"]["headers"].is_null());
        assert!(value["proof"].get("session_block_height").is_some());
        assert!(value["proof"].get("servicer_pub_key").is_some());
        assert!(value["proof"]["aat"].get("app_pub_key").is_some());
    }

    #[test]
    fn test_aat_new_is_unsigned() {
        let aat = Aat::new(constants::AAT_VERSION, "app", "client");
        assert!(aat.signature.is_empty());
        assert_eq!(aat.version, "0.0.1");
    }
}
