//! Transaction messages for account, application and node operations.
//!
//! Constructors take hex-encoded addresses and public keys as they appear
//! in wallets and CLIs, and reject malformed input before a message exists.
//! Messages serialize in the tagged `{"type": ..., "value": ...}` form.

use crate::error::{Error, Result};
use crate::identity::PublicKey;
use serde::{Deserialize, Serialize};

/// A message to be wrapped in a transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "value")]
pub enum TransactionMessage {
    #[serde(rename = "pos/Send")]
    Send(MsgSend),
    #[serde(rename = "apps/MsgAppStake")]
    StakeApp(MsgStakeApp),
    #[serde(rename = "apps/MsgAppBeginUnstake")]
    UnstakeApp(MsgUnstakeApp),
    #[serde(rename = "apps/MsgAppUnjail")]
    UnjailApp(MsgUnjailApp),
    #[serde(rename = "pos/MsgStake")]
    StakeNode(MsgStakeNode),
    #[serde(rename = "pos/MsgBeginUnstake")]
    UnstakeNode(MsgUnstakeNode),
    #[serde(rename = "pos/MsgUnjail")]
    UnjailNode(MsgUnjailNode),
}

impl TransactionMessage {
    /// The message type name used in the tagged encoding.
    pub fn msg_type(&self) -> &'static str {
        match self {
            TransactionMessage::Send(_) => "pos/Send",
            TransactionMessage::StakeApp(_) => "apps/MsgAppStake",
            TransactionMessage::UnstakeApp(_) => "apps/MsgAppBeginUnstake",
            TransactionMessage::UnjailApp(_) => "apps/MsgAppUnjail",
            TransactionMessage::StakeNode(_) => "pos/MsgStake",
            TransactionMessage::UnstakeNode(_) => "pos/MsgBeginUnstake",
            TransactionMessage::UnjailNode(_) => "pos/MsgUnjail",
        }
    }
}

/// Transfer between two accounts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgSend {
    #[serde(with = "hex::serde")]
    pub from_address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub to_address: Vec<u8>,
    #[serde(with = "decimal_string")]
    pub amount: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgStakeApp {
    pub pubkey: PublicKey,
    pub chains: Vec<String>,
    #[serde(with = "decimal_string")]
    pub value: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgUnstakeApp {
    #[serde(with = "hex::serde")]
    pub application_address: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgUnjailApp {
    #[serde(with = "hex::serde")]
    pub address: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgStakeNode {
    pub public_key: PublicKey,
    pub chains: Vec<String>,
    #[serde(with = "decimal_string")]
    pub value: i64,
    pub service_url: String,
    /// Account receiving rewards and unstaked funds.
    #[serde(with = "hex::serde")]
    pub output_address: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgUnstakeNode {
    #[serde(with = "hex::serde")]
    pub validator_address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signer_address: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MsgUnjailNode {
    #[serde(with = "hex::serde")]
    pub address: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signer_address: Vec<u8>,
}

fn decode_address(address: &str) -> Result<Vec<u8>> {
    hex::decode(address).map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))
}

/// Builds a transfer of `amount` from one account to another.
pub fn new_send(from_address: &str, to_address: &str, amount: i64) -> Result<TransactionMessage> {
    Ok(TransactionMessage::Send(MsgSend {
        from_address: decode_address(from_address)?,
        to_address: decode_address(to_address)?,
        amount,
    }))
}

/// Stakes an application for the given chains.
pub fn new_stake_app(public_key: &str, chains: Vec<String>, amount: i64) -> Result<TransactionMessage> {
    Ok(TransactionMessage::StakeApp(MsgStakeApp {
        pubkey: PublicKey::from_hex(public_key)?,
        chains,
        value: amount,
    }))
}

pub fn new_unstake_app(address: &str) -> Result<TransactionMessage> {
    Ok(TransactionMessage::UnstakeApp(MsgUnstakeApp {
        application_address: decode_address(address)?,
    }))
}

pub fn new_unjail_app(address: &str) -> Result<TransactionMessage> {
    Ok(TransactionMessage::UnjailApp(MsgUnjailApp {
        address: decode_address(address)?,
    }))
}

/// Stakes a node serving `chains` at `service_url`.
pub fn new_stake_node(
    public_key: &str,
    service_url: &str,
    output_address: &str,
    chains: Vec<String>,
    amount: i64,
) -> Result<TransactionMessage> {
    let public_key = PublicKey::from_hex(public_key)?;
    let output_address = decode_address(output_address)?;

    Ok(TransactionMessage::StakeNode(MsgStakeNode {
        public_key,
        chains,
        value: amount,
        service_url: service_url.to_string(),
        output_address,
    }))
}

/// Begins unstaking the node at `operator_address`, signed by `from_address`.
pub fn new_unstake_node(from_address: &str, operator_address: &str) -> Result<TransactionMessage> {
    let signer_address = decode_address(from_address)?;
    let validator_address = decode_address(operator_address)?;

    Ok(TransactionMessage::UnstakeNode(MsgUnstakeNode {
        validator_address,
        signer_address,
    }))
}

/// Unjails the node at `operator_address`, signed by `from_address`.
pub fn new_unjail_node(from_address: &str, operator_address: &str) -> Result<TransactionMessage> {
    let signer_address = decode_address(from_address)?;
    let address = decode_address(operator_address)?;

    Ok(TransactionMessage::UnjailNode(MsgUnjailNode {
        address,
        signer_address,
    }))
}

/// Integer amounts travel as decimal strings.
mod decimal_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
