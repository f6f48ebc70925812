//! Wire records of the Nimiq node JSON-RPC API.
//!
//! Field names follow the node's camelCase JSON. Optional wire fields are
//! `Option`s so an absent value is never confused with a zero. All amounts
//! are [`Luna`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::currency::Luna;

// ==============================================================================
// Enumerations
// ==============================================================================

/// Account kind as reported in the numeric `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AccountType {
    Basic,
    Vesting,
    Htlc,
}

impl From<AccountType> for u8 {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Basic => 0,
            AccountType::Vesting => 1,
            AccountType::Htlc => 2,
        }
    }
}

impl TryFrom<u8> for AccountType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Basic),
            1 => Ok(Self::Vesting),
            2 => Ok(Self::Htlc),
            other => Err(format!("unknown account type {other}")),
        }
    }
}

/// Log level accepted by the node's `log` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

/// State change that `peerState` can apply to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerStateCommand {
    Ban,
    Unban,
    Connect,
    Disconnect,
}

impl PeerStateCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for PeerStateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeerStateCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            "connect" => Ok(Self::Connect),
            "disconnect" => Ok(Self::Disconnect),
            other => Err(format!("unknown peer state command `{other}`")),
        }
    }
}

// ==============================================================================
// Accounts and Wallets
// ==============================================================================

/// Account details. Vesting and HTLC fields are only present for accounts of
/// that [`AccountType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Hex-encoded address bytes.
    pub id: String,
    /// User friendly address (`NQ..`).
    pub address: String,
    pub balance: Luna,
    #[serde(rename = "type")]
    pub account_type: AccountType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_step_blocks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_step_amount: Option<Luna>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_total_amount: Option<Luna>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Luna>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub address: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

// ==============================================================================
// Transactions
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Blocks mined on top of the containing block, 0 while pending.
    pub confirmations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_index: Option<u32>,

    pub from: String,
    pub from_address: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,

    pub value: Luna,
    pub fee: Luna,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub flags: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub transaction_index: u32,
    pub block_hash: String,
    pub block_number: u32,
    pub confirmations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// A transaction to be created and signed by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingTransaction {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_type: Option<AccountType>,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_type: Option<AccountType>,
    pub value: Luna,
    pub fee: Luna,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl OutgoingTransaction {
    /// A plain value transfer between two basic accounts.
    pub fn basic(from: impl Into<String>, to: impl Into<String>, value: Luna, fee: Luna) -> Self {
        Self {
            from: from.into(),
            from_type: None,
            to: to.into(),
            to_type: None,
            value,
            fee,
            data: None,
        }
    }
}

/// Transactions of a block or of the mempool, as either bare hashes or full
/// records. Which one the node returns is chosen by the caller's
/// `full_transactions` flag, never by looking at the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransactionListing {
    Hashes(Vec<String>),
    Objects(Vec<Transaction>),
}

impl TransactionListing {
    /// Transaction hashes; empty when full records were requested.
    pub fn hashes(&self) -> &[String] {
        match self {
            Self::Hashes(hashes) => hashes,
            Self::Objects(_) => &[],
        }
    }

    /// Full transaction records; empty when only hashes were requested.
    pub fn objects(&self) -> &[Transaction] {
        match self {
            Self::Hashes(_) => &[],
            Self::Objects(objects) => objects,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Self::Objects(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Hashes(hashes) => hashes.len(),
            Self::Objects(objects) => objects.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for TransactionListing {
    fn from(hashes: Vec<String>) -> Self {
        Self::Hashes(hashes)
    }
}

impl From<Vec<Transaction>> for TransactionListing {
    fn from(objects: Vec<Transaction>) -> Self {
        Self::Objects(objects)
    }
}

// ==============================================================================
// Blocks
// ==============================================================================

/// A block. `T` is the shape of the `transactions` field; the decoder picks
/// `Vec<String>` or `Vec<Transaction>` from the request flag and then folds
/// the result into a [`TransactionListing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<T = TransactionListing> {
    pub number: u32,
    pub hash: String,
    /// Proof-of-work hash.
    pub pow: String,
    pub parent_hash: String,
    pub nonce: u64,
    /// Merkle root of the block body.
    pub body_hash: String,
    /// Root of the accounts tree.
    pub account_hash: String,
    pub miner: String,
    pub miner_address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub difficulty: String,
    pub extra_data: String,
    pub size: u32,
    pub timestamp: u64,
    pub transactions: T,
}

impl<T> Block<T> {
    pub fn map_transactions<U>(self, f: impl FnOnce(T) -> U) -> Block<U> {
        Block {
            number: self.number,
            hash: self.hash,
            pow: self.pow,
            parent_hash: self.parent_hash,
            nonce: self.nonce,
            body_hash: self.body_hash,
            account_hash: self.account_hash,
            miner: self.miner,
            miner_address: self.miner_address,
            difficulty: self.difficulty,
            extra_data: self.extra_data,
            size: self.size,
            timestamp: self.timestamp,
            transactions: f(self.transactions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplate {
    pub header: BlockTemplateHeader,
    /// Hex-encoded interlink.
    pub interlink: String,
    pub body: BlockTemplateBody,
    /// Compact form of the hash target to submit a block.
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplateHeader {
    pub version: u16,
    pub prev_hash: String,
    pub interlink_hash: String,
    pub account_hash: String,
    pub n_bits: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplateBody {
    pub hash: String,
    pub miner_addr: String,
    pub extra_data: String,
    /// Hex-encoded transactions.
    pub transactions: Vec<String>,
    pub pruned_accounts: Vec<String>,
    /// Path of the miner address in the body merkle tree.
    pub merkle_hashes: Vec<String>,
}

/// Mining instructions returned by `getWork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Hex-encoded block header.
    pub data: String,
    /// Block without header.
    pub suffix: String,
    pub target: u64,
    pub algorithm: String,
}

// ==============================================================================
// Node State
// ==============================================================================

/// Mempool overview: transaction counts per fee-per-byte bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mempool {
    #[serde(default)]
    pub total: u64,
    /// Buckets (out of 10000, 5000, ..., 1, 0) holding at least one transaction.
    #[serde(default)]
    pub buckets: Vec<u64>,
    /// Transaction count keyed by bucket, as the node sends it (`"10": 3`).
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl Mempool {
    /// Number of transactions in the bucket for `fee_per_byte`.
    pub fn bucket_count(&self, fee_per_byte: u64) -> u64 {
        self.counts
            .get(&fee_per_byte.to_string())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_state: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<u64>,
}

/// Progress of a running sync. Counters the node leaves out read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncStatus {
    pub starting_block: u64,
    pub current_block: u64,
    /// Estimated.
    pub highest_block: u64,
}

/// Result of `syncing`: the node answers either a progress record or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    NotSyncing,
    Syncing(SyncStatus),
}

impl SyncState {
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing(_))
    }

    pub fn progress(&self) -> Option<&SyncStatus> {
        match self {
            Self::NotSyncing => None,
            Self::Syncing(status) => Some(status),
        }
    }
}

// ==============================================================================
// Serde Helpers
// ==============================================================================

// Block difficulty arrives as a decimal string from most nodes and as a bare
// number from some; both keep their textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
