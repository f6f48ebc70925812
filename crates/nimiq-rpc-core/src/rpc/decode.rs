//! Turning raw JSON-RPC results into typed values.
//!
//! Every decoder is all-or-nothing: a result either decodes completely into
//! the requested shape or yields [`CoreError::UnexpectedResult`] wrapping the
//! serde failure. Nothing falls back to a default value.
//!
//! Three node conventions need more than a plain `from_value`:
//!
//! - Transaction listings (block bodies, mempool contents) are hashes or full
//!   records depending on a flag the caller sent. The flag picks the target
//!   type before decoding; the payload is never inspected to guess.
//! - `syncing` answers a progress record or `false`. The record is tried
//!   first and the boolean only if that attempt fails structurally.
//! - Lookups answer "not found" with a record whose identity field is empty
//!   (or with `null`). [`decode_found`] turns that into `Ok(None)` once.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::trace;

use crate::error::CoreError;
use crate::types::{
    Block, SyncState, SyncStatus, Transaction, TransactionListing, TransactionReceipt, Work,
};

/// Records whose empty identity field means "no such entity".
pub trait Identified {
    /// Wire name of the identity field.
    const IDENTITY_FIELD: &'static str;
}

impl<T> Identified for Block<T> {
    const IDENTITY_FIELD: &'static str = "hash";
}

impl Identified for Transaction {
    const IDENTITY_FIELD: &'static str = "hash";
}

impl Identified for TransactionReceipt {
    const IDENTITY_FIELD: &'static str = "transactionHash";
}

impl Identified for Work {
    const IDENTITY_FIELD: &'static str = "data";
}

pub fn decode<T: DeserializeOwned>(method: &str, raw: serde_json::Value) -> Result<T, CoreError> {
    serde_json::from_value(raw).map_err(|e| CoreError::unexpected(method, e))
}

/// Decode a lookup result, mapping `null` and the empty-identity sentinel to
/// `None`.
///
/// The sentinel is checked before the full decode: a "not found" record may
/// carry nothing but its empty identity field.
pub fn decode_found<T>(method: &str, raw: serde_json::Value) -> Result<Option<T>, CoreError>
where
    T: DeserializeOwned + Identified,
{
    if is_not_found(method, &raw, T::IDENTITY_FIELD) {
        return Ok(None);
    }
    decode(method, raw).map(Some)
}

/// Decode a block whose `transactions` field holds full records when
/// `full_transactions` is set and hashes otherwise.
pub fn decode_block(
    method: &str,
    raw: serde_json::Value,
    full_transactions: bool,
) -> Result<Option<Block>, CoreError> {
    if is_not_found(method, &raw, Block::<TransactionListing>::IDENTITY_FIELD) {
        return Ok(None);
    }

    let block = if full_transactions {
        decode::<Block<Vec<Transaction>>>(method, raw)?.map_transactions(TransactionListing::from)
    } else {
        decode::<Block<Vec<String>>>(method, raw)?.map_transactions(TransactionListing::from)
    };
    Ok(Some(block))
}

/// Decode a bare transaction listing (`mempoolContent`).
pub fn decode_listing(
    method: &str,
    raw: serde_json::Value,
    full_transactions: bool,
) -> Result<TransactionListing, CoreError> {
    if full_transactions {
        decode::<Vec<Transaction>>(method, raw).map(TransactionListing::Objects)
    } else {
        decode::<Vec<String>>(method, raw).map(TransactionListing::Hashes)
    }
}

/// Decode a `syncing` result.
///
/// Any object means syncing: missing counters read as zero, and an all-zero
/// record is still a running sync.
pub fn decode_sync_state(method: &str, raw: &serde_json::Value) -> Result<SyncState, CoreError> {
    match SyncStatus::deserialize(raw) {
        Ok(status) => Ok(SyncState::Syncing(status)),
        Err(record_err) => {
            trace!(rpc.method = method, error = %record_err, "sync result is not a progress record");
            bool::deserialize(raw)
                .map(|_| SyncState::NotSyncing)
                .map_err(|e| CoreError::unexpected(method, e))
        }
    }
}

// `null`, or an object whose identity field is missing, `null` or "".
fn is_not_found(method: &str, raw: &serde_json::Value, identity_field: &str) -> bool {
    let not_found = match raw {
        serde_json::Value::Null => true,
        serde_json::Value::Object(fields) => match fields.get(identity_field) {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::String(identity)) => identity.is_empty(),
            Some(_) => false,
        },
        _ => false,
    };
    if not_found {
        trace!(
            rpc.method = method,
            field = identity_field,
            "empty identity field, treating as not found"
        );
    }
    not_found
}
