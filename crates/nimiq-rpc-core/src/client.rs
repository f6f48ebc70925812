//! Typed access to every method of the Nimiq node JSON-RPC API.
//!
//! Each method builds positional params, dispatches one call and decodes the
//! result with the matching rule from [`crate::rpc::decode`].
//!
//! Methods with an optional trailing argument ("set this value") only read
//! when it is `None`; when it is `Some` the value is appended and the call
//! becomes a write. Reads can still have side effects on the node.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::warn;

use crate::currency::Luna;
use crate::error::CoreError;
use crate::rpc::decode::{self, Identified};
use crate::rpc::{
    BatchResponses, Dispatcher, HttpTransport, HttpTransportConfig, RpcRequest, Transport,
};
use crate::types::{
    Account, Block, BlockTemplate, LogLevel, Mempool, OutgoingTransaction, Peer,
    PeerStateCommand, SyncState, Transaction, TransactionListing, TransactionReceipt, Wallet,
    Work,
};

/// Client for a Nimiq node.
pub struct NimiqClient<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
}

impl NimiqClient<HttpTransport> {
    /// Client for an unauthenticated HTTP(S) endpoint.
    pub fn new(url: &str) -> Result<Self, CoreError> {
        Self::from_config(HttpTransportConfig::new(url))
    }

    /// Client sending basic auth credentials with every call.
    pub fn with_auth(url: &str, user: &str, pass: &str) -> Result<Self, CoreError> {
        Self::from_config(HttpTransportConfig::new(url).with_credentials(user, pass))
    }

    pub fn from_config(config: HttpTransportConfig) -> Result<Self, CoreError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> NimiqClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// Build a request for [`NimiqClient::call_batch`].
    pub fn request(method: &str, params: Vec<serde_json::Value>) -> RpcRequest {
        RpcRequest::new(method, params)
    }

    /// Call any method and get its raw result. Useful for methods this client
    /// does not wrap.
    pub async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        self.dispatcher.call(method, params).await
    }

    /// Send several requests in one round trip. See [`BatchResponses`].
    pub async fn call_batch(&self, requests: &[RpcRequest]) -> Result<BatchResponses, CoreError> {
        self.dispatcher.call_batch(requests).await
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<R, CoreError> {
        let raw = self.call(method, params).await?;
        decode::decode(method, raw)
    }

    async fn fetch_found<R: DeserializeOwned + Identified>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<Option<R>, CoreError> {
        let raw = self.call(method, params).await?;
        decode::decode_found(method, raw)
    }

    // ==========================================================================
    // Accounts
    // ==========================================================================

    /// Accounts whose keys are held by the node.
    pub async fn accounts(&self) -> Result<Vec<Account>, CoreError> {
        self.fetch("accounts", Vec::new()).await
    }

    /// Create a new account and store its private key on the node.
    pub async fn create_account(&self) -> Result<Wallet, CoreError> {
        self.fetch("createAccount", Vec::new()).await
    }

    pub async fn get_account(&self, address: &str) -> Result<Account, CoreError> {
        self.fetch("getAccount", vec![json!(address)]).await
    }

    pub async fn get_balance(&self, address: &str) -> Result<Luna, CoreError> {
        self.fetch("getBalance", vec![json!(address)]).await
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    pub async fn block_number(&self) -> Result<u64, CoreError> {
        self.fetch("blockNumber", Vec::new()).await
    }

    /// Block by hash, with full transaction records when `full_transactions`
    /// is set and only their hashes otherwise. `None` if the node does not
    /// know the block.
    pub async fn get_block_by_hash(
        &self,
        hash: &str,
        full_transactions: bool,
    ) -> Result<Option<Block>, CoreError> {
        const METHOD: &str = "getBlockByHash";
        let raw = self
            .call(METHOD, vec![json!(hash), json!(full_transactions)])
            .await?;
        decode::decode_block(METHOD, raw, full_transactions)
    }

    /// Block by height. See [`NimiqClient::get_block_by_hash`].
    pub async fn get_block_by_number(
        &self,
        number: u32,
        full_transactions: bool,
    ) -> Result<Option<Block>, CoreError> {
        const METHOD: &str = "getBlockByNumber";
        let raw = self
            .call(METHOD, vec![json!(number), json!(full_transactions)])
            .await?;
        decode::decode_block(METHOD, raw, full_transactions)
    }

    pub async fn get_block_transaction_count_by_hash(&self, hash: &str) -> Result<u64, CoreError> {
        self.fetch("getBlockTransactionCountByHash", vec![json!(hash)])
            .await
    }

    pub async fn get_block_transaction_count_by_number(
        &self,
        number: u32,
    ) -> Result<u64, CoreError> {
        self.fetch("getBlockTransactionCountByNumber", vec![json!(number)])
            .await
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    pub async fn get_transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<Transaction>, CoreError> {
        self.fetch_found("getTransactionByHash", vec![json!(hash)])
            .await
    }

    pub async fn get_transaction_by_block_hash_and_index(
        &self,
        block_hash: &str,
        index: u32,
    ) -> Result<Option<Transaction>, CoreError> {
        self.fetch_found(
            "getTransactionByBlockHashAndIndex",
            vec![json!(block_hash), json!(index)],
        )
        .await
    }

    pub async fn get_transaction_by_block_number_and_index(
        &self,
        block_number: u32,
        index: u32,
    ) -> Result<Option<Transaction>, CoreError> {
        self.fetch_found(
            "getTransactionByBlockNumberAndIndex",
            vec![json!(block_number), json!(index)],
        )
        .await
    }

    pub async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, CoreError> {
        self.fetch_found("getTransactionReceipt", vec![json!(hash)])
            .await
    }

    /// Latest transactions sent by or to `address`, at most `max_entries`
    /// (node default 1000). The list may be shorter even when more
    /// transactions exist.
    pub async fn get_transactions_by_address(
        &self,
        address: &str,
        max_entries: Option<u32>,
    ) -> Result<Vec<Transaction>, CoreError> {
        let params = optional_params(vec![Some(json!(address)), max_entries.map(|n| json!(n))]);
        self.fetch("getTransactionsByAddress", params).await
    }

    /// Create and sign a transaction without broadcasting it. Returns its
    /// hex serialization for [`NimiqClient::send_raw_transaction`].
    pub async fn create_raw_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, CoreError> {
        self.fetch("createRawTransaction", vec![json!(transaction)])
            .await
    }

    /// Broadcast a signed, hex-encoded transaction. Returns its hash.
    pub async fn send_raw_transaction(&self, signed: &str) -> Result<String, CoreError> {
        self.fetch("sendRawTransaction", vec![json!(signed)]).await
    }

    /// Create, sign and broadcast a transaction. Returns its hash.
    pub async fn send_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, CoreError> {
        self.fetch("sendTransaction", vec![json!(transaction)]).await
    }

    // ==========================================================================
    // Mempool
    // ==========================================================================

    pub async fn mempool(&self) -> Result<Mempool, CoreError> {
        self.fetch("mempool", Vec::new()).await
    }

    /// Pending transactions, as full records when `full_transactions` is set
    /// and as hashes otherwise.
    pub async fn mempool_content(
        &self,
        full_transactions: bool,
    ) -> Result<TransactionListing, CoreError> {
        const METHOD: &str = "mempoolContent";
        let raw = self.call(METHOD, vec![json!(full_transactions)]).await?;
        decode::decode_listing(METHOD, raw, full_transactions)
    }

    /// Minimum fee per byte accepted into the mempool; sets it first when
    /// `new_fee` is given.
    pub async fn min_fee_per_byte(&self, new_fee: Option<i64>) -> Result<i64, CoreError> {
        let params = optional_params(vec![new_fee.map(|fee| json!(fee))]);
        self.fetch("minFeePerByte", params).await
    }

    // ==========================================================================
    // Mining
    // ==========================================================================

    /// Whether the node is mining; enables or disables mining first when
    /// `state` is given.
    pub async fn mining(&self, state: Option<bool>) -> Result<bool, CoreError> {
        let params = optional_params(vec![state.map(|s| json!(s))]);
        self.fetch("mining", params).await
    }

    /// Miner thread count; sets it first when `threads` is given.
    pub async fn miner_threads(&self, threads: Option<u32>) -> Result<u32, CoreError> {
        let params = optional_params(vec![threads.map(|n| json!(n))]);
        self.fetch("minerThreads", params).await
    }

    pub async fn miner_address(&self) -> Result<String, CoreError> {
        self.fetch("minerAddress", Vec::new()).await
    }

    /// Hashes per second the node is mining with.
    pub async fn hashrate(&self) -> Result<f64, CoreError> {
        self.fetch("hashrate", Vec::new()).await
    }

    /// Template for the next block. `miner_address` and `extra_data` override
    /// what the node (or its pool) would use.
    pub async fn get_block_template(
        &self,
        miner_address: Option<&str>,
        extra_data: Option<&str>,
    ) -> Result<BlockTemplate, CoreError> {
        let params = optional_params(vec![
            miner_address.map(|a| json!(a)),
            extra_data.map(|d| json!(d)),
        ]);
        self.fetch("getBlockTemplate", params).await
    }

    /// Mining instructions for the next block, or `None` when the node has no
    /// work to hand out.
    pub async fn get_work(
        &self,
        miner_address: Option<&str>,
        extra_data: Option<&str>,
    ) -> Result<Option<Work>, CoreError> {
        let params = optional_params(vec![
            miner_address.map(|a| json!(a)),
            extra_data.map(|d| json!(d)),
        ]);
        self.fetch_found("getWork", params).await
    }

    /// Submit a hex-encoded full block (header, interlink and body; include
    /// the suffix when submitting work from `getWork`).
    pub async fn submit_block(&self, full_block: &str) -> Result<(), CoreError> {
        self.call("submitBlock", vec![json!(full_block)]).await?;
        Ok(())
    }

    /// Current pool address, if any; switches pools first when
    /// `new_address` is given.
    pub async fn pool(&self, new_address: Option<&str>) -> Result<Option<String>, CoreError> {
        let params = optional_params(vec![new_address.map(|a| json!(a))]);
        self.fetch("pool", params).await
    }

    /// Pool connection state: 0 connected, 1 connecting, 2 closed.
    pub async fn pool_connection_state(&self) -> Result<u8, CoreError> {
        self.fetch("poolConnectionState", Vec::new()).await
    }

    /// Miner balance confirmed by the pool.
    pub async fn pool_confirmed_balance(&self) -> Result<Luna, CoreError> {
        self.fetch("poolConfirmedBalance", Vec::new()).await
    }

    // ==========================================================================
    // Network and Node
    // ==========================================================================

    /// Consensus state: `connecting`, `syncing` or `established`.
    pub async fn consensus(&self) -> Result<String, CoreError> {
        self.fetch("consensus", Vec::new()).await
    }

    pub async fn peer_count(&self) -> Result<u32, CoreError> {
        self.fetch("peerCount", Vec::new()).await
    }

    pub async fn peer_list(&self) -> Result<Vec<Peer>, CoreError> {
        self.fetch("peerList", Vec::new()).await
    }

    /// State of the peer at `address`.
    ///
    /// `update` must be one of `ban`, `unban`, `connect` or `disconnect`.
    /// Any other value is dropped with a warning and the call stays a plain
    /// read.
    pub async fn peer_state(&self, address: &str, update: Option<&str>) -> Result<Peer, CoreError> {
        self.fetch("peerState", peer_state_params(address, update))
            .await
    }

    /// Apply `command` to the peer at `address` and return its new state.
    pub async fn set_peer_state(
        &self,
        address: &str,
        command: PeerStateCommand,
    ) -> Result<Peer, CoreError> {
        self.fetch("peerState", vec![json!(address), json!(command.as_str())])
            .await
    }

    /// Whether the node is syncing, with its progress when it is.
    pub async fn syncing(&self) -> Result<SyncState, CoreError> {
        const METHOD: &str = "syncing";
        let raw = self.call(METHOD, Vec::new()).await?;
        decode::decode_sync_state(METHOD, &raw)
    }

    /// Set the log level for `tag` (`*` for all tags).
    pub async fn log(&self, tag: &str, level: LogLevel) -> Result<bool, CoreError> {
        self.fetch("log", vec![json!(tag), json!(level)]).await
    }
}

/// Positional params from optional arguments: trailing `None`s are not sent,
/// an interior `None` becomes `null` so later arguments keep their position.
fn optional_params(args: Vec<Option<serde_json::Value>>) -> Vec<serde_json::Value> {
    let supplied = args.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
    args.into_iter()
        .take(supplied)
        .map(|arg| arg.unwrap_or(serde_json::Value::Null))
        .collect()
}

fn peer_state_params(address: &str, update: Option<&str>) -> Vec<serde_json::Value> {
    let command = update.and_then(|raw| match raw.parse::<PeerStateCommand>() {
        Ok(command) => Some(command),
        Err(err) => {
            warn!(peer = address, %err, "dropping invalid peer state update, sending a read");
            None
        }
    });

    let mut params = vec![json!(address)];
    params.extend(command.map(|command| json!(command.as_str())));
    params
}
