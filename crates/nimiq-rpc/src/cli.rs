use clap::{Parser, Subcommand};

/// nimiq-rpc: query and control a Nimiq node over JSON-RPC.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node JSON-RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:8648", env = "NIMIQ_RPC_URL")]
    pub rpc_url: String,

    /// RPC username (optional; must be given together with --rpc-pass).
    #[arg(long, env = "NIMIQ_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password (optional; must be given together with --rpc-user).
    #[arg(long, env = "NIMIQ_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Extra header sent with every request, as `NAME:VALUE` (repeatable).
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Height of the chain head.
    BlockNumber,
    /// Consensus state of the node.
    Consensus,
    /// Balance of an address, in NIM.
    Balance { address: String },
    /// Account details of an address.
    Account { address: String },
    /// Block by hash or height.
    Block {
        /// Block hash, or a height if it parses as a number.
        id: String,
        /// Include full transaction records instead of hashes.
        #[arg(long)]
        full: bool,
    },
    /// Transaction by hash.
    Transaction { hash: String },
    /// Receipt of a transaction by hash.
    Receipt { hash: String },
    /// Latest transactions of an address.
    Transactions {
        address: String,
        #[arg(long)]
        max: Option<u32>,
    },
    /// Connected peers.
    Peers,
    /// State of one peer, optionally changing it.
    PeerState {
        address: String,
        /// One of ban, unban, connect, disconnect.
        #[arg(long)]
        update: Option<String>,
    },
    /// Mempool bucket counts.
    Mempool,
    /// Pending transactions.
    MempoolContent {
        #[arg(long)]
        full: bool,
    },
    /// Whether the node is syncing.
    Syncing,
    /// Mining state, optionally enabling or disabling it.
    Mining {
        #[arg(long)]
        set: Option<bool>,
    },
    /// Miner thread count, optionally changing it.
    MinerThreads {
        #[arg(long)]
        set: Option<u32>,
    },
    /// Minimum fee per byte, optionally changing it.
    MinFee {
        #[arg(long)]
        set: Option<i64>,
    },
    /// Current hash rate.
    Hashrate,
    /// Convert Luna to a NIM string (offline).
    ToNim {
        #[arg(allow_negative_numbers = true)]
        luna: i64,
    },
    /// Convert a NIM string to Luna (offline).
    ToLuna {
        #[arg(allow_negative_numbers = true)]
        nim: String,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in `{raw}`"));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}
