use std::env;
use std::sync::Once;

use nimiq_rpc_core::rpc::{HttpTransportConfig, RpcRequest};
use nimiq_rpc_core::NimiqClient;

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nimiq_rpc_core=debug")),
            )
            .with_target(true)
            .try_init();
    });
}

fn live_client() -> NimiqClient {
    let url = env::var("NIMIQ_TEST_RPC_URL").expect("NIMIQ_TEST_RPC_URL must be set");
    let mut config = HttpTransportConfig::new(url);
    if let (Ok(user), Ok(pass)) = (env::var("NIMIQ_TEST_RPC_USER"), env::var("NIMIQ_TEST_RPC_PASS")) {
        config = config.with_credentials(user, pass);
    }
    NimiqClient::from_config(config).expect("rpc client must construct")
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Nimiq node; set NIMIQ_TEST_RPC_URL"]
async fn live_node_answers_chain_queries() {
    init_tracing();
    let nimiq = live_client();

    let height = nimiq.block_number().await.expect("blockNumber must succeed");
    eprintln!("[itest] node is at height {height}");

    let consensus = nimiq.consensus().await.expect("consensus must succeed");
    assert!(
        ["connecting", "syncing", "established"].contains(&consensus.as_str()),
        "unexpected consensus state `{consensus}`"
    );

    if height > 0 {
        let block = nimiq
            .get_block_by_number(height as u32, false)
            .await
            .expect("getBlockByNumber must succeed")
            .expect("head block must exist");
        assert_eq!(u64::from(block.number), height);
        assert!(!block.transactions.is_full());

        let by_hash = nimiq
            .get_block_by_hash(&block.hash, true)
            .await
            .expect("getBlockByHash must succeed")
            .expect("head block must be found by hash");
        assert_eq!(by_hash.hash, block.hash);
        assert_eq!(by_hash.transactions.len(), block.transactions.len());
    }

    let unknown = nimiq
        .get_transaction_by_hash(&"0".repeat(64))
        .await
        .expect("lookup of an unknown hash must not fail");
    assert_eq!(unknown, None);

    let sync = nimiq.syncing().await.expect("syncing must succeed");
    eprintln!("[itest] sync state: {sync:?}");
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a running Nimiq node; set NIMIQ_TEST_RPC_URL"]
async fn live_node_answers_batches() {
    init_tracing();
    let nimiq = live_client();

    let responses = nimiq
        .call_batch(&[
            RpcRequest::new("blockNumber", Vec::new()),
            RpcRequest::new("peerCount", Vec::new()),
            RpcRequest::new("consensus", Vec::new()),
        ])
        .await
        .expect("batch must succeed");

    assert_eq!(responses.len(), 3);
    assert!(!responses.has_error(), "plain reads must not fail: {responses:?}");
}
