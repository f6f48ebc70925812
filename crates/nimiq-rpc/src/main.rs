mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;

use nimiq_rpc_core::rpc::HttpTransportConfig;
use nimiq_rpc_core::{format_nim, parse_luna, Luna, NimiqClient};

use cli::Command;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // Conversions never touch the node.
    match &args.command {
        Command::ToNim { luna } => {
            println!("{}", format_nim(Luna(*luna)));
            return Ok(());
        }
        Command::ToLuna { nim } => {
            let luna = parse_luna(nim).wrap_err_with(|| format!("convert `{nim}` to luna"))?;
            println!("{luna}");
            return Ok(());
        }
        _ => {}
    }

    let mut config = HttpTransportConfig::new(&args.rpc_url);
    config.user = args.rpc_user.clone();
    config.pass = args.rpc_pass.clone();
    config.headers = args.headers.clone();
    config.request_timeout = Duration::from_secs(args.timeout_secs);
    let nimiq = NimiqClient::from_config(config).context("configure RPC client")?;

    tracing::debug!(rpc_url = %args.rpc_url, "dispatching command");
    run(&nimiq, args.command).await.map_err(|err| {
        let message = format_rpc_error(&args.rpc_url, &format!("{err:#}"));
        eyre!(message)
    })
}

async fn run(nimiq: &NimiqClient, command: Command) -> eyre::Result<()> {
    match command {
        Command::BlockNumber => print_json(&nimiq.block_number().await?),
        Command::Consensus => print_json(&nimiq.consensus().await?),
        Command::Balance { address } => {
            let balance = nimiq.get_balance(&address).await?;
            println!("{}", balance.to_nim());
            Ok(())
        }
        Command::Account { address } => print_json(&nimiq.get_account(&address).await?),
        Command::Block { id, full } => {
            let block = match id.parse::<u32>() {
                Ok(number) => nimiq.get_block_by_number(number, full).await?,
                Err(_) => nimiq.get_block_by_hash(&id, full).await?,
            };
            print_found(block, "block", &id)
        }
        Command::Transaction { hash } => {
            print_found(nimiq.get_transaction_by_hash(&hash).await?, "transaction", &hash)
        }
        Command::Receipt { hash } => {
            print_found(nimiq.get_transaction_receipt(&hash).await?, "receipt", &hash)
        }
        Command::Transactions { address, max } => {
            print_json(&nimiq.get_transactions_by_address(&address, max).await?)
        }
        Command::Peers => print_json(&nimiq.peer_list().await?),
        Command::PeerState { address, update } => {
            print_json(&nimiq.peer_state(&address, update.as_deref()).await?)
        }
        Command::Mempool => print_json(&nimiq.mempool().await?),
        Command::MempoolContent { full } => print_json(&nimiq.mempool_content(full).await?),
        Command::Syncing => print_json(&nimiq.syncing().await?),
        Command::Mining { set } => print_json(&nimiq.mining(set).await?),
        Command::MinerThreads { set } => print_json(&nimiq.miner_threads(set).await?),
        Command::MinFee { set } => print_json(&nimiq.min_fee_per_byte(set).await?),
        Command::Hashrate => print_json(&nimiq.hashrate().await?),
        Command::ToNim { .. } | Command::ToLuna { .. } => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("render result as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn print_found<T: Serialize>(value: Option<T>, what: &str, id: &str) -> eyre::Result<()> {
    match value {
        Some(value) => print_json(&value),
        None => Err(eyre!("{what} `{id}` not found")),
    }
}

fn format_rpc_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![format!("RPC call to `{rpc_url}` failed: {source_error}")];

    if source_error.contains("dns error") || source_error.contains("Could not resolve host") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("Connection refused") || source_error.contains("tcp connect") {
        lines.push(
            "hint: nothing is listening there; verify the node runs with its RPC server enabled"
                .into(),
        );
    } else if source_error.contains("certificate") || source_error.contains("tls") {
        lines.push(
            "hint: TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS"
                .into(),
        );
    } else if source_error.contains("not authenticated") || source_error.contains("unauthorized") {
        lines.push(
            "hint: the node rejected the credentials; verify --rpc-user/--rpc-pass and --header"
                .into(),
        );
    } else if source_error.contains("body was empty") || source_error.contains("invalid JSON-RPC") {
        lines.push(
            "hint: the endpoint did not answer JSON-RPC; verify the full RPC URL including its path"
                .into(),
        );
    } else if source_error.contains("error sending request for url") {
        lines.push("hint: request could not be sent; verify URL format, network access, and endpoint reachability".into());
    } else if source_error.contains("Method not found") {
        lines.push("hint: the node does not expose this method; check its RPC configuration".into());
    }

    lines.join("\n")
}
