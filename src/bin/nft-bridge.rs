// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Command line front end for the NFT bridge.
//!
//! Reads network endpoints and contract addresses from the deployment record
//! file written by `nft-bridge deploy`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_network::ReceiptResponse;
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use nft_bridge::bridge::resolve_recipient;
use nft_bridge::cache::ListingCache;
use nft_bridge::deploy::{
    ContractArtifact, DeploymentRegistry, JsonFileStore, NetworkDescriptor, Reconciler,
};
use nft_bridge::providers::{AlloyDeployer, AlloyLedgerClient, SignerWallet, TokioClock};
use nft_bridge::{
    minted_token_id, BridgeStatus, CompletionOutcome, NftBridge, PollingConfig,
    RegistryStore, TokenId,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bridge NFTs between EVM networks")]
struct Cli {
    /// Deployment record file
    #[arg(
        long,
        global = true,
        env = "NFT_BRIDGE_DEPLOYMENTS",
        default_value = "deployments.json"
    )]
    deployments: PathBuf,

    /// Hex-encoded private key of the signing account
    #[arg(long, global = true, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tokens an account holds on one network
    List {
        /// Network key or chain id, e.g. `fuji` or `43113`
        #[arg(long)]
        network: String,
        /// Account to list; defaults to the signer
        #[arg(long)]
        owner: Option<String>,
    },
    /// Bridge a token to another network
    Bridge {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        token_id: TokenId,
        /// Defaults to the signer
        #[arg(long)]
        recipient: Option<String>,
        /// Return once the source transaction is confirmed
        #[arg(long)]
        no_wait: bool,
        /// Seconds to wait for the token on the destination
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
    /// Mint a token to the signer
    Mint {
        #[arg(long)]
        network: String,
    },
    /// Deploy ledgers to every target network and connect them
    Deploy {
        /// JSON list of network keys or network descriptors
        #[arg(long)]
        targets: PathBuf,
        /// Compiled contract artifact with `abi` and `bytecode`
        #[arg(long)]
        artifact: PathBuf,
        #[arg(long)]
        skip_seed_mint: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List {
            ref network,
            ref owner,
        } => list(&cli, network, owner.as_deref()).await,
        Command::Bridge {
            ref from,
            ref to,
            token_id,
            ref recipient,
            no_wait,
            timeout,
        } => {
            bridge(
                &cli,
                from,
                to,
                token_id,
                recipient.as_deref(),
                no_wait,
                Duration::from_secs(timeout),
            )
            .await
        }
        Command::Mint { ref network } => mint(&cli, network).await,
        Command::Deploy {
            ref targets,
            ref artifact,
            skip_seed_mint,
        } => deploy(&cli, targets, artifact, !skip_seed_mint).await,
    }
}

fn signer(cli: &Cli) -> anyhow::Result<PrivateKeySigner> {
    let Some(key) = cli.private_key.as_deref() else {
        bail!("no signing key: pass --private-key or set PRIVATE_KEY");
    };
    key.trim()
        .parse::<PrivateKeySigner>()
        .context("PRIVATE_KEY is not a valid hex private key")
}

async fn load_registry(cli: &Cli) -> anyhow::Result<DeploymentRegistry> {
    let registry = JsonFileStore::new(&cli.deployments)
        .load()
        .await
        .with_context(|| format!("reading {}", cli.deployments.display()))?;
    if registry.is_empty() {
        bail!(
            "{} has no deployments; run `nft-bridge deploy` first",
            cli.deployments.display()
        );
    }
    Ok(registry)
}

async fn list(cli: &Cli, network: &str, owner: Option<&str>) -> anyhow::Result<()> {
    let registry = load_registry(cli).await?;
    let owner: Address = match owner {
        Some(raw) => nft_bridge::bridge::parse_recipient(raw)?,
        None => signer(cli)?.address(),
    };
    let client = AlloyLedgerClient::from_registry(&registry, network, None)?;

    let tokens = ListingCache::new(TokioClock::new())
        .list(&client, owner, false)
        .await?
        .tokens;
    if tokens.is_empty() {
        println!("{owner} holds no tokens on {network}; nothing to bridge");
        return Ok(());
    }
    for token in tokens {
        println!(
            "{}  {}  (origin chain {})",
            token.token_id, token.metadata.name, token.metadata.origin_chain_id
        );
    }
    Ok(())
}

async fn bridge(
    cli: &Cli,
    from: &str,
    to: &str,
    token_id: TokenId,
    recipient: Option<&str>,
    no_wait: bool,
    timeout: Duration,
) -> anyhow::Result<()> {
    let registry = load_registry(cli).await?;
    let signer = signer(cli)?;
    let recipient = resolve_recipient(recipient, signer.address())?;

    let source = AlloyLedgerClient::from_registry(&registry, from, Some(&signer))?;
    let destination = AlloyLedgerClient::from_registry(&registry, to, None)?;
    let (source_chain_id, _) = registry.require_network(from)?;
    let wallet = SignerWallet::new(signer, &registry, source_chain_id)?;

    let bridge = NftBridge::builder()
        .source(source)
        .destination(destination)
        .wallet(wallet)
        .clock(TokioClock::new())
        .config(PollingConfig::default().with_timeout(timeout))
        .build();

    if no_wait {
        let report = bridge.bridge_no_wait(token_id, Some(recipient)).await?;
        println!(
            "Token {token_id} left {from} in {}; it will arrive on {to} once the message is delivered",
            report.operation.tx_hash
        );
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(event = "completion_watch_interrupted");
            on_ctrl_c.cancel();
        }
    });

    let report = bridge.bridge(token_id, Some(recipient), &cancel).await?;
    let tx_hash = report.operation.tx_hash;
    match (report.operation.status, report.outcome) {
        (BridgeStatus::DestinationConfirmed, _) => {
            println!("Token {token_id} arrived on {to}, owned by {recipient} (source tx {tx_hash})");
        }
        (_, Some(CompletionOutcome::TimedOut { .. })) => {
            println!(
                "Token {token_id} not yet visible on {to} after {}s; it may still arrive. Check with `nft-bridge list --network {to}`",
                timeout.as_secs()
            );
        }
        _ => {
            println!("Stopped watching token {token_id}; the bridge itself continues (source tx {tx_hash})");
        }
    }
    Ok(())
}

async fn mint(cli: &Cli, network: &str) -> anyhow::Result<()> {
    let registry = load_registry(cli).await?;
    let signer = signer(cli)?;
    let client = AlloyLedgerClient::from_registry(&registry, network, Some(&signer))?;

    let tx = client.contract().mint_transaction(signer.address());
    let receipt = client
        .inner()
        .send_transaction(tx)
        .await?
        .get_receipt()
        .await
        .context("waiting for the mint receipt")?;
    if !receipt.status() {
        bail!("mint transaction {} reverted", receipt.transaction_hash);
    }
    let token_id = minted_token_id(&receipt).context("mint receipt carries no Minted event")?;

    info!(token_id = %token_id, network = network, event = "token_minted");
    println!("Minted token {token_id} on {network}");
    Ok(())
}

async fn deploy(
    cli: &Cli,
    targets: &Path,
    artifact: &Path,
    mint_seed: bool,
) -> anyhow::Result<()> {
    let signer = signer(cli)?;
    let targets = NetworkDescriptor::load_targets(targets)
        .await
        .with_context(|| format!("reading targets from {}", targets.display()))?;
    let artifact = ContractArtifact::load(artifact)
        .await
        .with_context(|| format!("reading artifact {}", artifact.display()))?;

    let reconciler = Reconciler::builder()
        .deployer(AlloyDeployer::new(signer, artifact.bytecode))
        .store(JsonFileStore::new(&cli.deployments))
        .abi(artifact.abi)
        .mint_seed(mint_seed)
        .build();
    let report = reconciler.reconcile(&targets).await?;

    for (chain_id, record) in report.registry.iter() {
        let status = if report.deployed.contains(&chain_id) {
            "deployed"
        } else {
            "kept"
        };
        println!("{:<16} {:>8}  {}  {status}", record.network, chain_id, record.address);
    }
    println!(
        "{} trust edges applied ({} setPeer calls); records written to {}",
        report.edges.len(),
        report.peer_calls(),
        cli.deployments.display()
    );
    Ok(())
}
