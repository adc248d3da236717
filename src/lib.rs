//! # nft-bridge-rs
//!
//! A Rust SDK for relocating NFTs between EVM networks.
//!
//! Every network runs its own ledger contract holding the authoritative owner
//! and immutable metadata of the tokens active there. Bridging burns a token
//! on the source ledger and sends `{recipient, tokenId, metadata}` through a
//! store-and-forward messaging channel; the destination ledger mints the same
//! id to the recipient with the metadata unchanged. Token ids are minted in a
//! per-chain namespace (`chainId * 10_000 + sequence`), so an id never
//! changes while it travels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nft_bridge::deploy::DeploymentRegistry;
//! use nft_bridge::providers::{AlloyLedgerClient, SignerWallet, TokioClock};
//! use nft_bridge::{BridgeError, NftBridge, TokenId};
//! use alloy_signer_local::PrivateKeySigner;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(registry: DeploymentRegistry) -> Result<(), BridgeError> {
//! let signer: PrivateKeySigner = "0x...".parse().map_err(|_| BridgeError::InvalidConfig("key".into()))?;
//!
//! let bridge = NftBridge::builder()
//!     .source(AlloyLedgerClient::from_registry(&registry, "fuji", Some(&signer))?)
//!     .destination(AlloyLedgerClient::from_registry(&registry, "baseSepolia", None)?)
//!     .wallet(SignerWallet::new(signer, &registry, 43113)?)
//!     .clock(TokioClock::new())
//!     .build();
//!
//! let token_id: TokenId = "431130000".parse()?;
//! let report = bridge.bridge(token_id, None, &CancellationToken::new()).await?;
//! println!("{} is {}", token_id, report.operation.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Local Devnet
//!
//! [`providers::local`] runs the whole protocol in-process: ledgers, the
//! message bus and a relayer that can deliver, hold, drop or redeliver
//! messages. It implements the same traits as the alloy providers.
//!
//! ```rust
//! use nft_bridge::ledger::{LedgerContract, LocalMessageBus};
//! use alloy_primitives::Address;
//! use std::sync::Arc;
//!
//! let bus = LocalMessageBus::new();
//! let mut ledger = LedgerContract::builder()
//!     .chain_id(43113)
//!     .address(Address::repeat_byte(0x43))
//!     .owner(Address::repeat_byte(0xAD))
//!     .endpoint(Arc::new(bus))
//!     .build();
//!
//! let id = ledger.mint(Address::repeat_byte(0x0A)).unwrap();
//! assert_eq!(id.to_string(), "431130000");
//! ```
//!
//! ## Public API
//!
//! - [`NftBridge`] - bridge orchestrator with a cancellable completion watch
//! - [`list_nfts`] and [`cache::ListingCache`] - owned-token listing with a
//!   debounce window
//! - [`deploy::Reconciler`] - idempotent deployment and trust-graph setup
//! - [`ledger::LedgerContract`] - the per-network ledger state machine
//! - [`UniversalNftContract`] - typed bindings for the deployed contract
//! - [`BridgeError`] and [`Result`] - error types for error handling
//! - [`LedgerClient`], [`WalletSession`], [`ContractDeployer`],
//!   [`RegistryStore`] and [`Clock`] - the seams tests plug fakes into

pub mod bridge;
pub mod cache;
mod chain;
mod contracts;
pub mod deploy;
mod error;
pub mod ledger;
mod protocol;
pub mod providers;
pub mod testing;
mod traits;

pub use bridge::{
    list_nfts, BridgeOperation, BridgeReport, BridgeStatus, CompletionOutcome, NftBridge,
    OwnedNft, PollingConfig,
};
pub use chain::{BridgeNetwork, MESSAGING_ENDPOINT_MAINNET, MESSAGING_ENDPOINT_TESTNET};
pub use contracts::universal_nft::{minted_token_id, UniversalNftContract};
pub use error::{BridgeError, ErrorKind, Result};
pub use protocol::{
    BridgePayload, MetadataAttribute, MetadataDocument, TokenId, TokenMetadata,
    TOKEN_ID_NAMESPACE,
};
pub use traits::{
    Clock, ContractDeployer, LedgerClient, RegistryStore, TxConfirmation, WalletSession,
};

// Public module for advanced users who need custom instrumentation
pub mod spans;
