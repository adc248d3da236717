//! Core trait abstractions for bridge operations.
//!
//! The orchestrator, the reconciler and the listing cache only see these
//! traits. Production code plugs in the alloy-backed implementations from
//! [`providers`](crate::providers); tests plug in the in-memory ledgers from
//! [`providers::local`](crate::providers::local) or the scripted fakes from
//! [`testing`](crate::testing).
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use nft_bridge::{Clock, Result};
//! use std::time::{Duration, Instant};
//!
//! struct FrozenClock(Instant);
//!
//! #[async_trait::async_trait]
//! impl Clock for FrozenClock {
//!     async fn sleep(&self, _duration: Duration) {}
//!
//!     fn now(&self) -> Instant {
//!         self.0
//!     }
//! }
//! ```

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::deploy::{DeploymentRegistry, NetworkDescriptor};
use crate::error::Result;
use crate::protocol::{TokenId, TokenMetadata};

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxConfirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// False when the transaction was mined but reverted.
    pub success: bool,
}

/// Read and write access to one network's ledger contract.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Destination owner appearing only after several polls
/// - Messages that never arrive (timeout)
/// - Flaky RPC during the completion watch
/// - Reverted bridge transactions
/// - Contracts without the batched listing query
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Chain the ledger lives on.
    fn chain_id(&self) -> u64;

    /// Address of the ledger contract on that chain.
    fn contract_address(&self) -> Address;

    /// Owner of `token_id`, or `None` if the token is not active on this
    /// network (never minted here, or burned for a bridge).
    async fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>>;

    /// Ids and metadata owned by `owner`, index-aligned, in one call.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ContractCall`](crate::BridgeError::ContractCall)
    /// if the contract does not offer the batched query.
    async fn tokens_with_metadata(
        &self,
        owner: Address,
    ) -> Result<(Vec<TokenId>, Vec<TokenMetadata>)>;

    async fn tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>>;

    async fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata>;

    /// Whether this ledger will send to `dest_chain_id`.
    async fn is_trusted_peer(&self, dest_chain_id: u64) -> Result<bool>;

    /// Messaging fee for bridging `token_id` to `dest_chain_id`.
    async fn quote_bridge(
        &self,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
    ) -> Result<U256>;

    /// Submits `bridge(dest, recipient, tokenId)` from `from`, paying `fee`.
    ///
    /// Returns once the transaction is accepted by the network, not once it
    /// is mined.
    async fn submit_bridge(
        &self,
        from: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> Result<TxHash>;

    /// Receipt of a submitted transaction, or `None` while it is pending.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxConfirmation>>;
}

/// The user's signing session.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Address transactions are sent from.
    fn address(&self) -> Address;

    /// Chain the session is currently connected to.
    async fn current_chain_id(&self) -> Result<u64>;

    /// Asks the session to connect to `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NetworkSwitchFailed`](crate::BridgeError::NetworkSwitchFailed)
    /// if the wallet refuses or does not know the chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;
}

/// Deploys and configures ledger contracts for the reconciler.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploys a fresh ledger on `network` and returns its address.
    async fn deploy(&self, network: &NetworkDescriptor) -> Result<Address>;

    /// Mints one token on a freshly deployed ledger.
    async fn mint_seed(&self, network: &NetworkDescriptor, contract: Address) -> Result<TokenId>;

    /// Makes `contract` trust `peer` as its counterpart on `peer_chain_id`.
    async fn set_peer(
        &self,
        network: &NetworkDescriptor,
        contract: Address,
        peer_chain_id: u64,
        peer: Address,
    ) -> Result<()>;
}

/// Persistence for the deployment record set.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Loads the current record set; a missing store yields an empty set.
    async fn load(&self) -> Result<DeploymentRegistry>;

    async fn save(&self, registry: &DeploymentRegistry) -> Result<()>;
}

/// Trait for time-based operations.
///
/// This trait abstracts sleep and time queries, enabling fast-forward testing
/// where tests can instantly advance through polling loops, debounce windows
/// and timeouts without actually waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}
