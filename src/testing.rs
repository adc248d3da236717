//! Test utilities and fake implementations for the bridge seams
//!
//! This module provides scripted implementations of [`LedgerClient`],
//! [`WalletSession`] and [`Clock`] that enable testing the orchestrator and
//! the listing cache, including adversarial scenarios, without any network.
//!
//! For end-to-end protocol tests with real ledger semantics (burn, relay,
//! mint) use [`providers::local`](crate::providers::local) instead.

use alloy_primitives::{keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{BridgeError, Result};
use crate::protocol::{TokenId, TokenMetadata};
use crate::traits::{Clock, LedgerClient, TxConfirmation, WalletSession};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Fake Ledger Client
// ============================================================================

/// A submitted bridge call, as seen by [`FakeLedgerClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBridge {
    pub from: Address,
    pub dest_chain_id: u64,
    pub recipient: Address,
    pub token_id: TokenId,
    pub fee: U256,
    pub tx_hash: TxHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ReceiptMode {
    #[default]
    Success,
    Revert,
    Pending,
}

#[derive(Debug, Default)]
struct FakeLedgerState {
    owners: BTreeMap<TokenId, Address>,
    metadata: BTreeMap<TokenId, TokenMetadata>,
    trusted: HashSet<u64>,
    /// Owner that appears once more than `after` owner queries were made.
    scripted: Option<(TokenId, Address, u32)>,
    fee: U256,
    receipts: ReceiptMode,
    submitted: Vec<SubmittedBridge>,
    batched_disabled: bool,
    fail_all: bool,
    fail_owner_queries: u32,
    owner_calls: u32,
    listing_calls: u32,
    metadata_calls: u32,
}

/// A scripted ledger client.
///
/// This allows testing scenarios like:
/// - Destination owner appearing after several polls
/// - Messages that never arrive
/// - Flaky RPC during the completion watch
/// - Reverted or never-mined bridge transactions
/// - Contracts without the batched listing query
///
/// Submitting a bridge does not move the token; script the destination with
/// [`set_owner_after_polls`](Self::set_owner_after_polls).
#[derive(Clone, Debug)]
pub struct FakeLedgerClient {
    chain_id: u64,
    address: Address,
    state: Arc<Mutex<FakeLedgerState>>,
}

impl FakeLedgerClient {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            address: Address::from_word(keccak256(chain_id.to_be_bytes())),
            state: Arc::default(),
        }
    }

    /// Sets `owner` as the owner of `token_id`, with generated metadata.
    pub fn add_token(&self, token_id: TokenId, owner: Address) {
        let mut state = lock(&self.state);
        state.owners.insert(token_id, owner);
        state.metadata.entry(token_id).or_insert_with(|| TokenMetadata {
            name: format!("Universal NFT #{token_id}"),
            description: "A cross-chain NFT".to_string(),
            image: "ipfs://universal-nft".to_string(),
            origin_chain_id: token_id.origin_chain_id(),
            minted_at: 1_700_000_000,
        });
    }

    /// Makes `dest_chain_id` a trusted peer.
    pub fn trust(&self, dest_chain_id: u64) {
        lock(&self.state).trusted.insert(dest_chain_id);
    }

    /// The first `after` owner queries see no owner, later ones see `owner`.
    pub fn set_owner_after_polls(&self, token_id: TokenId, owner: Address, after: u32) {
        lock(&self.state).scripted = Some((token_id, owner, after));
    }

    pub fn set_fee(&self, fee: U256) {
        lock(&self.state).fee = fee;
    }

    /// Receipts of later submissions report a revert.
    pub fn revert_submissions(&self) {
        lock(&self.state).receipts = ReceiptMode::Revert;
    }

    /// Later submissions never get a receipt.
    pub fn hold_receipts(&self) {
        lock(&self.state).receipts = ReceiptMode::Pending;
    }

    /// Makes `getTokensWithMetadata` fail as on a contract without it.
    pub fn disable_batched_listing(&self) {
        lock(&self.state).batched_disabled = true;
    }

    /// Every later call fails with a provider error.
    pub fn fail_all_calls(&self) {
        lock(&self.state).fail_all = true;
    }

    /// The next `count` owner queries fail with a provider error.
    pub fn fail_next_owner_queries(&self, count: u32) {
        lock(&self.state).fail_owner_queries = count;
    }

    pub fn submitted(&self) -> Vec<SubmittedBridge> {
        lock(&self.state).submitted.clone()
    }

    /// Owner queries made so far, failed ones included.
    pub fn owner_calls(&self) -> u32 {
        lock(&self.state).owner_calls
    }

    /// Listing round trips: one per batched query or per `getTokensByOwner`.
    pub fn listing_calls(&self) -> u32 {
        lock(&self.state).listing_calls
    }

    pub fn metadata_calls(&self) -> u32 {
        lock(&self.state).metadata_calls
    }

    fn check_available(state: &FakeLedgerState) -> Result<()> {
        if state.fail_all {
            return Err(BridgeError::Provider("Simulated RPC error".to_string()));
        }
        Ok(())
    }

    fn owned_by(state: &FakeLedgerState, owner: Address) -> Vec<TokenId> {
        state
            .owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[async_trait]
impl LedgerClient for FakeLedgerClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn contract_address(&self) -> Address {
        self.address
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>> {
        let mut state = lock(&self.state);
        state.owner_calls += 1;
        Self::check_available(&state)?;
        if state.fail_owner_queries > 0 {
            state.fail_owner_queries -= 1;
            return Err(BridgeError::Provider("Simulated RPC error".to_string()));
        }
        if let Some((id, owner, after)) = state.scripted {
            if id == token_id {
                return Ok((state.owner_calls > after).then_some(owner));
            }
        }
        Ok(state.owners.get(&token_id).copied())
    }

    async fn tokens_with_metadata(
        &self,
        owner: Address,
    ) -> Result<(Vec<TokenId>, Vec<TokenMetadata>)> {
        let mut state = lock(&self.state);
        Self::check_available(&state)?;
        if state.batched_disabled {
            return Err(BridgeError::ContractCall(
                "getTokensWithMetadata reverted".to_string(),
            ));
        }
        state.listing_calls += 1;
        let ids = Self::owned_by(&state, owner);
        let metadata = ids
            .iter()
            .filter_map(|id| state.metadata.get(id).cloned())
            .collect();
        Ok((ids, metadata))
    }

    async fn tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>> {
        let mut state = lock(&self.state);
        Self::check_available(&state)?;
        state.listing_calls += 1;
        Ok(Self::owned_by(&state, owner))
    }

    async fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata> {
        let mut state = lock(&self.state);
        Self::check_available(&state)?;
        state.metadata_calls += 1;
        state
            .metadata
            .get(&token_id)
            .cloned()
            .ok_or(BridgeError::TokenNotFound { token_id })
    }

    async fn is_trusted_peer(&self, dest_chain_id: u64) -> Result<bool> {
        let state = lock(&self.state);
        Self::check_available(&state)?;
        Ok(state.trusted.contains(&dest_chain_id))
    }

    async fn quote_bridge(
        &self,
        _dest_chain_id: u64,
        _recipient: Address,
        _token_id: TokenId,
    ) -> Result<U256> {
        let state = lock(&self.state);
        Self::check_available(&state)?;
        Ok(state.fee)
    }

    async fn submit_bridge(
        &self,
        from: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> Result<TxHash> {
        let mut state = lock(&self.state);
        Self::check_available(&state)?;
        let nonce = state.submitted.len() as u64;
        let tx_hash = keccak256([self.chain_id.to_be_bytes(), nonce.to_be_bytes()].concat());
        state.submitted.push(SubmittedBridge {
            from,
            dest_chain_id,
            recipient,
            token_id,
            fee,
            tx_hash,
        });
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxConfirmation>> {
        let state = lock(&self.state);
        Self::check_available(&state)?;
        if !state.submitted.iter().any(|s| s.tx_hash == tx_hash) {
            return Ok(None);
        }
        let success = match state.receipts {
            ReceiptMode::Success => true,
            ReceiptMode::Revert => false,
            ReceiptMode::Pending => return Ok(None),
        };
        Ok(Some(TxConfirmation {
            tx_hash,
            block_number: Some(12345),
            success,
        }))
    }
}

// ============================================================================
// Fake Wallet
// ============================================================================

#[derive(Debug, Default)]
struct FakeWalletState {
    chain_id: u64,
    refuse: bool,
    ignore: bool,
    switch_count: usize,
}

/// A wallet session that can refuse or silently ignore network switches.
#[derive(Clone, Debug)]
pub struct FakeWallet {
    address: Address,
    state: Arc<Mutex<FakeWalletState>>,
}

impl FakeWallet {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            state: Arc::new(Mutex::new(FakeWalletState {
                chain_id,
                ..Default::default()
            })),
        }
    }

    /// Switch requests fail, as when the user rejects them.
    pub fn refuse_switches(&self) {
        lock(&self.state).refuse = true;
    }

    /// Switch requests succeed but leave the wallet where it was.
    pub fn ignore_switches(&self) {
        lock(&self.state).ignore = true;
    }

    pub fn switch_count(&self) -> usize {
        lock(&self.state).switch_count
    }
}

#[async_trait]
impl WalletSession for FakeWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn current_chain_id(&self) -> Result<u64> {
        Ok(lock(&self.state).chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        let mut state = lock(&self.state);
        state.switch_count += 1;
        if state.refuse {
            return Err(BridgeError::NetworkSwitchFailed {
                chain_id,
                reason: "user rejected the request".to_string(),
            });
        }
        if !state.ignore {
            state.chain_id = chain_id;
        }
        Ok(())
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// This enables testing timeout and debounce behavior without actually waiting.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *lock(&self.current_time) += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        lock(&self.sleep_log).iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        lock(&self.sleep_log).len()
    }

    pub fn clear_sleep_log(&self) {
        lock(&self.sleep_log).clear();
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleep_log).push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *lock(&self.current_time)
    }
}
