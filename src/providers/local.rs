// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-process multi-network devnet.
//!
//! [`LocalNetwork`] hosts one [`LedgerContract`] per chain, all connected to a
//! shared [`LocalMessageBus`]. The clients in this module implement the same
//! traits as the alloy-backed providers, so the orchestrator and the
//! reconciler run unchanged against it. Messages only move when the test
//! drives the [`LocalRelayer`], which is how delivery latency, loss and
//! duplication are modelled.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use alloy_primitives::{keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::deploy::NetworkDescriptor;
use crate::error::{BridgeError, Result};
use crate::ledger::{
    shared, DeliveryReport, LedgerContract, LocalMessageBus, LocalRelayer, SharedLedger,
};
use crate::protocol::{TokenId, TokenMetadata};
use crate::traits::{ContractDeployer, LedgerClient, TxConfirmation, WalletSession};

#[derive(Debug, Default)]
struct NetworkState {
    ledgers: RwLock<BTreeMap<u64, SharedLedger>>,
    receipts: Mutex<HashMap<TxHash, TxConfirmation>>,
    nonce: AtomicU64,
    block_timestamp: Mutex<Option<u64>>,
}

/// A set of in-memory ledgers sharing one messaging bus.
#[derive(Debug, Clone, Default)]
pub struct LocalNetwork {
    bus: LocalMessageBus,
    state: Arc<NetworkState>,
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a devnet whose bus charges `fee` per message.
    pub fn with_fee(fee: U256) -> Self {
        Self {
            bus: LocalMessageBus::with_fee(fee),
            state: Arc::default(),
        }
    }

    /// Pins the mint timestamp of ledgers deployed afterwards.
    pub fn set_block_timestamp(&self, timestamp: u64) {
        *self
            .state
            .block_timestamp
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(timestamp);
    }

    pub fn bus(&self) -> &LocalMessageBus {
        &self.bus
    }

    /// Deploys a ledger on `chain_id` administered by `owner`.
    pub fn deploy_ledger(&self, chain_id: u64, owner: Address) -> Result<Address> {
        let mut ledgers = self
            .state
            .ledgers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = ledgers.get(&chain_id) {
            let address = existing.lock().unwrap_or_else(PoisonError::into_inner).address();
            return Err(BridgeError::InvalidConfig(format!(
                "chain {chain_id} already hosts a ledger at {address}"
            )));
        }

        let nonce = self.state.nonce.fetch_add(1, Ordering::SeqCst);
        let address = derive_address(chain_id, nonce);
        let timestamp = *self
            .state
            .block_timestamp
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let ledger = LedgerContract::builder()
            .chain_id(chain_id)
            .address(address)
            .owner(owner)
            .endpoint(Arc::new(self.bus.clone()))
            .maybe_block_timestamp(timestamp)
            .build();
        ledgers.insert(chain_id, shared(ledger));

        debug!(
            chain_id = chain_id,
            contract_address = %address,
            event = "local_ledger_deployed"
        );
        Ok(address)
    }

    pub fn ledger(&self, chain_id: u64) -> Option<SharedLedger> {
        self.state
            .ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&chain_id)
            .cloned()
    }

    pub fn chain_ids(&self) -> Vec<u64> {
        self.state
            .ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    /// Runs `f` against the ledger on `chain_id`.
    pub fn with_ledger<T>(
        &self,
        chain_id: u64,
        f: impl FnOnce(&mut LedgerContract) -> Result<T>,
    ) -> Result<T> {
        let ledger = self
            .ledger(chain_id)
            .ok_or(BridgeError::UnsupportedChain { chain_id })?;
        let mut guard = ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Relayer that can deliver to every ledger deployed so far.
    pub fn relayer(&self) -> LocalRelayer {
        let mut relayer = LocalRelayer::new(self.bus.clone());
        for ledger in self
            .state
            .ledgers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            relayer.register(ledger.clone());
        }
        relayer
    }

    /// Delivers every in-flight message.
    pub fn deliver_all(&self) -> Vec<DeliveryReport> {
        self.relayer().deliver_all()
    }

    /// Read/write client for the ledger on `chain_id`.
    pub fn client(&self, chain_id: u64) -> Result<LocalLedgerClient> {
        let ledger = self
            .ledger(chain_id)
            .ok_or(BridgeError::UnsupportedChain { chain_id })?;
        let address = ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .address();
        Ok(LocalLedgerClient {
            chain_id,
            address,
            ledger,
            network: self.clone(),
        })
    }

    fn record_transaction(&self, success: bool) -> TxHash {
        let nonce = self.state.nonce.fetch_add(1, Ordering::SeqCst);
        let tx_hash = keccak256(nonce.to_be_bytes());
        self.state
            .receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                tx_hash,
                TxConfirmation {
                    tx_hash,
                    block_number: Some(nonce),
                    success,
                },
            );
        tx_hash
    }

    fn receipt(&self, tx_hash: TxHash) -> Option<TxConfirmation> {
        self.state
            .receipts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tx_hash)
            .copied()
    }
}

fn derive_address(chain_id: u64, nonce: u64) -> Address {
    let mut preimage = [0u8; 16];
    preimage[..8].copy_from_slice(&chain_id.to_be_bytes());
    preimage[8..].copy_from_slice(&nonce.to_be_bytes());
    Address::from_word(keccak256(preimage))
}

/// [`LedgerClient`] backed by a ledger of a [`LocalNetwork`].
///
/// Transactions are mined as soon as they are submitted. Like a node
/// estimating gas, a call that would revert is refused at submission with the
/// ledger's error.
#[derive(Debug, Clone)]
pub struct LocalLedgerClient {
    chain_id: u64,
    address: Address,
    ledger: SharedLedger,
    network: LocalNetwork,
}

impl LocalLedgerClient {
    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerContract> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mints a token to `caller` on this ledger.
    pub fn mint(&self, caller: Address) -> Result<TokenId> {
        self.lock().mint(caller)
    }
}

#[async_trait]
impl LedgerClient for LocalLedgerClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn contract_address(&self) -> Address {
        self.address
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>> {
        Ok(self.lock().try_owner_of(token_id))
    }

    async fn tokens_with_metadata(
        &self,
        owner: Address,
    ) -> Result<(Vec<TokenId>, Vec<TokenMetadata>)> {
        Ok(self.lock().tokens_with_metadata(owner))
    }

    async fn tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>> {
        Ok(self.lock().tokens_by_owner(owner))
    }

    async fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata> {
        self.lock().token_metadata(token_id)
    }

    async fn is_trusted_peer(&self, dest_chain_id: u64) -> Result<bool> {
        Ok(self.lock().peer(dest_chain_id).is_some())
    }

    async fn quote_bridge(
        &self,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
    ) -> Result<U256> {
        self.lock().quote_bridge(dest_chain_id, recipient, token_id)
    }

    async fn submit_bridge(
        &self,
        from: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> Result<TxHash> {
        self.lock()
            .bridge(from, dest_chain_id, recipient, token_id, fee)?;
        Ok(self.network.record_transaction(true))
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxConfirmation>> {
        Ok(self.network.receipt(tx_hash))
    }
}

/// [`ContractDeployer`] that deploys onto a [`LocalNetwork`].
#[derive(Debug, Clone)]
pub struct LocalDeployer {
    network: LocalNetwork,
    admin: Address,
    deploys: Arc<AtomicUsize>,
    peer_calls: Arc<AtomicUsize>,
}

impl LocalDeployer {
    /// Default administrator of ledgers deployed by [`LocalDeployer::new`].
    pub const DEFAULT_ADMIN: Address = Address::repeat_byte(0xAD);

    pub fn new(network: LocalNetwork) -> Self {
        Self::with_admin(network, Self::DEFAULT_ADMIN)
    }

    pub fn with_admin(network: LocalNetwork, admin: Address) -> Self {
        Self {
            network,
            admin,
            deploys: Arc::default(),
            peer_calls: Arc::default(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn network(&self) -> &LocalNetwork {
        &self.network
    }

    pub fn deploy_count(&self) -> usize {
        self.deploys.load(Ordering::SeqCst)
    }

    pub fn set_peer_count(&self) -> usize {
        self.peer_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractDeployer for LocalDeployer {
    async fn deploy(&self, network: &NetworkDescriptor) -> Result<Address> {
        let address = self.network.deploy_ledger(network.chain_id, self.admin)?;
        self.deploys.fetch_add(1, Ordering::SeqCst);
        Ok(address)
    }

    async fn mint_seed(&self, network: &NetworkDescriptor, _contract: Address) -> Result<TokenId> {
        self.network
            .with_ledger(network.chain_id, |ledger| ledger.mint(self.admin))
    }

    async fn set_peer(
        &self,
        network: &NetworkDescriptor,
        contract: Address,
        peer_chain_id: u64,
        peer: Address,
    ) -> Result<()> {
        self.peer_calls.fetch_add(1, Ordering::SeqCst);
        self.network.with_ledger(network.chain_id, |ledger| {
            if ledger.address() != contract {
                return Err(BridgeError::InvalidConfig(format!(
                    "no ledger at {contract} on chain {}",
                    network.chain_id
                )));
            }
            ledger.set_peer(self.admin, peer_chain_id, peer)
        })
    }
}

/// [`WalletSession`] connected to a [`LocalNetwork`].
#[derive(Debug, Clone)]
pub struct LocalWallet {
    address: Address,
    network: LocalNetwork,
    current: Arc<AtomicU64>,
    refuse_switch: Arc<std::sync::atomic::AtomicBool>,
}

impl LocalWallet {
    pub fn new(address: Address, network: LocalNetwork, chain_id: u64) -> Self {
        Self {
            address,
            network,
            current: Arc::new(AtomicU64::new(chain_id)),
            refuse_switch: Arc::default(),
        }
    }

    /// Makes every later switch request fail, as a user rejecting it would.
    pub fn refuse_switches(&self) {
        self.refuse_switch.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletSession for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn current_chain_id(&self) -> Result<u64> {
        Ok(self.current.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        if self.refuse_switch.load(Ordering::SeqCst) {
            return Err(BridgeError::NetworkSwitchFailed {
                chain_id,
                reason: "user rejected the request".to_string(),
            });
        }
        if self.network.ledger(chain_id).is_none() {
            return Err(BridgeError::NetworkSwitchFailed {
                chain_id,
                reason: "unknown network".to_string(),
            });
        }
        self.current.store(chain_id, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::repeat_byte(0x0A);

    #[tokio::test]
    async fn test_local_bridge_end_to_end() {
        let network = LocalNetwork::new();
        let admin = LocalDeployer::DEFAULT_ADMIN;
        let fuji = network.deploy_ledger(43113, admin).unwrap();
        let base = network.deploy_ledger(84532, admin).unwrap();
        network
            .with_ledger(43113, |l| l.set_peer(admin, 84532, base))
            .unwrap();
        network
            .with_ledger(84532, |l| l.set_peer(admin, 43113, fuji))
            .unwrap();

        let source = network.client(43113).unwrap();
        let destination = network.client(84532).unwrap();
        let id = source.mint(ALICE).unwrap();

        let tx = source
            .submit_bridge(ALICE, 84532, ALICE, id, U256::ZERO)
            .await
            .unwrap();
        assert!(source.transaction_receipt(tx).await.unwrap().unwrap().success);
        assert_eq!(destination.owner_of(id).await.unwrap(), None);

        let reports = network.deliver_all();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_accepted());
        assert_eq!(destination.owner_of(id).await.unwrap(), Some(ALICE));
        assert_eq!(source.owner_of(id).await.unwrap(), None);
    }

    #[test]
    fn test_second_deploy_on_same_chain_fails() {
        let network = LocalNetwork::new();
        network.deploy_ledger(43113, ALICE).unwrap();
        assert!(network.deploy_ledger(43113, ALICE).is_err());
    }

    #[tokio::test]
    async fn test_wallet_switch() {
        let network = LocalNetwork::new();
        network.deploy_ledger(43113, ALICE).unwrap();
        network.deploy_ledger(84532, ALICE).unwrap();
        let wallet = LocalWallet::new(ALICE, network, 84532);

        wallet.switch_chain(43113).await.unwrap();
        assert_eq!(wallet.current_chain_id().await.unwrap(), 43113);
        assert!(wallet.switch_chain(1).await.is_err());

        wallet.refuse_switches();
        assert!(matches!(
            wallet.switch_chain(84532).await,
            Err(BridgeError::NetworkSwitchFailed { .. })
        ));
    }
}
