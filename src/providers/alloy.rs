//! Alloy-based implementations of the bridge traits.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use alloy_network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::cache::ProviderCache;
use crate::contracts::universal_nft::{minted_token_id, UniversalNftContract};
use crate::deploy::{DeploymentRegistry, NetworkDescriptor};
use crate::error::{BridgeError, Result};
use crate::protocol::{TokenId, TokenMetadata};
use crate::traits::{ContractDeployer, LedgerClient, TxConfirmation, WalletSession};

/// [`LedgerClient`] for a deployed ledger contract, wrapping Alloy's [`Provider`].
///
/// # Examples
///
/// ```rust,no_run
/// use nft_bridge::providers::AlloyLedgerClient;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new()
///     .connect("https://sepolia.base.org")
///     .await?;
///
/// let client = AlloyLedgerClient::new(
///     84532,
///     address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
///     provider,
/// );
/// # Ok(())
/// # }
/// ```
pub struct AlloyLedgerClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    chain_id: u64,
    provider: P,
    contract: UniversalNftContract<P>,
}

impl<P> AlloyLedgerClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(chain_id: u64, address: Address, provider: P) -> Self {
        Self {
            chain_id,
            contract: UniversalNftContract::new(address, provider.clone()),
            provider,
        }
    }

    /// Returns a reference to the underlying Alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }

    pub fn contract(&self) -> &UniversalNftContract<P> {
        &self.contract
    }
}

impl AlloyLedgerClient<DynProvider> {
    /// Client for a recorded network, using the shared provider cache.
    ///
    /// With a `signer` the client can submit transactions; without one it is
    /// read-only.
    pub fn from_registry(
        registry: &DeploymentRegistry,
        network: &str,
        signer: Option<&PrivateKeySigner>,
    ) -> Result<Self> {
        let (chain_id, record) = registry.require_network(network)?;
        let rpc_url = parse_rpc_url(&record.rpc_url)?;
        let provider = match signer {
            Some(signer) => ProviderCache::with_signer(chain_id, &rpc_url, signer),
            None => ProviderCache::read_only(chain_id, &rpc_url),
        };
        Ok(Self::new(chain_id, record.address, provider))
    }
}

#[async_trait]
impl<P> LedgerClient for AlloyLedgerClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn contract_address(&self) -> Address {
        self.contract.address()
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id, token_id = %token_id))]
    async fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>> {
        trace!("Fetching token owner");
        self.contract.owner_of(token_id).await
    }

    async fn tokens_with_metadata(
        &self,
        owner: Address,
    ) -> Result<(Vec<TokenId>, Vec<TokenMetadata>)> {
        self.contract.tokens_with_metadata(owner).await
    }

    async fn tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>> {
        self.contract.tokens_by_owner(owner).await
    }

    async fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata> {
        self.contract.token_metadata(token_id).await
    }

    async fn is_trusted_peer(&self, dest_chain_id: u64) -> Result<bool> {
        Ok(self.contract.peer(dest_chain_id).await? != Address::ZERO)
    }

    async fn quote_bridge(
        &self,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
    ) -> Result<U256> {
        self.contract
            .quote_bridge(dest_chain_id, recipient, token_id)
            .await
    }

    async fn submit_bridge(
        &self,
        from: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> Result<TxHash> {
        let tx = self
            .contract
            .bridge_transaction(from, dest_chain_id, recipient, token_id, fee);
        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();

        info!(
            tx_hash = %tx_hash,
            chain_id = self.chain_id,
            token_id = %token_id,
            event = "bridge_transaction_sent"
        );
        Ok(tx_hash)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id, tx_hash = %tx_hash))]
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<TxConfirmation>> {
        trace!("Fetching transaction receipt");
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| BridgeError::Provider(e.to_string()))?;

        Ok(receipt.map(|receipt| {
            debug!("Transaction receipt found");
            TxConfirmation {
                tx_hash,
                block_number: receipt.block_number(),
                success: receipt.status(),
            }
        }))
    }
}

/// [`ContractDeployer`] that deploys the compiled ledger contract with a
/// local private key.
pub struct AlloyDeployer {
    signer: PrivateKeySigner,
    bytecode: Bytes,
}

impl AlloyDeployer {
    pub fn new(signer: PrivateKeySigner, bytecode: Bytes) -> Self {
        Self { signer, bytecode }
    }

    fn provider(&self, network: &NetworkDescriptor) -> DynProvider {
        ProviderCache::with_signer(network.chain_id, &network.rpc_url, &self.signer)
    }

    async fn send_and_confirm(
        &self,
        provider: &DynProvider,
        tx: TransactionRequest,
    ) -> Result<alloy_rpc_types::TransactionReceipt> {
        let receipt = provider
            .send_transaction(tx)
            .await?
            .get_receipt()
            .await
            .map_err(|e| BridgeError::Provider(e.to_string()))?;

        if !receipt.status() {
            return Err(BridgeError::TransactionFailed {
                reason: format!("transaction {} reverted", receipt.transaction_hash),
            });
        }
        Ok(receipt)
    }
}

#[async_trait]
impl ContractDeployer for AlloyDeployer {
    async fn deploy(&self, network: &NetworkDescriptor) -> Result<Address> {
        let provider = self.provider(network);
        let endpoint = network.resolve_messaging_endpoint()?;
        let owner = self.signer.address();

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&(endpoint, owner).abi_encode_params());
        let tx = TransactionRequest::default()
            .with_from(owner)
            .with_deploy_code(code);

        let receipt = self.send_and_confirm(&provider, tx).await?;
        receipt
            .contract_address
            .ok_or_else(|| BridgeError::TransactionFailed {
                reason: format!(
                    "deployment {} produced no contract address",
                    receipt.transaction_hash
                ),
            })
    }

    async fn mint_seed(&self, network: &NetworkDescriptor, contract: Address) -> Result<TokenId> {
        let provider = self.provider(network);
        let nft = UniversalNftContract::new(contract, provider.clone());
        let receipt = self
            .send_and_confirm(&provider, nft.mint_transaction(self.signer.address()))
            .await?;
        minted_token_id(&receipt).ok_or_else(|| BridgeError::TransactionFailed {
            reason: "mint receipt carries no Minted event".to_string(),
        })
    }

    async fn set_peer(
        &self,
        network: &NetworkDescriptor,
        contract: Address,
        peer_chain_id: u64,
        peer: Address,
    ) -> Result<()> {
        let provider = self.provider(network);
        let nft = UniversalNftContract::new(contract, provider.clone());

        if nft.peer(peer_chain_id).await? == peer {
            debug!(
                chain_id = network.chain_id,
                peer_chain_id = peer_chain_id,
                event = "peer_already_set"
            );
            return Ok(());
        }

        let tx = nft.set_peer_transaction(self.signer.address(), peer_chain_id, peer);
        self.send_and_confirm(&provider, tx).await?;
        info!(
            chain_id = network.chain_id,
            peer_chain_id = peer_chain_id,
            peer = %peer,
            event = "peer_configured"
        );
        Ok(())
    }
}

/// [`WalletSession`] backed by a local private key.
///
/// The "connected" network is the RPC endpoint currently selected; switching
/// selects another recorded network. The chain id is always read back from
/// the endpoint, so an RPC URL pointing at the wrong chain is caught.
pub struct SignerWallet {
    signer: PrivateKeySigner,
    endpoints: HashMap<u64, Url>,
    selected: Arc<RwLock<u64>>,
}

impl SignerWallet {
    /// Wallet that can connect to every network in `registry`, starting on
    /// `initial_chain_id`.
    pub fn new(
        signer: PrivateKeySigner,
        registry: &DeploymentRegistry,
        initial_chain_id: u64,
    ) -> Result<Self> {
        let endpoints = registry
            .iter()
            .map(|(chain_id, record)| Ok((chain_id, parse_rpc_url(&record.rpc_url)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self {
            signer,
            endpoints,
            selected: Arc::new(RwLock::new(initial_chain_id)),
        })
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    fn selected(&self) -> u64 {
        *self.selected.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WalletSession for SignerWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn current_chain_id(&self) -> Result<u64> {
        let selected = self.selected();
        let url = self
            .endpoints
            .get(&selected)
            .ok_or(BridgeError::UnsupportedChain { chain_id: selected })?;
        let provider = ProviderCache::with_signer(selected, url, &self.signer);
        provider
            .get_chain_id()
            .await
            .map_err(|e| BridgeError::Provider(e.to_string()))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        if !self.endpoints.contains_key(&chain_id) {
            return Err(BridgeError::NetworkSwitchFailed {
                chain_id,
                reason: "no deployment recorded for this chain".to_string(),
            });
        }
        *self.selected.write().unwrap_or_else(PoisonError::into_inner) = chain_id;
        info!(chain_id = chain_id, event = "network_switched");
        Ok(())
    }
}

fn parse_rpc_url(raw: &str) -> Result<Url> {
    raw.parse().map_err(|e: url::ParseError| BridgeError::InvalidUrl {
        reason: format!("{raw}: {e}"),
    })
}
