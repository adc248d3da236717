// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! UniversalNft contract bindings and wrapper
//!
//! Typed access to the deployed ledger contract: the read queries used by the
//! orchestrator and the cache, and transaction builders for `mint`, `bridge`
//! and `setPeer`. Wrapper methods never send transactions themselves; callers
//! sign and submit the returned [`TransactionRequest`].

use alloy_json_rpc::RpcError;
use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_sol_types::sol;
use alloy_transport::TransportErrorKind;
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::protocol::{TokenId, TokenMetadata};
use UniversalNft::UniversalNftInstance;

/// Wrapper around a deployed ledger contract.
///
/// # Example
///
/// ```rust,no_run
/// use nft_bridge::UniversalNftContract;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("https://api.avax-test.network/ext/bc/C/rpc").await?;
/// let nft = UniversalNftContract::new(address!("5FbDB2315678afecb367f032d93F642f64180aa3"), provider);
///
/// let owner = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
/// let (ids, metadata) = nft.tokens_with_metadata(owner).await?;
/// for (id, m) in ids.iter().zip(&metadata) {
///     println!("{id}: {}", m.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct UniversalNftContract<P: Provider<Ethereum>> {
    instance: UniversalNftInstance<P>,
}

impl<P: Provider<Ethereum>> UniversalNftContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "universal_nft_contract_initialized"
        );
        Self {
            instance: UniversalNftInstance::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }

    /// Owner of `token_id`, or `None` if the contract reverts because the
    /// token does not exist on this network.
    pub async fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>> {
        match self.instance.ownerOf(token_id.as_u256()).call().await {
            Ok(owner) => Ok(Some(owner)),
            Err(alloy_contract::Error::TransportError(e)) if is_revert(&e) => {
                debug!(
                    token_id = %token_id,
                    contract_address = %self.instance.address(),
                    event = "owner_of_reverted"
                );
                Ok(None)
            }
            Err(e) => Err(contract_error(e)),
        }
    }

    /// Ids and metadata owned by `owner` in one round trip.
    pub async fn tokens_with_metadata(
        &self,
        owner: Address,
    ) -> Result<(Vec<TokenId>, Vec<TokenMetadata>)> {
        let result = self
            .instance
            .getTokensWithMetadata(owner)
            .call()
            .await
            .map_err(contract_error)?;

        if result.tokenIds.len() != result.metadata.len() {
            return Err(BridgeError::InvalidMetadata(format!(
                "contract returned {} ids but {} metadata entries",
                result.tokenIds.len(),
                result.metadata.len()
            )));
        }

        let ids = result.tokenIds.into_iter().map(TokenId::from).collect();
        let metadata = result
            .metadata
            .into_iter()
            .map(TokenMetadata::try_from)
            .collect::<Result<Vec<_>>>()?;

        info!(
            owner = %owner,
            contract_address = %self.instance.address(),
            event = "tokens_with_metadata_retrieved"
        );

        Ok((ids, metadata))
    }

    pub async fn tokens_by_owner(&self, owner: Address) -> Result<Vec<TokenId>> {
        let ids = self
            .instance
            .getTokensByOwner(owner)
            .call()
            .await
            .map_err(contract_error)?;
        Ok(ids.into_iter().map(TokenId::from).collect())
    }

    pub async fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata> {
        let metadata = self
            .instance
            .getTokenMetadata(token_id.as_u256())
            .call()
            .await
            .map_err(contract_error)?;
        TokenMetadata::try_from(metadata)
    }

    pub async fn token_uri(&self, token_id: TokenId) -> Result<String> {
        self.instance
            .tokenURI(token_id.as_u256())
            .call()
            .await
            .map_err(contract_error)
    }

    /// Configured peer for `chain_id`; the zero address means none.
    pub async fn peer(&self, chain_id: u64) -> Result<Address> {
        self.instance
            .peers(chain_id)
            .call()
            .await
            .map_err(contract_error)
    }

    pub async fn paused(&self) -> Result<bool> {
        self.instance.paused().call().await.map_err(contract_error)
    }

    /// Native fee required by `bridge` for this token and destination.
    pub async fn quote_bridge(
        &self,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
    ) -> Result<U256> {
        self.instance
            .quoteBridge(dest_chain_id, recipient, token_id.as_u256())
            .call()
            .await
            .map_err(contract_error)
    }

    pub fn mint_transaction(&self, from: Address) -> TransactionRequest {
        info!(
            from = %from,
            contract_address = %self.instance.address(),
            event = "mint_transaction_created"
        );
        self.instance.mint().from(from).into_transaction_request()
    }

    pub fn bridge_transaction(
        &self,
        from: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            dest_chain_id = dest_chain_id,
            recipient = %recipient,
            token_id = %token_id,
            fee = %fee,
            contract_address = %self.instance.address(),
            event = "bridge_transaction_created"
        );
        self.instance
            .bridge(dest_chain_id, recipient, token_id.as_u256())
            .from(from)
            .value(fee)
            .into_transaction_request()
    }

    pub fn set_peer_transaction(
        &self,
        from: Address,
        chain_id: u64,
        peer: Address,
    ) -> TransactionRequest {
        info!(
            from = %from,
            peer_chain_id = chain_id,
            peer = %peer,
            contract_address = %self.instance.address(),
            event = "set_peer_transaction_created"
        );
        self.instance
            .setPeer(chain_id, peer)
            .from(from)
            .into_transaction_request()
    }
}

/// Extracts the id assigned by `mint` from its receipt.
pub fn minted_token_id(receipt: &TransactionReceipt) -> Option<TokenId> {
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<UniversalNft::Minted>().ok())
        .map(|log| TokenId::from(log.inner.data.tokenId))
}

impl TryFrom<UniversalNft::TokenMetadata> for TokenMetadata {
    type Error = BridgeError;

    fn try_from(value: UniversalNft::TokenMetadata) -> Result<Self> {
        Ok(Self {
            name: value.name,
            description: value.description,
            image: value.image,
            origin_chain_id: u64::try_from(value.originChainId).map_err(|_| {
                BridgeError::InvalidMetadata("originChainId does not fit in 64 bits".to_string())
            })?,
            minted_at: u64::try_from(value.mintedAt).map_err(|_| {
                BridgeError::InvalidMetadata("mintedAt does not fit in 64 bits".to_string())
            })?,
        })
    }
}

/// Reverts are contract answers; every other RPC failure is connectivity.
fn contract_error(e: alloy_contract::Error) -> BridgeError {
    match e {
        alloy_contract::Error::TransportError(e) if !is_revert(&e) => {
            BridgeError::Provider(e.to_string())
        }
        e => BridgeError::ContractCall(e.to_string()),
    }
}

const EXECUTION_REVERTED_CODE: i64 = 3;

/// JSON-RPC error responses nodes use for `execution reverted`.
fn is_revert(e: &RpcError<TransportErrorKind>) -> bool {
    e.as_error_resp().is_some_and(|resp| {
        resp.code == EXECUTION_REVERTED_CODE
            || resp.message.contains("revert")
            || resp.as_revert_data().is_some()
    })
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract UniversalNft {
        struct TokenMetadata {
            string name;
            string description;
            string image;
            uint256 originChainId;
            uint256 mintedAt;
        }

        event Minted(uint256 indexed tokenId, address indexed owner);
        event BridgedOut(uint256 indexed tokenId, uint64 srcChainId, uint64 dstChainId, address recipient, bytes32 guid);
        event BridgedIn(uint256 indexed tokenId, address indexed recipient, uint64 srcChainId, bytes32 guid);
        event PeerSet(uint64 chainId, address peer);

        function mint() external returns (uint256);
        function bridge(uint64 dstChainId, address recipient, uint256 tokenId) external payable returns (bytes32);
        function quoteBridge(uint64 dstChainId, address recipient, uint256 tokenId) external view returns (uint256 nativeFee);
        function setPeer(uint64 chainId, address peer) external;
        function peers(uint64 chainId) external view returns (address);
        function paused() external view returns (bool);
        function ownerOf(uint256 tokenId) external view returns (address);
        function getTokenMetadata(uint256 tokenId) external view returns (TokenMetadata memory);
        function getTokensByOwner(address owner) external view returns (uint256[] memory);
        function getTokensWithMetadata(address owner) external view returns (uint256[] memory tokenIds, TokenMetadata[] memory metadata);
        function tokenURI(uint256 tokenId) external view returns (string memory);
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_rpc::ErrorPayload;
    use rstest::rstest;

    fn error_response(json: &str) -> alloy_contract::Error {
        let payload: ErrorPayload = serde_json::from_str(json).unwrap();
        alloy_contract::Error::TransportError(RpcError::ErrorResp(payload))
    }

    #[rstest]
    #[case::code_3(r#"{"code":3,"message":"execution reverted","data":"0x7e273289"}"#)]
    #[case::geth_style(r#"{"code":-32000,"message":"execution reverted"}"#)]
    fn test_reverts_are_contract_errors(#[case] json: &str) {
        let error = contract_error(error_response(json));
        assert!(matches!(error, BridgeError::ContractCall(_)));
    }

    #[rstest]
    #[case::rate_limited(error_response(r#"{"code":-32005,"message":"rate limit exceeded"}"#))]
    #[case::unreachable(alloy_contract::Error::TransportError(
        TransportErrorKind::custom_str("connection refused")
    ))]
    fn test_transport_failures_are_provider_errors(#[case] error: alloy_contract::Error) {
        let error = contract_error(error);
        assert!(matches!(error, BridgeError::Provider(_)));
    }

    #[test]
    fn test_wire_metadata_conversion() {
        let wire = UniversalNft::TokenMetadata {
            name: "Universal NFT #431130000".to_string(),
            description: "d".to_string(),
            image: "ipfs://x".to_string(),
            originChainId: U256::from(43113u64),
            mintedAt: U256::from(1_735_689_600u64),
        };
        let metadata = TokenMetadata::try_from(wire).unwrap();
        assert_eq!(metadata.origin_chain_id, 43113);
        assert_eq!(metadata.minted_at, 1_735_689_600);
    }

    #[test]
    fn test_oversized_chain_id_is_rejected() {
        let wire = UniversalNft::TokenMetadata {
            name: String::new(),
            description: String::new(),
            image: String::new(),
            originChainId: U256::MAX,
            mintedAt: U256::ZERO,
        };
        assert!(matches!(
            TokenMetadata::try_from(wire),
            Err(BridgeError::InvalidMetadata(_))
        ));
    }
}
