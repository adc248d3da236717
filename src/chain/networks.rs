//! Known-network catalog
//!
//! This module defines the `BridgeNetwork` trait, which maps a chain to the
//! values the reconciler and the CLI need before any deployment record exists:
//! the short network key, a public RPC endpoint, the block explorer and the
//! messaging endpoint address.

use alloy_chains::NamedChain;
use alloy_primitives::Address;

use super::addresses::{MESSAGING_ENDPOINT_MAINNET, MESSAGING_ENDPOINT_TESTNET};
use crate::{BridgeError, Result};

/// Chain configuration for bridge deployments
///
/// Implemented on `alloy_chains::NamedChain`.
///
/// # Example
///
/// ```rust
/// use nft_bridge::BridgeNetwork;
/// use alloy_chains::NamedChain;
///
/// let fuji = NamedChain::AvalancheFuji;
/// assert_eq!(fuji.network_key().unwrap(), "fuji");
/// assert_eq!(NamedChain::from_network_key("fuji").unwrap(), fuji);
/// ```
pub trait BridgeNetwork: Sized {
    /// Short name used in deployment records and on the command line.
    fn network_key(&self) -> Result<&'static str>;

    /// Public RPC endpoint used when no override is configured.
    fn default_rpc_url(&self) -> Result<&'static str>;

    /// Block explorer base URL, if the network has one.
    fn block_explorer_url(&self) -> Result<Option<&'static str>>;

    /// Messaging endpoint the ledger contract is constructed with.
    fn messaging_endpoint(&self) -> Result<Address>;

    /// Reverse lookup of [`BridgeNetwork::network_key`].
    fn from_network_key(key: &str) -> Result<Self>;
}

const SUPPORTED: &[NamedChain] = &[
    NamedChain::Sepolia,
    NamedChain::ArbitrumSepolia,
    NamedChain::AvalancheFuji,
    NamedChain::BaseSepolia,
    NamedChain::OptimismSepolia,
    NamedChain::PolygonAmoy,
    NamedChain::AnvilHardhat,
];

impl BridgeNetwork for NamedChain {
    fn network_key(&self) -> Result<&'static str> {
        Ok(match self {
            Self::Sepolia => "sepolia",
            Self::ArbitrumSepolia => "arbitrumSepolia",
            Self::AvalancheFuji => "fuji",
            Self::BaseSepolia => "baseSepolia",
            Self::OptimismSepolia => "optimismSepolia",
            Self::PolygonAmoy => "amoy",
            Self::AnvilHardhat => "localhost",
            _ => return Err(unsupported(*self)),
        })
    }

    fn default_rpc_url(&self) -> Result<&'static str> {
        Ok(match self {
            Self::Sepolia => "https://ethereum-sepolia-rpc.publicnode.com",
            Self::ArbitrumSepolia => "https://sepolia-rollup.arbitrum.io/rpc",
            Self::AvalancheFuji => "https://api.avax-test.network/ext/bc/C/rpc",
            Self::BaseSepolia => "https://sepolia.base.org",
            Self::OptimismSepolia => "https://sepolia.optimism.io",
            Self::PolygonAmoy => "https://rpc-amoy.polygon.technology",
            Self::AnvilHardhat => "http://127.0.0.1:8545",
            _ => return Err(unsupported(*self)),
        })
    }

    fn block_explorer_url(&self) -> Result<Option<&'static str>> {
        Ok(match self {
            Self::Sepolia => Some("https://sepolia.etherscan.io"),
            Self::ArbitrumSepolia => Some("https://sepolia.arbiscan.io"),
            Self::AvalancheFuji => Some("https://testnet.snowtrace.io"),
            Self::BaseSepolia => Some("https://sepolia.basescan.org"),
            Self::OptimismSepolia => Some("https://sepolia-optimism.etherscan.io"),
            Self::PolygonAmoy => Some("https://amoy.polygonscan.com"),
            Self::AnvilHardhat => None,
            _ => return Err(unsupported(*self)),
        })
    }

    fn messaging_endpoint(&self) -> Result<Address> {
        if !SUPPORTED.contains(self) {
            return Err(unsupported(*self));
        }
        Ok(if self.is_testnet() || *self == Self::AnvilHardhat {
            MESSAGING_ENDPOINT_TESTNET
        } else {
            MESSAGING_ENDPOINT_MAINNET
        })
    }

    fn from_network_key(key: &str) -> Result<Self> {
        SUPPORTED
            .iter()
            .copied()
            .find(|chain| chain.network_key().is_ok_and(|k| k.eq_ignore_ascii_case(key)))
            .ok_or_else(|| BridgeError::InvalidConfig(format!("unknown network {key:?}")))
    }
}

fn unsupported(chain: NamedChain) -> BridgeError {
    BridgeError::UnsupportedChain {
        chain_id: chain as u64,
    }
}
