// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Origin-partitioned token identifiers
//!
//! Every ledger mints ids inside its own namespace, `originChainId * 10^4 + sequence`,
//! so two networks can mint concurrently without ever handing out the same id.
//! The id never changes when a token is bridged; only its owning network does.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Number of ids available to each origin chain.
pub const TOKEN_ID_NAMESPACE: u64 = 10_000;

/// A globally unique NFT identifier.
///
/// # Example
///
/// ```rust
/// use nft_bridge::TokenId;
///
/// let id = TokenId::new(43113, 0).unwrap();
/// assert_eq!(id.to_string(), "431130000");
/// assert_eq!(id.origin_chain_id(), 43113);
/// assert_eq!(id.sequence(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(U256);

impl TokenId {
    /// Builds the id for the `sequence`-th token minted on `origin_chain_id`.
    ///
    /// Returns `None` once the chain's namespace is exhausted.
    pub fn new(origin_chain_id: u64, sequence: u64) -> Option<Self> {
        if sequence >= TOKEN_ID_NAMESPACE {
            return None;
        }
        let base = U256::from(origin_chain_id).checked_mul(U256::from(TOKEN_ID_NAMESPACE))?;
        base.checked_add(U256::from(sequence)).map(Self)
    }

    /// The chain whose namespace this id belongs to.
    pub fn origin_chain_id(&self) -> u64 {
        u64::try_from(self.0 / U256::from(TOKEN_ID_NAMESPACE)).unwrap_or(u64::MAX)
    }

    /// Position of the token within its origin chain's namespace.
    pub fn sequence(&self) -> u64 {
        u64::try_from(self.0 % U256::from(TOKEN_ID_NAMESPACE)).unwrap_or(u64::MAX)
    }

    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<U256> for TokenId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<TokenId> for U256 {
    fn from(value: TokenId) -> Self {
        value.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<U256>()
            .map(Self)
            .map_err(|e| BridgeError::InvalidConfig(format!("invalid token id {s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(43113, 0, "431130000")]
    #[case(84532, 17, "845320017")]
    #[case(10, 1, "100001")]
    #[case(421614, 9999, "4216149999")]
    fn test_token_id_layout(#[case] chain: u64, #[case] sequence: u64, #[case] expected: &str) {
        let id = TokenId::new(chain, sequence).unwrap();
        assert_eq!(id.to_string(), expected);
        assert_eq!(id.origin_chain_id(), chain);
        assert_eq!(id.sequence(), sequence);
    }

    #[test]
    fn test_namespace_exhausted() {
        assert!(TokenId::new(43113, TOKEN_ID_NAMESPACE).is_none());
    }

    #[test]
    fn test_namespaces_do_not_overlap() {
        let last_on_ten = TokenId::new(10, TOKEN_ID_NAMESPACE - 1).unwrap();
        let first_on_eleven = TokenId::new(11, 0).unwrap();
        assert!(last_on_ten < first_on_eleven);
    }

    #[test]
    fn test_parse() {
        let id: TokenId = "431130000".parse().unwrap();
        assert_eq!(id, TokenId::new(43113, 0).unwrap());
        assert!("not-a-number".parse::<TokenId>().is_err());
    }
}
