// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Process-wide RPC provider cache
//!
//! Lifecycle: a provider is created on first use for a `(chain id, signer)`
//! pair and reused by every later caller. Nothing is evicted; only
//! [`ProviderCache::reset`] empties the cache. Lookups take a read lock, so
//! concurrent readers never wait on each other once a provider exists.
//!
//! The RPC URL is only consulted when the provider is created. Calling again
//! with a different URL for the same chain returns the existing provider.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use once_cell::sync::Lazy;
use tracing::debug;
use url::Url;

type ProviderKey = (u64, Option<Address>);

static PROVIDERS: Lazy<RwLock<HashMap<ProviderKey, DynProvider>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Handle to the process-wide provider cache.
pub struct ProviderCache;

impl ProviderCache {
    /// Read-only provider for `chain_id`.
    pub fn read_only(chain_id: u64, rpc_url: &Url) -> DynProvider {
        Self::get_or_create((chain_id, None), || {
            ProviderBuilder::new()
                .connect_http(rpc_url.clone())
                .erased()
        })
    }

    /// Provider for `chain_id` that signs with `signer`.
    pub fn with_signer(chain_id: u64, rpc_url: &Url, signer: &PrivateKeySigner) -> DynProvider {
        Self::get_or_create((chain_id, Some(signer.address())), || {
            ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect_http(rpc_url.clone())
                .erased()
        })
    }

    pub fn contains(chain_id: u64, signer: Option<Address>) -> bool {
        PROVIDERS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(chain_id, signer))
    }

    pub fn len() -> usize {
        PROVIDERS.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    /// Drops every cached provider.
    pub fn reset() {
        let mut providers = PROVIDERS.write().unwrap_or_else(PoisonError::into_inner);
        debug!(dropped = providers.len(), event = "provider_cache_reset");
        providers.clear();
    }

    fn get_or_create(key: ProviderKey, create: impl FnOnce() -> DynProvider) -> DynProvider {
        if let Some(provider) = PROVIDERS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return provider.clone();
        }

        let mut providers = PROVIDERS.write().unwrap_or_else(PoisonError::into_inner);
        providers
            .entry(key)
            .or_insert_with(|| {
                debug!(
                    chain_id = key.0,
                    signer = ?key.1,
                    event = "provider_created"
                );
                create()
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the cache is process-wide and tests run in parallel.
    #[test]
    fn test_provider_lifecycle() {
        let url: Url = "http://127.0.0.1:8545".parse().unwrap();
        let signer = PrivateKeySigner::random();
        ProviderCache::reset();

        ProviderCache::read_only(31337, &url);
        ProviderCache::read_only(31337, &url);
        assert_eq!(ProviderCache::len(), 1);

        ProviderCache::with_signer(31337, &url, &signer);
        assert_eq!(ProviderCache::len(), 2);
        assert!(ProviderCache::contains(31337, Some(signer.address())));
        assert!(!ProviderCache::contains(1, None));

        ProviderCache::reset();
        assert!(ProviderCache::is_empty());
    }
}
