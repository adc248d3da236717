// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use alloy_primitives::Address;
use tracing::debug;

use crate::bridge::{list_nfts, OwnedNft};
use crate::error::Result;
use crate::traits::{Clock, LedgerClient};

/// Minimum time between two remote fetches for the same network and owner.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// A token list together with when it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub chain_id: u64,
    pub owner: Address,
    pub tokens: Vec<OwnedNft>,
    pub fetched_at: Instant,
    /// True when the list was served without a remote call.
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    tokens: Vec<OwnedNft>,
    fetched_at: Instant,
}

/// Per-network cache of a wallet's owned tokens.
///
/// A fetch is skipped when the previous one for the same network and owner
/// completed less than the debounce window ago. Safe to share between tasks.
///
/// # Example
///
/// ```rust,no_run
/// use nft_bridge::cache::ListingCache;
/// use nft_bridge::providers::TokioClock;
///
/// let cache = ListingCache::new(TokioClock::new());
/// ```
#[derive(Debug)]
pub struct ListingCache<C: Clock> {
    clock: C,
    debounce: Duration,
    entries: Mutex<HashMap<(u64, Address), Entry>>,
}

impl<C: Clock> ListingCache<C> {
    pub fn new(clock: C) -> Self {
        Self::with_debounce(clock, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(clock: C, debounce: Duration) -> Self {
        Self {
            clock,
            debounce,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Tokens `owner` holds on the client's network.
    ///
    /// Serves the cached list if it is younger than the debounce window;
    /// `force` always fetches.
    pub async fn list<L: LedgerClient + ?Sized>(
        &self,
        client: &L,
        owner: Address,
        force: bool,
    ) -> Result<Listing> {
        let chain_id = client.chain_id();
        let key = (chain_id, owner);

        if !force {
            if let Some(entry) = self.fresh_entry(key) {
                debug!(
                    chain_id = chain_id,
                    owner = %owner,
                    age_ms = self.clock.now().duration_since(entry.fetched_at).as_millis() as u64,
                    event = "listing_fetch_debounced"
                );
                return Ok(Listing {
                    chain_id,
                    owner,
                    tokens: entry.tokens,
                    fetched_at: entry.fetched_at,
                    from_cache: true,
                });
            }
        }

        let tokens = list_nfts(client, owner).await?;
        let fetched_at = self.clock.now();
        self.lock().insert(
            key,
            Entry {
                tokens: tokens.clone(),
                fetched_at,
            },
        );

        Ok(Listing {
            chain_id,
            owner,
            tokens,
            fetched_at,
            from_cache: false,
        })
    }

    /// Last fetched list, however old.
    pub fn cached(&self, chain_id: u64, owner: Address) -> Option<Vec<OwnedNft>> {
        self.lock()
            .get(&(chain_id, owner))
            .map(|entry| entry.tokens.clone())
    }

    /// Forgets every list fetched for `chain_id`.
    pub fn invalidate(&self, chain_id: u64) {
        self.lock().retain(|(chain, _), _| *chain != chain_id);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn fresh_entry(&self, key: (u64, Address)) -> Option<Entry> {
        let now = self.clock.now();
        self.lock()
            .get(&key)
            .filter(|entry| now.duration_since(entry.fetched_at) < self.debounce)
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(u64, Address), Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
