// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-side caches
//!
//! [`ListingCache`] bounds RPC volume when several triggers ask for the same
//! token list in quick succession. [`ProviderCache`] keeps one RPC provider
//! per network for the whole process.

mod listing;
mod providers;

pub use listing::{Listing, ListingCache, DEFAULT_DEBOUNCE};
pub use providers::ProviderCache;
