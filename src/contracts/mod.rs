// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Ledger contract bindings
//!
//! Alloy-generated bindings for the deployed ledger contract, plus an
//! instrumented wrapper, [`UniversalNftContract`](universal_nft::UniversalNftContract).

pub mod universal_nft;
