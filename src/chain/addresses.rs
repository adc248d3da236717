// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Messaging endpoint addresses passed to every ledger constructor
//!
//! The relay network uses one endpoint address across all of its testnets and
//! another across its mainnets.

use alloy_primitives::{address, Address};

/// <https://docs.layerzero.network/v2/deployments/deployed-contracts>
pub const MESSAGING_ENDPOINT_TESTNET: Address =
    address!("6EDCE65403992e310A62460808c4b910D972f10f");

/// <https://docs.layerzero.network/v2/deployments/deployed-contracts>
pub const MESSAGING_ENDPOINT_MAINNET: Address =
    address!("1a44076050125825900e736c501f859c50fE728c");
