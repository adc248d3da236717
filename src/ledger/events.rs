// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, B256};

use crate::protocol::TokenId;

/// Notifications emitted by a [`LedgerContract`](super::LedgerContract).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Minted {
        token_id: TokenId,
        owner: Address,
    },
    BridgedOut {
        token_id: TokenId,
        src_chain: u64,
        dst_chain: u64,
        recipient: Address,
        guid: B256,
    },
    BridgedIn {
        token_id: TokenId,
        recipient: Address,
        src_chain: u64,
        guid: B256,
    },
    PeerSet {
        chain_id: u64,
        peer: Address,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
}

impl LedgerEvent {
    /// Token the event refers to, if any.
    pub fn token_id(&self) -> Option<TokenId> {
        match self {
            Self::Minted { token_id, .. }
            | Self::BridgedOut { token_id, .. }
            | Self::BridgedIn { token_id, .. } => Some(*token_id),
            _ => None,
        }
    }
}
