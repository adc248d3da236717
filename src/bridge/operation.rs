// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::time::Instant;

use alloy_primitives::{Address, TxHash};

use crate::protocol::TokenId;

/// Orchestrator-side progress of a bridge operation.
///
/// `Submitted -> SourceConfirmed -> DestinationConfirmed | TimedOut`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    /// The source transaction was accepted by the network.
    Submitted,
    /// The source transaction was mined; the token is in flight.
    SourceConfirmed,
    /// The recipient owns the token on the destination network.
    DestinationConfirmed,
    /// The watch gave up. The token may still arrive later.
    TimedOut,
}

impl BridgeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DestinationConfirmed | Self::TimedOut)
    }
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::SourceConfirmed => "source-confirmed",
            Self::DestinationConfirmed => "destination-confirmed",
            Self::TimedOut => "timed-out",
        };
        f.write_str(s)
    }
}

/// How a completion watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The recipient was observed as owner on the destination.
    Completed { polls: u32 },
    /// The timeout elapsed first. Not an error: delivery may still happen.
    TimedOut { polls: u32 },
    /// The caller stopped the watch. On-chain state is unaffected.
    Cancelled { polls: u32 },
}

impl CompletionOutcome {
    pub fn polls(&self) -> u32 {
        match self {
            Self::Completed { polls } | Self::TimedOut { polls } | Self::Cancelled { polls } => {
                *polls
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// One bridge request as tracked by the orchestrator. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeOperation {
    pub source_chain_id: u64,
    pub dest_chain_id: u64,
    pub token_id: TokenId,
    pub recipient: Address,
    pub tx_hash: TxHash,
    pub status: BridgeStatus,
    pub started_at: Instant,
}

impl BridgeOperation {
    /// Moves to `next`, refusing transitions the state machine does not have.
    pub(crate) fn advance(&mut self, next: BridgeStatus) -> bool {
        use BridgeStatus::*;

        let allowed = matches!(
            (self.status, next),
            (Submitted, SourceConfirmed)
                | (SourceConfirmed, DestinationConfirmed)
                | (SourceConfirmed, TimedOut)
        );
        if allowed {
            self.status = next;
        }
        allowed
    }
}

/// Result of [`NftBridge::bridge`](super::NftBridge::bridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeReport {
    pub operation: BridgeOperation,
    /// `None` when the caller asked not to wait for the destination.
    pub outcome: Option<CompletionOutcome>,
}
