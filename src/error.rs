// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, B256};
use thiserror::Error;

use crate::protocol::TokenId;

/// Coarse classification of a [`BridgeError`].
///
/// Callers use this to decide how to surface a failure:
///
/// - [`ErrorKind::Precondition`]: rejected before any state changed; show the
///   reason and let the user fix the request.
/// - [`ErrorKind::Connectivity`]: RPC or wallet trouble; ask the user to fix the
///   connection and retry. Mutating calls are never retried automatically.
/// - [`ErrorKind::InboundRejected`]: a ledger refused an inbound message. This is
///   a security boundary, not a user-facing error.
/// - [`ErrorKind::Configuration`]: deployment records, artifacts or CLI input are
///   wrong.
/// - [`ErrorKind::Internal`]: decoding or IO failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Connectivity,
    InboundRejected,
    Configuration,
    Internal,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Caller {caller} does not own token {token_id}")]
    NotTokenOwner { token_id: TokenId, caller: Address },

    #[error("Destination chain {chain_id} is not a trusted peer")]
    UntrustedDestination { chain_id: u64 },

    #[error("Source and destination are the same network (chain {chain_id})")]
    SameChain { chain_id: u64 },

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Token {token_id} does not exist on this network")]
    TokenNotFound { token_id: TokenId },

    #[error("Token {token_id} already exists on this network")]
    TokenAlreadyExists { token_id: TokenId },

    #[error("Contract is paused")]
    ContractPaused,

    #[error("Caller {caller} is not authorized for this operation")]
    Unauthorized { caller: Address },

    #[error("Token id namespace of chain {chain_id} is exhausted")]
    TokenIdSpaceExhausted { chain_id: u64 },

    #[error("Inbound message from untrusted peer {sender} on chain {src_chain}")]
    UntrustedPeer { src_chain: u64, sender: Address },

    #[error("Message {guid} was already processed")]
    DuplicateDelivery { guid: B256 },

    #[error("Messaging failed: {reason}")]
    MessagingFailed { reason: String },

    #[error("Wallet is connected to chain {actual}, expected chain {expected}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Could not switch wallet to chain {chain_id}: {reason}")]
    NetworkSwitchFailed { chain_id: u64, reason: String },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Chain not supported: {chain_id}")]
    UnsupportedChain { chain_id: u64 },

    #[error("No deployment recorded for network {network}")]
    NetworkNotDeployed { network: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Invalid contract artifact: {reason}")]
    InvalidArtifact { reason: String },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Classifies the error according to how callers should react to it.
    pub fn kind(&self) -> ErrorKind {
        use BridgeError::*;

        match self {
            NotTokenOwner { .. }
            | UntrustedDestination { .. }
            | SameChain { .. }
            | InvalidRecipient(_)
            | TokenNotFound { .. }
            | TokenAlreadyExists { .. }
            | ContractPaused
            | Unauthorized { .. }
            | TokenIdSpaceExhausted { .. } => ErrorKind::Precondition,
            WrongNetwork { .. }
            | NetworkSwitchFailed { .. }
            | Provider(_)
            | ContractCall(_)
            | TransactionFailed { .. }
            | MessagingFailed { .. }
            | Rpc(_) => ErrorKind::Connectivity,
            UntrustedPeer { .. } | DuplicateDelivery { .. } => ErrorKind::InboundRejected,
            UnsupportedChain { .. }
            | NetworkNotDeployed { .. }
            | InvalidConfig(_)
            | InvalidUrl { .. }
            | InvalidArtifact { .. } => ErrorKind::Configuration,
            InvalidMetadata(_) | Abi(_) | Json(_) | Hex(_) | Io(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if the error was raised before any state could change.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
