// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bridge protocol types
//!
//! Token identifiers, immutable metadata and the cross-chain message codec
//! shared by the ledger, the orchestrator and the contract bindings.

mod metadata;
mod payload;
mod token_id;

pub use metadata::{MetadataAttribute, MetadataDocument, TokenMetadata};
pub use payload::BridgePayload;
pub use token_id::{TokenId, TOKEN_ID_NAMESPACE};
