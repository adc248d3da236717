// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::Address;
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, warn, Instrument};

use crate::error::{BridgeError, Result};
use crate::protocol::{TokenId, TokenMetadata};
use crate::spans;
use crate::traits::LedgerClient;

/// A token and its metadata, ready for display or selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNft {
    pub token_id: TokenId,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
}

/// Tokens `owner` holds on the client's network, ascending by id.
///
/// Uses the batched `getTokensWithMetadata` query. If the contract call
/// fails, falls back to `getTokensByOwner` plus one concurrent metadata query
/// per id. Connectivity errors are not retried through the fallback.
pub async fn list_nfts<L: LedgerClient + ?Sized>(
    client: &L,
    owner: Address,
) -> Result<Vec<OwnedNft>> {
    let span = spans::list_nfts(client.chain_id(), &owner);
    async move {
        let (mut tokens, batched) = match client.tokens_with_metadata(owner).await {
            Ok((ids, metadata)) => (zip(ids, metadata)?, true),
            Err(BridgeError::ContractCall(reason)) => {
                warn!(
                    chain_id = client.chain_id(),
                    reason = %reason,
                    event = "batched_listing_unavailable"
                );
                (per_token(client, owner).await?, false)
            }
            Err(e) => return Err(e),
        };
        tokens.sort_by_key(|t| t.token_id);

        let span = tracing::Span::current();
        span.record("token_count", tokens.len());
        span.record("batched", batched);
        debug!(
            chain_id = client.chain_id(),
            owner = %owner,
            token_count = tokens.len(),
            event = "nfts_listed"
        );
        Ok(tokens)
    }
    .instrument(span)
    .await
}

async fn per_token<L: LedgerClient + ?Sized>(client: &L, owner: Address) -> Result<Vec<OwnedNft>> {
    let ids = client.tokens_by_owner(owner).await?;
    let metadata = try_join_all(ids.iter().map(|id| client.token_metadata(*id))).await?;
    zip(ids, metadata)
}

fn zip(ids: Vec<TokenId>, metadata: Vec<TokenMetadata>) -> Result<Vec<OwnedNft>> {
    if ids.len() != metadata.len() {
        return Err(BridgeError::InvalidMetadata(format!(
            "{} ids but {} metadata entries",
            ids.len(),
            metadata.len()
        )));
    }
    Ok(ids
        .into_iter()
        .zip(metadata)
        .map(|(token_id, metadata)| OwnedNft { token_id, metadata })
        .collect())
}
