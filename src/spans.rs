//! OpenTelemetry span helpers for bridge operations
//!
//! Static span names with structured attributes, kept apart from the business
//! logic that uses them.
//!
//! # Example
//!
//! ```rust,no_run
//! use nft_bridge::{spans, TokenId};
//! use alloy_primitives::Address;
//!
//! let span = spans::watch_completion(
//!     TokenId::from(431130000u64),
//!     84532,
//!     &Address::ZERO,
//!     300, // timeout
//!     5,   // poll interval
//! );
//! let _guard = span.enter();
//! // Your custom polling logic here
//! ```

use alloy_primitives::{Address, TxHash};
use tracing::Span;

use crate::protocol::TokenId;

/// Create span for a full bridge operation.
///
/// Parent: caller
/// Children: nft_bridge.wait_for_confirmation, nft_bridge.watch_completion
#[inline]
pub fn bridge(
    source_chain_id: u64,
    destination_chain_id: u64,
    token_id: TokenId,
    recipient: &Address,
) -> Span {
    tracing::info_span!(
        "nft_bridge.bridge",
        source_chain_id = source_chain_id,
        destination_chain_id = destination_chain_id,
        token_id = %token_id,
        recipient = %recipient,
        tx_hash = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting on the source transaction receipt.
///
/// Parent: nft_bridge.bridge
/// Children: Provider RPC calls (polling)
#[inline]
pub fn wait_for_confirmation(tx_hash: TxHash, chain_id: u64, max_attempts: u32) -> Span {
    tracing::debug_span!(
        "nft_bridge.wait_for_confirmation",
        tx_hash = %tx_hash,
        chain_id = chain_id,
        max_attempts = max_attempts,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for the destination completion watch.
///
/// Parent: nft_bridge.bridge
/// Children: nft_bridge.check_destination_owner (one per poll)
#[inline]
pub fn watch_completion(
    token_id: TokenId,
    destination_chain_id: u64,
    recipient: &Address,
    timeout_secs: u64,
    poll_interval_secs: u64,
) -> Span {
    tracing::info_span!(
        "nft_bridge.watch_completion",
        token_id = %token_id,
        destination_chain_id = destination_chain_id,
        recipient = %recipient,
        timeout_secs = timeout_secs,
        poll_interval_secs = poll_interval_secs,
        outcome = tracing::field::Empty,
    )
}

/// Create span for a single destination owner query.
///
/// Parent: nft_bridge.watch_completion
/// Children: Provider RPC calls
#[inline]
pub fn check_destination_owner(token_id: TokenId, attempt: u32) -> Span {
    tracing::trace_span!(
        "nft_bridge.check_destination_owner",
        token_id = %token_id,
        attempt = attempt,
    )
}

/// Create span for a reconciler run.
///
/// Parent: caller
/// Children: nft_bridge.deploy_ledger, nft_bridge.configure_peer
#[inline]
pub fn reconcile(target_count: usize) -> Span {
    tracing::info_span!(
        "nft_bridge.reconcile",
        target_count = target_count,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for deploying one ledger.
///
/// Parent: nft_bridge.reconcile
#[inline]
pub fn deploy_ledger(network_key: &str, chain_id: u64) -> Span {
    tracing::info_span!(
        "nft_bridge.deploy_ledger",
        network = network_key,
        chain_id = chain_id,
        contract_address = tracing::field::Empty,
    )
}

/// Create span for one `setPeer` call.
///
/// Parent: nft_bridge.reconcile
#[inline]
pub fn configure_peer(chain_id: u64, peer_chain_id: u64, peer: &Address) -> Span {
    tracing::debug_span!(
        "nft_bridge.configure_peer",
        chain_id = chain_id,
        peer_chain_id = peer_chain_id,
        peer = %peer,
    )
}

/// Create span for listing a wallet's tokens on one network.
///
/// Parent: caller or listing cache
#[inline]
pub fn list_nfts(chain_id: u64, owner: &Address) -> Span {
    tracing::debug_span!(
        "nft_bridge.list_nfts",
        chain_id = chain_id,
        owner = %owner,
        token_count = tracing::field::Empty,
        batched = tracing::field::Empty,
    )
}

/// Record error attributes on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use nft_bridge::spans;
/// use nft_bridge::BridgeError;
///
/// # fn example() -> Result<(), BridgeError> {
/// let span = tracing::info_span!("nft_bridge.operation");
/// let _guard = span.enter();
///
/// let result = some_operation();
/// if let Err(ref e) = result {
///     spans::record_error(e);
/// }
/// result
/// # }
/// # fn some_operation() -> Result<(), BridgeError> { Ok(()) }
/// ```
pub fn record_error<E: std::error::Error>(error: &E) {
    let current_span = tracing::Span::current();
    let message = error.to_string();
    current_span.record(
        "error.type",
        message.split(':').next().unwrap_or("Unknown"),
    );
    current_span.record("error.message", message.as_str());
    current_span.record("otel.status_code", "ERROR");
}

/// Record error attributes with custom context on the current span.
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
