// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, TxHash};
use bon::Builder;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use super::config::PollingConfig;
use super::listing::OwnedNft;
use super::operation::{BridgeOperation, BridgeReport, BridgeStatus, CompletionOutcome};
use crate::cache::ListingCache;
use crate::error::{BridgeError, Result};
use crate::protocol::TokenId;
use crate::spans;
use crate::traits::{Clock, LedgerClient, TxConfirmation, WalletSession};

/// Moves tokens from one network's ledger to another's and watches for arrival.
///
/// One instance serves one source/destination pair. Independent instances can
/// bridge different tokens concurrently; they share nothing but the provider
/// cache behind their clients.
///
/// # Example
///
/// ```rust,no_run
/// use nft_bridge::providers::local::{LocalNetwork, LocalWallet};
/// use nft_bridge::providers::TokioClock;
/// use nft_bridge::{NftBridge, PollingConfig};
/// use alloy_primitives::Address;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let network = LocalNetwork::new();
/// let admin = Address::repeat_byte(0xAD);
/// network.deploy_ledger(43113, admin)?;
/// network.deploy_ledger(84532, admin)?;
///
/// let alice = Address::repeat_byte(0x0A);
/// let bridge = NftBridge::builder()
///     .source(network.client(43113)?)
///     .destination(network.client(84532)?)
///     .wallet(LocalWallet::new(alice, network.clone(), 43113))
///     .clock(TokioClock::new())
///     .config(PollingConfig::fast())
///     .build();
///
/// let token_id = bridge.source().mint(alice)?;
/// let report = bridge.bridge(token_id, None, &CancellationToken::new()).await?;
/// println!("{}", report.operation.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Builder)]
pub struct NftBridge<S, D, W, C>
where
    S: LedgerClient,
    D: LedgerClient,
    W: WalletSession,
    C: Clock + Clone,
{
    source: S,
    destination: D,
    wallet: W,
    clock: C,
    #[builder(default)]
    config: PollingConfig,
    /// Debounced token lists for both networks, on the bridge's clock.
    #[builder(default = ListingCache::new(clock.clone()))]
    listings: ListingCache<C>,
}

impl<S, D, W, C> NftBridge<S, D, W, C>
where
    S: LedgerClient,
    D: LedgerClient,
    W: WalletSession,
    C: Clock + Clone,
{
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    pub fn source_chain_id(&self) -> u64 {
        self.source.chain_id()
    }

    pub fn destination_chain_id(&self) -> u64 {
        self.destination.chain_id()
    }

    pub fn listings(&self) -> &ListingCache<C> {
        &self.listings
    }

    /// Tokens the wallet holds on the source network.
    ///
    /// Repeated calls within the debounce window reuse the last fetch.
    pub async fn list_source_nfts(&self) -> Result<Vec<OwnedNft>> {
        let listing = self
            .listings
            .list(&self.source, self.wallet.address(), false)
            .await?;
        Ok(listing.tokens)
    }

    /// Tokens the wallet holds on the destination network.
    ///
    /// Repeated calls within the debounce window reuse the last fetch.
    pub async fn list_destination_nfts(&self) -> Result<Vec<OwnedNft>> {
        let listing = self
            .listings
            .list(&self.destination, self.wallet.address(), false)
            .await?;
        Ok(listing.tokens)
    }

    /// Bridges `token_id` and waits for it to land.
    ///
    /// Runs every step up to source confirmation, then watches the
    /// destination until the recipient owns the token, the timeout elapses or
    /// `cancel` fires. A timed-out or cancelled watch is reported through
    /// [`BridgeReport::outcome`], not as an error.
    ///
    /// `recipient` defaults to the wallet's address.
    ///
    /// # Errors
    ///
    /// Precondition errors are returned before anything is submitted.
    /// [`BridgeError::TransactionFailed`] means the source transaction
    /// reverted or was never mined; the token did not move.
    pub async fn bridge(
        &self,
        token_id: TokenId,
        recipient: Option<Address>,
        cancel: &CancellationToken,
    ) -> Result<BridgeReport> {
        let recipient = recipient.unwrap_or_else(|| self.wallet.address());
        let span = spans::bridge(
            self.source_chain_id(),
            self.destination_chain_id(),
            token_id,
            &recipient,
        );

        async move {
            let mut operation = self.submit_and_confirm(token_id, recipient).await?;
            let outcome = self.watch_completion(&mut operation, cancel).await;

            info!(
                token_id = %token_id,
                tx_hash = %operation.tx_hash,
                status = %operation.status,
                polls = outcome.polls(),
                event = "bridge_finished"
            );
            Ok(BridgeReport {
                operation,
                outcome: Some(outcome),
            })
        }
        .instrument(span)
        .await
    }

    /// Bridges `token_id` and returns once the source transaction is mined.
    pub async fn bridge_no_wait(
        &self,
        token_id: TokenId,
        recipient: Option<Address>,
    ) -> Result<BridgeReport> {
        let recipient = recipient.unwrap_or_else(|| self.wallet.address());
        let span = spans::bridge(
            self.source_chain_id(),
            self.destination_chain_id(),
            token_id,
            &recipient,
        );

        async move {
            let operation = self.submit_and_confirm(token_id, recipient).await?;
            Ok(BridgeReport {
                operation,
                outcome: None,
            })
        }
        .instrument(span)
        .await
    }

    async fn submit_and_confirm(
        &self,
        token_id: TokenId,
        recipient: Address,
    ) -> Result<BridgeOperation> {
        let result = async {
            self.validate(recipient)?;
            self.ensure_network().await?;
            let mut operation = self.submit(token_id, recipient).await?;
            tracing::Span::current().record("tx_hash", tracing::field::display(operation.tx_hash));
            self.confirm_source(&mut operation).await?;
            Ok(operation)
        }
        .await;

        if let Err(ref e) = result {
            spans::record_error(e);
            error!(
                token_id = %token_id,
                error = %e,
                event = "bridge_failed"
            );
        }
        result
    }

    fn validate(&self, recipient: Address) -> Result<()> {
        if self.source_chain_id() == self.destination_chain_id() {
            return Err(BridgeError::SameChain {
                chain_id: self.source_chain_id(),
            });
        }
        if recipient == Address::ZERO {
            return Err(BridgeError::InvalidRecipient(
                "the zero address cannot receive tokens".to_string(),
            ));
        }
        Ok(())
    }

    /// Makes sure the wallet is connected to the source network.
    async fn ensure_network(&self) -> Result<()> {
        let expected = self.source_chain_id();
        let current = self.wallet.current_chain_id().await?;
        if current == expected {
            return Ok(());
        }

        info!(
            current_chain_id = current,
            expected_chain_id = expected,
            event = "network_switch_requested"
        );
        self.wallet.switch_chain(expected).await?;

        let actual = self.wallet.current_chain_id().await?;
        if actual != expected {
            return Err(BridgeError::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    async fn submit(&self, token_id: TokenId, recipient: Address) -> Result<BridgeOperation> {
        let caller = self.wallet.address();
        let dest_chain_id = self.destination_chain_id();

        match self.source.owner_of(token_id).await? {
            None => return Err(BridgeError::TokenNotFound { token_id }),
            Some(owner) if owner != caller => {
                return Err(BridgeError::NotTokenOwner { token_id, caller })
            }
            Some(_) => {}
        }
        if !self.source.is_trusted_peer(dest_chain_id).await? {
            return Err(BridgeError::UntrustedDestination {
                chain_id: dest_chain_id,
            });
        }

        let fee = self
            .source
            .quote_bridge(dest_chain_id, recipient, token_id)
            .await?;
        let tx_hash = self
            .source
            .submit_bridge(caller, dest_chain_id, recipient, token_id, fee)
            .await?;

        info!(
            token_id = %token_id,
            tx_hash = %tx_hash,
            source_chain_id = self.source_chain_id(),
            destination_chain_id = dest_chain_id,
            recipient = %recipient,
            fee = %fee,
            event = "bridge_submitted"
        );

        Ok(BridgeOperation {
            source_chain_id: self.source_chain_id(),
            dest_chain_id,
            token_id,
            recipient,
            tx_hash,
            status: BridgeStatus::Submitted,
            started_at: self.clock.now(),
        })
    }

    async fn confirm_source(&self, operation: &mut BridgeOperation) -> Result<()> {
        let confirmation = self.wait_for_confirmation(operation.tx_hash).await?;
        if !confirmation.success {
            return Err(BridgeError::TransactionFailed {
                reason: format!("bridge transaction {} reverted", operation.tx_hash),
            });
        }

        operation.advance(BridgeStatus::SourceConfirmed);
        self.listings.invalidate(operation.source_chain_id);
        info!(
            tx_hash = %operation.tx_hash,
            block_number = ?confirmation.block_number,
            event = "source_confirmed"
        );
        Ok(())
    }

    /// Polls the source network until the transaction has a receipt.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<TxConfirmation> {
        let max_attempts = self.config.max_receipt_attempts;
        let span = spans::wait_for_confirmation(tx_hash, self.source_chain_id(), max_attempts);

        async move {
            for attempt in 1..=max_attempts {
                match self.source.transaction_receipt(tx_hash).await {
                    Ok(Some(confirmation)) => return Ok(confirmation),
                    Ok(None) => {
                        debug!(attempt = attempt, event = "receipt_pending");
                    }
                    Err(e) => {
                        warn!(
                            attempt = attempt,
                            error = %e,
                            event = "receipt_query_failed"
                        );
                    }
                }
                if attempt < max_attempts {
                    self.clock.sleep(self.config.receipt_poll_interval).await;
                }
            }

            spans::record_error_with_context(
                "ReceiptTimeout",
                &format!("No receipt for {tx_hash} after {max_attempts} attempts"),
                None,
            );
            Err(BridgeError::TransactionFailed {
                reason: format!("no receipt for {tx_hash} after {max_attempts} attempts"),
            })
        }
        .instrument(span)
        .await
    }

    /// Watches the destination until `operation.recipient` owns the token.
    ///
    /// The first query happens `initial_delay` after the call; later ones every
    /// `poll_interval` until `timeout` has elapsed since the call. Query errors
    /// are logged and the watch goes on. Cancellation is honoured at every
    /// suspension point and leaves the operation `SourceConfirmed`.
    pub async fn watch_completion(
        &self,
        operation: &mut BridgeOperation,
        cancel: &CancellationToken,
    ) -> CompletionOutcome {
        let span = spans::watch_completion(
            operation.token_id,
            operation.dest_chain_id,
            &operation.recipient,
            self.config.timeout.as_secs(),
            self.config.poll_interval.as_secs(),
        );

        async move {
            let outcome = self.poll_destination(operation, cancel).await;
            let label = match outcome {
                CompletionOutcome::Completed { .. } => {
                    operation.advance(BridgeStatus::DestinationConfirmed);
                    self.listings.invalidate(operation.dest_chain_id);
                    "completed"
                }
                CompletionOutcome::TimedOut { .. } => {
                    operation.advance(BridgeStatus::TimedOut);
                    warn!(
                        token_id = %operation.token_id,
                        destination_chain_id = operation.dest_chain_id,
                        timeout_secs = self.config.timeout.as_secs(),
                        event = "completion_watch_timed_out"
                    );
                    "timed_out"
                }
                CompletionOutcome::Cancelled { .. } => {
                    info!(token_id = %operation.token_id, event = "completion_watch_cancelled");
                    "cancelled"
                }
            };
            tracing::Span::current().record("outcome", label);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn poll_destination(
        &self,
        operation: &BridgeOperation,
        cancel: &CancellationToken,
    ) -> CompletionOutcome {
        let deadline = self.clock.now() + self.config.timeout;
        let mut polls = 0u32;

        if !self.pause(self.config.initial_delay, cancel).await {
            return CompletionOutcome::Cancelled { polls };
        }

        loop {
            if cancel.is_cancelled() {
                return CompletionOutcome::Cancelled { polls };
            }

            polls += 1;
            let check = spans::check_destination_owner(operation.token_id, polls);
            match self
                .destination
                .owner_of(operation.token_id)
                .instrument(check)
                .await
            {
                Ok(Some(owner)) if owner == operation.recipient => {
                    info!(
                        token_id = %operation.token_id,
                        owner = %owner,
                        polls = polls,
                        event = "destination_confirmed"
                    );
                    return CompletionOutcome::Completed { polls };
                }
                Ok(Some(owner)) => {
                    warn!(
                        token_id = %operation.token_id,
                        owner = %owner,
                        expected = %operation.recipient,
                        event = "destination_owner_mismatch"
                    );
                }
                Ok(None) => {
                    debug!(attempt = polls, event = "destination_pending");
                }
                Err(e) => {
                    warn!(
                        attempt = polls,
                        error = %e,
                        event = "destination_query_failed"
                    );
                }
            }

            let now = self.clock.now();
            if now >= deadline {
                return CompletionOutcome::TimedOut { polls };
            }
            let wait = self.config.poll_interval.min(deadline - now);
            if !self.pause(wait, cancel).await {
                return CompletionOutcome::Cancelled { polls };
            }
        }
    }

    /// Sleeps for `duration`; false if `cancel` fired first.
    async fn pause(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        if duration.is_zero() {
            return !cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.clock.sleep(duration) => !cancel.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClock, FakeLedgerClient, FakeWallet};
    use std::sync::Arc;

    const ALICE: Address = Address::repeat_byte(0x0A);
    const BOB: Address = Address::repeat_byte(0x0B);
    const FUJI: u64 = 43113;
    const BASE_SEPOLIA: u64 = 84532;

    fn token() -> TokenId {
        TokenId::new(FUJI, 0).unwrap()
    }

    fn clients() -> (FakeLedgerClient, FakeLedgerClient) {
        let source = FakeLedgerClient::new(FUJI);
        source.add_token(token(), ALICE);
        source.trust(BASE_SEPOLIA);
        let destination = FakeLedgerClient::new(BASE_SEPOLIA);
        (source, destination)
    }

    fn bridge_with(
        source: FakeLedgerClient,
        destination: FakeLedgerClient,
        clock: FakeClock,
    ) -> NftBridge<FakeLedgerClient, FakeLedgerClient, FakeWallet, FakeClock> {
        NftBridge::builder()
            .source(source)
            .destination(destination)
            .wallet(FakeWallet::new(ALICE, FUJI))
            .clock(clock)
            .build()
    }

    #[tokio::test]
    async fn test_completes_when_recipient_appears() {
        let (source, destination) = clients();
        destination.set_owner_after_polls(token(), ALICE, 2);
        let clock = FakeClock::new();
        let bridge = bridge_with(source.clone(), destination.clone(), clock.clone());

        let report = bridge
            .bridge(token(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.operation.status, BridgeStatus::DestinationConfirmed);
        assert_eq!(report.outcome, Some(CompletionOutcome::Completed { polls: 3 }));
        assert_eq!(report.operation.recipient, ALICE);
        assert_eq!(source.submitted().len(), 1);
        // initial delay, then two poll intervals
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_times_out_without_error() {
        let (source, destination) = clients();
        let clock = FakeClock::new();
        let bridge = bridge_with(source, destination.clone(), clock.clone());

        let report = bridge
            .bridge(token(), Some(BOB), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.operation.status, BridgeStatus::TimedOut);
        assert_eq!(report.outcome, Some(CompletionOutcome::TimedOut { polls: 59 }));
        assert_eq!(destination.owner_calls(), 59);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_query_errors_do_not_stop_the_watch() {
        let (source, destination) = clients();
        destination.fail_next_owner_queries(2);
        destination.set_owner_after_polls(token(), ALICE, 0);
        let bridge = bridge_with(source, destination, FakeClock::new());

        let report = bridge
            .bridge(token(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.outcome, Some(CompletionOutcome::Completed { polls: 3 }));
    }

    #[tokio::test]
    async fn test_pre_cancelled_watch_does_not_poll() {
        let (source, destination) = clients();
        let bridge = bridge_with(source, destination.clone(), FakeClock::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = bridge.bridge(token(), None, &cancel).await.unwrap();

        assert_eq!(report.outcome, Some(CompletionOutcome::Cancelled { polls: 0 }));
        assert_eq!(report.operation.status, BridgeStatus::SourceConfirmed);
        assert_eq!(destination.owner_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_watch() {
        let (source, destination) = clients();
        let bridge = Arc::new(
            NftBridge::builder()
                .source(source)
                .destination(destination.clone())
                .wallet(FakeWallet::new(ALICE, FUJI))
                .clock(crate::providers::TokioClock::new())
                .build(),
        );
        let cancel = CancellationToken::new();

        let task = {
            let bridge = bridge.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { bridge.bridge(token(), None, &cancel).await })
        };
        // first destination query happens at 10 s, the next would be at 15 s
        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel.cancel();

        let report = task.await.unwrap().unwrap();
        assert_eq!(report.outcome, Some(CompletionOutcome::Cancelled { polls: 1 }));
        assert_eq!(destination.owner_calls(), 1);
    }

    #[tokio::test]
    async fn test_same_chain_is_rejected() {
        let source = FakeLedgerClient::new(FUJI);
        source.add_token(token(), ALICE);
        let bridge = bridge_with(source.clone(), FakeLedgerClient::new(FUJI), FakeClock::new());

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(result, Err(BridgeError::SameChain { chain_id: FUJI })));
        assert!(source.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_not_owner_is_rejected_before_submit() {
        let (source, destination) = clients();
        source.add_token(token(), BOB);
        let bridge = bridge_with(source.clone(), destination, FakeClock::new());

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(
            result,
            Err(BridgeError::NotTokenOwner { caller, .. }) if caller == ALICE
        ));
        assert!(source.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let (source, destination) = clients();
        let bridge = bridge_with(source, destination, FakeClock::new());

        let result = bridge
            .bridge_no_wait(TokenId::new(FUJI, 9).unwrap(), None)
            .await;

        assert!(matches!(result, Err(BridgeError::TokenNotFound { .. })));
    }

    #[tokio::test]
    async fn test_untrusted_destination_is_rejected() {
        let source = FakeLedgerClient::new(FUJI);
        source.add_token(token(), ALICE);
        let bridge = bridge_with(
            source.clone(),
            FakeLedgerClient::new(BASE_SEPOLIA),
            FakeClock::new(),
        );

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(
            result,
            Err(BridgeError::UntrustedDestination { chain_id: BASE_SEPOLIA })
        ));
        assert!(source.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_switches_network_before_submitting() {
        let (source, destination) = clients();
        let wallet = FakeWallet::new(ALICE, BASE_SEPOLIA);
        let bridge = NftBridge::builder()
            .source(source)
            .destination(destination)
            .wallet(wallet.clone())
            .clock(FakeClock::new())
            .build();

        let report = bridge.bridge_no_wait(token(), None).await.unwrap();

        assert_eq!(report.operation.status, BridgeStatus::SourceConfirmed);
        assert_eq!(report.outcome, None);
        assert_eq!(wallet.switch_count(), 1);
    }

    #[tokio::test]
    async fn test_refused_switch_aborts_without_submitting() {
        let (source, destination) = clients();
        let wallet = FakeWallet::new(ALICE, BASE_SEPOLIA);
        wallet.refuse_switches();
        let bridge = NftBridge::builder()
            .source(source.clone())
            .destination(destination)
            .wallet(wallet)
            .clock(FakeClock::new())
            .build();

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(result, Err(BridgeError::NetworkSwitchFailed { .. })));
        assert!(source.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_switch_is_wrong_network() {
        let (source, destination) = clients();
        let wallet = FakeWallet::new(ALICE, BASE_SEPOLIA);
        wallet.ignore_switches();
        let bridge = NftBridge::builder()
            .source(source)
            .destination(destination)
            .wallet(wallet)
            .clock(FakeClock::new())
            .build();

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(
            result,
            Err(BridgeError::WrongNetwork { expected: FUJI, actual: BASE_SEPOLIA })
        ));
    }

    #[tokio::test]
    async fn test_reverted_source_transaction_fails() {
        let (source, destination) = clients();
        source.revert_submissions();
        let bridge = bridge_with(source, destination.clone(), FakeClock::new());

        let result = bridge.bridge(token(), None, &CancellationToken::new()).await;

        assert!(matches!(result, Err(BridgeError::TransactionFailed { .. })));
        assert_eq!(destination.owner_calls(), 0);
    }

    #[tokio::test]
    async fn test_receipt_never_arrives() {
        let (source, destination) = clients();
        source.hold_receipts();
        let clock = FakeClock::new();
        let bridge = NftBridge::builder()
            .source(source)
            .destination(destination)
            .wallet(FakeWallet::new(ALICE, FUJI))
            .clock(clock.clone())
            .config(PollingConfig::default().with_max_receipt_attempts(4))
            .build();

        let result = bridge.bridge_no_wait(token(), None).await;

        assert!(matches!(result, Err(BridgeError::TransactionFailed { .. })));
        assert_eq!(clock.sleep_count(), 3);
    }

    #[tokio::test]
    async fn test_destination_listing_is_debounced() {
        let (source, destination) = clients();
        destination.add_token(TokenId::new(BASE_SEPOLIA, 0).unwrap(), ALICE);
        let clock = FakeClock::new();
        let bridge = bridge_with(source, destination.clone(), clock.clone());

        let first = bridge.list_destination_nfts().await.unwrap();
        let second = bridge.list_destination_nfts().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(destination.listing_calls(), 1);

        clock.advance(Duration::from_secs(10));
        bridge.list_destination_nfts().await.unwrap();
        assert_eq!(destination.listing_calls(), 2);
    }

    #[tokio::test]
    async fn test_completed_bridge_refreshes_both_listings() {
        let (source, destination) = clients();
        destination.set_owner_after_polls(token(), ALICE, 0);
        let clock = FakeClock::new();
        let bridge = NftBridge::builder()
            .source(source.clone())
            .destination(destination.clone())
            .wallet(FakeWallet::new(ALICE, FUJI))
            .clock(clock.clone())
            .config(PollingConfig::fast())
            .build();

        bridge.list_source_nfts().await.unwrap();
        bridge.list_destination_nfts().await.unwrap();
        let report = bridge
            .bridge(token(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.operation.status, BridgeStatus::DestinationConfirmed);
        assert!(clock.total_sleep_time() < Duration::from_secs(10));

        bridge.list_source_nfts().await.unwrap();
        bridge.list_destination_nfts().await.unwrap();
        assert_eq!(source.listing_calls(), 2);
        assert_eq!(destination.listing_calls(), 2);
    }
}
