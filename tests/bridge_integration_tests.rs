//! Integration tests for the bridge running against the in-process devnet
//!
//! The ledgers, the message bus and the relayer are real; only time is faked
//! (or paused), so every scenario runs the complete protocol: reconcile,
//! mint, bridge, relay and observe.

use alloy_primitives::Address;
use nft_bridge::deploy::{MemoryStore, NetworkDescriptor, Reconciler};
use nft_bridge::providers::local::{LocalDeployer, LocalLedgerClient, LocalNetwork, LocalWallet};
use nft_bridge::providers::TokioClock;
use nft_bridge::testing::FakeClock;
use nft_bridge::{
    list_nfts, BridgeError, BridgeStatus, Clock, CompletionOutcome, ErrorKind, LedgerClient,
    NftBridge, PollingConfig, TokenId,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ALICE: Address = Address::repeat_byte(0x0A);
const BOB: Address = Address::repeat_byte(0x0B);
const FUJI: u64 = 43113;
const BASE_SEPOLIA: u64 = 84532;

/// Two ledgers trusting each other, no seed tokens.
async fn connected_world() -> LocalNetwork {
    let world = LocalNetwork::new();
    let reconciler = Reconciler::builder()
        .deployer(LocalDeployer::new(world.clone()))
        .store(MemoryStore::new())
        .mint_seed(false)
        .build();
    let targets = vec![
        NetworkDescriptor::from_key("fuji").unwrap(),
        NetworkDescriptor::from_key("baseSepolia").unwrap(),
    ];
    reconciler.reconcile(&targets).await.unwrap();
    world
}

fn bridge_between<C: Clock + Clone>(
    world: &LocalNetwork,
    from: u64,
    to: u64,
    wallet: LocalWallet,
    clock: C,
) -> NftBridge<LocalLedgerClient, LocalLedgerClient, LocalWallet, C> {
    NftBridge::builder()
        .source(world.client(from).unwrap())
        .destination(world.client(to).unwrap())
        .wallet(wallet)
        .clock(clock)
        .build()
}

fn owners(world: &LocalNetwork, token_id: TokenId) -> Vec<(u64, Address)> {
    world
        .chain_ids()
        .into_iter()
        .filter_map(|chain| {
            world
                .with_ledger(chain, |l| Ok(l.try_owner_of(token_id)))
                .unwrap()
                .map(|owner| (chain, owner))
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_fuji_to_base_sepolia_defaults_to_caller() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    assert_eq!(token_id.to_string(), "431130000");

    let wallet = LocalWallet::new(ALICE, world.clone(), FUJI);
    let bridge = bridge_between(&world, FUJI, BASE_SEPOLIA, wallet, TokioClock::new());

    // The relay lands 17 s after submission.
    let relay = {
        let world = world.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(17)).await;
            world.deliver_all()
        })
    };

    let report = bridge
        .bridge(token_id, None, &CancellationToken::new())
        .await
        .unwrap();
    let deliveries = relay.await.unwrap();

    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].is_accepted());
    assert_eq!(report.operation.status, BridgeStatus::DestinationConfirmed);
    // polls at 10 s, 15 s and 20 s
    assert_eq!(report.outcome, Some(CompletionOutcome::Completed { polls: 3 }));
    assert_eq!(owners(&world, token_id), vec![(BASE_SEPOLIA, ALICE)]);

    let on_base = list_nfts(&world.client(BASE_SEPOLIA).unwrap(), ALICE)
        .await
        .unwrap();
    assert_eq!(on_base.len(), 1);
    assert_eq!(on_base[0].token_id, token_id);
    assert!(list_nfts(&world.client(FUJI).unwrap(), ALICE)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_round_trip_preserves_id_and_metadata() {
    let world = connected_world().await;
    let fuji = world.client(FUJI).unwrap();
    let token_id = fuji.mint(ALICE).unwrap();
    let original = fuji.token_metadata(token_id).await.unwrap();

    let wallet = LocalWallet::new(ALICE, world.clone(), FUJI);
    let outbound = bridge_between(&world, FUJI, BASE_SEPOLIA, wallet.clone(), FakeClock::new());
    let inbound = bridge_between(&world, BASE_SEPOLIA, FUJI, wallet.clone(), FakeClock::new());

    let report = outbound.bridge_no_wait(token_id, None).await.unwrap();
    assert_eq!(report.operation.status, BridgeStatus::SourceConfirmed);
    world.deliver_all();
    let on_base = world.client(BASE_SEPOLIA).unwrap();
    assert_eq!(on_base.token_metadata(token_id).await.unwrap(), original);

    // The wallet is still on Fuji; the return trip switches it.
    inbound.bridge_no_wait(token_id, None).await.unwrap();
    assert_eq!(
        nft_bridge::WalletSession::current_chain_id(&wallet)
            .await
            .unwrap(),
        BASE_SEPOLIA
    );
    world.deliver_all();

    let back = fuji.token_metadata(token_id).await.unwrap();
    assert_eq!(back, original);
    assert_eq!(back.origin_chain_id, FUJI);
    assert_eq!(owners(&world, token_id), vec![(FUJI, ALICE)]);
}

#[tokio::test]
async fn test_explicit_recipient_receives_token() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let bridge = bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        FakeClock::new(),
    );

    let mut report = bridge.bridge_no_wait(token_id, Some(BOB)).await.unwrap();
    world.deliver_all();
    let outcome = bridge
        .watch_completion(&mut report.operation, &CancellationToken::new())
        .await;

    assert_eq!(outcome, CompletionOutcome::Completed { polls: 1 });
    assert_eq!(report.operation.status, BridgeStatus::DestinationConfirmed);
    assert_eq!(owners(&world, token_id), vec![(BASE_SEPOLIA, BOB)]);
}

#[tokio::test]
async fn test_timeout_is_not_an_error_and_listing_catches_up() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let clock = FakeClock::new();
    let bridge = NftBridge::builder()
        .source(world.client(FUJI).unwrap())
        .destination(world.client(BASE_SEPOLIA).unwrap())
        .wallet(LocalWallet::new(ALICE, world.clone(), FUJI))
        .clock(clock.clone())
        .config(PollingConfig::default().with_timeout(Duration::from_secs(60)))
        .build();

    let report = bridge
        .bridge(token_id, None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.operation.status, BridgeStatus::TimedOut);
    assert!(matches!(
        report.outcome,
        Some(CompletionOutcome::TimedOut { polls: 11 })
    ));
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(60));
    // In flight: no owner anywhere.
    assert!(owners(&world, token_id).is_empty());

    world.deliver_all();
    let listed = bridge.list_destination_nfts().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].token_id, token_id);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_leaves_transfer_untouched() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let bridge = std::sync::Arc::new(bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        TokioClock::new(),
    ));
    let cancel = CancellationToken::new();

    let watch = {
        let bridge = bridge.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { bridge.bridge(token_id, None, &cancel).await })
    };
    tokio::time::sleep(Duration::from_secs(30)).await;
    cancel.cancel();
    let report = watch.await.unwrap().unwrap();

    assert!(matches!(
        report.outcome,
        Some(CompletionOutcome::Cancelled { .. })
    ));
    assert_eq!(report.operation.status, BridgeStatus::SourceConfirmed);
    assert_eq!(world.bus().pending_count(), 1);

    world.deliver_all();
    assert_eq!(owners(&world, token_id), vec![(BASE_SEPOLIA, ALICE)]);
}

#[tokio::test]
async fn test_second_bridge_of_in_flight_token_is_rejected() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let bridge = bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        FakeClock::new(),
    );

    bridge.bridge_no_wait(token_id, None).await.unwrap();
    let again = bridge.bridge_no_wait(token_id, None).await;

    assert!(matches!(again, Err(BridgeError::TokenNotFound { .. })));
    assert_eq!(world.bus().pending_count(), 1);
}

#[tokio::test]
async fn test_precondition_failures_change_nothing() {
    let world = connected_world().await;
    world.deploy_ledger(80002, LocalDeployer::DEFAULT_ADMIN).unwrap();
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();

    let not_owner = bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(BOB, world.clone(), FUJI),
        FakeClock::new(),
    );
    let err = not_owner.bridge_no_wait(token_id, None).await.unwrap_err();
    assert!(matches!(err, BridgeError::NotTokenOwner { caller, .. } if caller == BOB));
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let untrusted = bridge_between(
        &world,
        FUJI,
        80002,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        FakeClock::new(),
    );
    let err = untrusted.bridge_no_wait(token_id, None).await.unwrap_err();
    assert!(matches!(
        err,
        BridgeError::UntrustedDestination { chain_id: 80002 }
    ));

    assert_eq!(owners(&world, token_id), vec![(FUJI, ALICE)]);
    assert_eq!(world.bus().sent_count(), 0);
}

#[tokio::test]
async fn test_refused_network_switch_has_no_on_chain_effect() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let wallet = LocalWallet::new(ALICE, world.clone(), BASE_SEPOLIA);
    wallet.refuse_switches();
    let bridge = bridge_between(&world, FUJI, BASE_SEPOLIA, wallet, FakeClock::new());

    let err = bridge.bridge_no_wait(token_id, None).await.unwrap_err();

    assert!(matches!(err, BridgeError::NetworkSwitchFailed { .. }));
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(owners(&world, token_id), vec![(FUJI, ALICE)]);
}

#[tokio::test]
async fn test_duplicate_delivery_does_not_double_mint() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let bridge = bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        FakeClock::new(),
    );
    bridge.bridge_no_wait(token_id, None).await.unwrap();

    let relayer = world.relayer();
    let envelope = world.bus().pop().unwrap();
    assert!(relayer.deliver(envelope.clone()).is_accepted());
    let duplicate = relayer.deliver(envelope);

    assert!(matches!(
        duplicate.result,
        Err(BridgeError::DuplicateDelivery { .. })
    ));
    let base = world.client(BASE_SEPOLIA).unwrap();
    assert_eq!(base.tokens_by_owner(ALICE).await.unwrap(), vec![token_id]);
}

#[tokio::test]
async fn test_dropped_message_leaves_token_in_flight() {
    let world = connected_world().await;
    let token_id = world.client(FUJI).unwrap().mint(ALICE).unwrap();
    let bridge = bridge_between(
        &world,
        FUJI,
        BASE_SEPOLIA,
        LocalWallet::new(ALICE, world.clone(), FUJI),
        FakeClock::new(),
    );
    bridge.bridge_no_wait(token_id, None).await.unwrap();

    let lost = world.relayer().drop_next().unwrap();
    assert!(owners(&world, token_id).is_empty());

    // A late redelivery of the same envelope still lands exactly once.
    let report = world.relayer().deliver(lost);
    assert!(report.is_accepted());
    assert_eq!(owners(&world, token_id), vec![(BASE_SEPOLIA, ALICE)]);
}
