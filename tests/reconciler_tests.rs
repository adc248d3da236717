//! Integration tests for the deployment reconciler against the local devnet

use nft_bridge::deploy::trust::{complete_graph, is_complete};
use nft_bridge::deploy::{
    DeploymentRegistry, JsonFileStore, MemoryStore, NetworkDescriptor, Reconciler, TrustEdge,
};
use nft_bridge::providers::local::{LocalDeployer, LocalNetwork};
use nft_bridge::RegistryStore;

const FUJI: u64 = 43113;
const BASE_SEPOLIA: u64 = 84532;
const AMOY: u64 = 80002;

fn targets(keys: &[&str]) -> Vec<NetworkDescriptor> {
    keys.iter()
        .map(|key| NetworkDescriptor::from_key(key).unwrap())
        .collect()
}

fn peers_of(world: &LocalNetwork, chain_id: u64) -> Vec<u64> {
    world
        .with_ledger(chain_id, |ledger| Ok(ledger.peer_chain_ids()))
        .unwrap()
}

#[tokio::test]
async fn test_first_run_deploys_seeds_and_connects() {
    let world = LocalNetwork::new();
    let deployer = LocalDeployer::new(world.clone());
    let store = MemoryStore::new();
    let reconciler = Reconciler::builder()
        .deployer(deployer.clone())
        .store(store.clone())
        .build();

    let report = reconciler
        .reconcile(&targets(&["fuji", "baseSepolia"]))
        .await
        .unwrap();

    assert_eq!(report.deployed, vec![FUJI, BASE_SEPOLIA]);
    assert!(report.reused.is_empty());
    assert_eq!(report.edges, vec![TrustEdge::new(FUJI, BASE_SEPOLIA)]);
    assert_eq!(report.peer_calls(), 2);
    assert_eq!(
        report.seed_tokens.get(&FUJI).map(|id| id.to_string()),
        Some("431130000".to_string())
    );

    assert_eq!(peers_of(&world, FUJI), vec![BASE_SEPOLIA]);
    assert_eq!(peers_of(&world, BASE_SEPOLIA), vec![FUJI]);
    assert_eq!(store.snapshot(), report.registry);
    assert_eq!(store.snapshot().get(FUJI).unwrap().network, "fuji");
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let world = LocalNetwork::new();
    let deployer = LocalDeployer::new(world.clone());
    let store = MemoryStore::new();
    let reconciler = Reconciler::builder()
        .deployer(deployer.clone())
        .store(store.clone())
        .build();
    let networks = targets(&["fuji", "baseSepolia"]);

    let first = reconciler.reconcile(&networks).await.unwrap();
    let second = reconciler.reconcile(&networks).await.unwrap();

    assert!(second.deployed.is_empty());
    assert_eq!(second.reused, vec![FUJI, BASE_SEPOLIA]);
    assert_eq!(second.registry, first.registry);
    assert_eq!(second.edges, first.edges);
    assert!(second.seed_tokens.is_empty());
    assert_eq!(deployer.deploy_count(), 2);
    // Configuration is re-applied on every run.
    assert_eq!(deployer.set_peer_count(), 4);
    assert_eq!(peers_of(&world, FUJI), vec![BASE_SEPOLIA]);
}

#[tokio::test]
async fn test_adding_a_network_completes_the_graph() {
    let world = LocalNetwork::new();
    let deployer = LocalDeployer::new(world.clone());
    let store = MemoryStore::new();
    let reconciler = Reconciler::builder()
        .deployer(deployer.clone())
        .store(store.clone())
        .build();

    let before = reconciler
        .reconcile(&targets(&["fuji", "baseSepolia"]))
        .await
        .unwrap();
    let fuji_peer_before = world
        .with_ledger(FUJI, |l| Ok(l.peer(BASE_SEPOLIA)))
        .unwrap();

    // Only the new network is listed; the existing ones come from the records.
    let after = reconciler.reconcile(&targets(&["amoy"])).await.unwrap();

    assert_eq!(after.deployed, vec![AMOY]);
    assert_eq!(
        after.registry.get(FUJI).unwrap().address,
        before.registry.get(FUJI).unwrap().address
    );
    assert_eq!(
        after.registry.get(BASE_SEPOLIA).unwrap().address,
        before.registry.get(BASE_SEPOLIA).unwrap().address
    );
    assert_eq!(after.edges, complete_graph([FUJI, BASE_SEPOLIA, AMOY]));
    assert!(is_complete(&after.registry.chain_ids(), &after.edges));

    assert_eq!(peers_of(&world, FUJI), vec![AMOY, BASE_SEPOLIA]);
    assert_eq!(peers_of(&world, BASE_SEPOLIA), vec![FUJI, AMOY]);
    assert_eq!(peers_of(&world, AMOY), vec![FUJI, BASE_SEPOLIA]);
    assert_eq!(
        world.with_ledger(FUJI, |l| Ok(l.peer(BASE_SEPOLIA))).unwrap(),
        fuji_peer_before
    );
}

#[tokio::test]
async fn test_existing_records_are_never_overwritten() {
    let world = LocalNetwork::new();
    let seeded = Reconciler::builder()
        .deployer(LocalDeployer::new(world.clone()))
        .store(MemoryStore::new())
        .build()
        .reconcile(&targets(&["fuji"]))
        .await
        .unwrap()
        .registry;

    // A fresh devnet without the recorded ledger: reusing the record means
    // nothing is deployed on Fuji, even though the contract is unreachable.
    let other_world = LocalNetwork::new();
    let deployer = LocalDeployer::new(other_world.clone());
    let store = MemoryStore::with_registry(seeded.clone());
    let result = Reconciler::builder()
        .deployer(deployer.clone())
        .store(store.clone())
        .build()
        .reconcile(&targets(&["fuji", "baseSepolia"]))
        .await;

    assert!(result.is_err());
    assert_eq!(deployer.deploy_count(), 1);
    let saved = store.snapshot();
    assert_eq!(saved.get(FUJI), seeded.get(FUJI));
    // The new deployment was persisted before peer configuration failed.
    assert!(saved.contains(BASE_SEPOLIA));
}

#[tokio::test]
async fn test_records_round_trip_through_json_file() {
    let dir = std::env::temp_dir().join(format!("nft-bridge-reconcile-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("deployments.json");
    let _ = tokio::fs::remove_file(&path).await;

    let world = LocalNetwork::new();
    let report = Reconciler::builder()
        .deployer(LocalDeployer::new(world))
        .store(JsonFileStore::new(&path))
        .build()
        .reconcile(&targets(&["fuji", "baseSepolia"]))
        .await
        .unwrap();

    let raw = tokio::fs::read_to_string(&path).await.unwrap();
    let parsed = DeploymentRegistry::from_json(&raw).unwrap();
    assert_eq!(parsed, report.registry);
    assert_eq!(JsonFileStore::new(&path).load().await.unwrap(), parsed);
    assert!(raw.contains("\"43113\""));
    assert!(raw.contains("\"rpcUrl\""));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
