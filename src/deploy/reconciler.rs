// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;
use bon::Builder;
use tracing::{debug, info, warn, Instrument};

use super::trust::{complete_graph, TrustEdge};
use super::{DeploymentRecord, DeploymentRegistry, NetworkDescriptor};
use crate::error::{BridgeError, Result};
use crate::protocol::TokenId;
use crate::spans;
use crate::traits::{ContractDeployer, RegistryStore};

/// What a reconciler run did.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Chains that received a fresh ledger in this run.
    pub deployed: Vec<u64>,
    /// Target chains whose existing record was kept.
    pub reused: Vec<u64>,
    pub seed_tokens: BTreeMap<u64, TokenId>,
    /// Every edge of the trust graph, all of which were (re)applied.
    pub edges: Vec<TrustEdge>,
    pub registry: DeploymentRegistry,
}

impl ReconcileReport {
    /// Number of `setPeer` calls issued.
    pub fn peer_calls(&self) -> usize {
        self.edges.len() * 2
    }
}

/// Brings the deployed ledger fleet in line with a list of target networks.
///
/// Repeated runs are safe: a chain that already has a record is never
/// redeployed, and the complete trust graph over every recorded chain is
/// re-applied each time.
///
/// # Example
///
/// ```rust,no_run
/// use nft_bridge::deploy::{JsonFileStore, NetworkDescriptor, Reconciler};
/// use nft_bridge::providers::local::{LocalDeployer, LocalNetwork};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let world = LocalNetwork::new();
/// let reconciler = Reconciler::builder()
///     .deployer(LocalDeployer::new(world))
///     .store(JsonFileStore::new("deployments.json"))
///     .build();
///
/// let targets = vec![
///     NetworkDescriptor::from_key("fuji")?,
///     NetworkDescriptor::from_key("baseSepolia")?,
/// ];
/// let report = reconciler.reconcile(&targets).await?;
/// println!("deployed to {:?}", report.deployed);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct Reconciler<D: ContractDeployer, S: RegistryStore> {
    deployer: D,
    store: S,
    /// ABI written into every new deployment record.
    #[builder(default = serde_json::Value::Array(Vec::new()))]
    abi: serde_json::Value,
    /// Mint one token on every freshly deployed ledger.
    #[builder(default = true)]
    mint_seed: bool,
}

impl<D: ContractDeployer, S: RegistryStore> Reconciler<D, S> {
    pub fn deployer(&self) -> &D {
        &self.deployer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the reconciliation and persists the resulting record set.
    ///
    /// The record set is saved after every new deployment, so a failure
    /// part-way through never loses an address that was already paid for.
    pub async fn reconcile(&self, targets: &[NetworkDescriptor]) -> Result<ReconcileReport> {
        let span = spans::reconcile(targets.len());
        async move {
            let result = self.run(targets).await;
            if let Err(ref e) = result {
                spans::record_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, targets: &[NetworkDescriptor]) -> Result<ReconcileReport> {
        let mut registry = self.store.load().await?;
        let mut deployed = Vec::new();
        let mut reused = Vec::new();
        let mut seed_tokens = BTreeMap::new();

        info!(
            targets = targets.len(),
            existing = registry.len(),
            event = "reconcile_started"
        );

        for target in targets {
            if let Some(existing) = registry.get(target.chain_id) {
                if existing.rpc_url != target.rpc_url.as_str() {
                    debug!(
                        chain_id = target.chain_id,
                        recorded_rpc = %existing.rpc_url,
                        target_rpc = %target.rpc_url,
                        event = "record_kept_despite_rpc_change"
                    );
                }
                info!(
                    network = %target.network_key,
                    chain_id = target.chain_id,
                    contract_address = %existing.address,
                    event = "deployment_reused"
                );
                reused.push(target.chain_id);
                continue;
            }

            let address = self.deploy_one(target).await?;
            registry.insert(
                target.chain_id,
                DeploymentRecord {
                    address,
                    abi: self.abi.clone(),
                    rpc_url: target.rpc_url.to_string(),
                    block_explorer: target.block_explorer.clone(),
                    network: target.network_key.clone(),
                },
            )?;
            self.store.save(&registry).await?;
            deployed.push(target.chain_id);

            if self.mint_seed {
                match self.deployer.mint_seed(target, address).await {
                    Ok(token_id) => {
                        seed_tokens.insert(target.chain_id, token_id);
                    }
                    Err(e) => warn!(
                        chain_id = target.chain_id,
                        error = %e,
                        event = "seed_mint_failed"
                    ),
                }
            }
        }

        let edges = complete_graph(registry.chain_ids());
        let descriptors = self.descriptors(targets, &registry)?;
        for edge in &edges {
            self.apply_edge(*edge, &registry, &descriptors).await?;
        }
        self.store.save(&registry).await?;

        info!(
            deployed = deployed.len(),
            reused = reused.len(),
            networks = registry.len(),
            edges = edges.len(),
            event = "reconcile_completed"
        );

        Ok(ReconcileReport {
            deployed,
            reused,
            seed_tokens,
            edges,
            registry,
        })
    }

    async fn deploy_one(&self, target: &NetworkDescriptor) -> Result<Address> {
        let span = spans::deploy_ledger(&target.network_key, target.chain_id);
        async move {
            let address = self.deployer.deploy(target).await?;
            tracing::Span::current().record("contract_address", tracing::field::display(address));
            info!(
                network = %target.network_key,
                chain_id = target.chain_id,
                contract_address = %address,
                event = "ledger_deployed"
            );
            Ok(address)
        }
        .instrument(span)
        .await
    }

    /// Descriptor for every recorded chain; targets win over records.
    fn descriptors(
        &self,
        targets: &[NetworkDescriptor],
        registry: &DeploymentRegistry,
    ) -> Result<HashMap<u64, NetworkDescriptor>> {
        let mut descriptors: HashMap<u64, NetworkDescriptor> = targets
            .iter()
            .map(|target| (target.chain_id, target.clone()))
            .collect();
        for (chain_id, record) in registry.iter() {
            if !descriptors.contains_key(&chain_id) {
                descriptors.insert(chain_id, NetworkDescriptor::from_record(chain_id, record)?);
            }
        }
        Ok(descriptors)
    }

    async fn apply_edge(
        &self,
        edge: TrustEdge,
        registry: &DeploymentRegistry,
        descriptors: &HashMap<u64, NetworkDescriptor>,
    ) -> Result<()> {
        for (local, remote) in [(edge.a, edge.b), (edge.b, edge.a)] {
            let (Some(local_record), Some(remote_record), Some(network)) = (
                registry.get(local),
                registry.get(remote),
                descriptors.get(&local),
            ) else {
                return Err(BridgeError::NetworkNotDeployed {
                    network: local.to_string(),
                });
            };

            let span = spans::configure_peer(local, remote, &remote_record.address);
            self.deployer
                .set_peer(network, local_record.address, remote, remote_record.address)
                .instrument(span)
                .await?;
        }
        Ok(())
    }
}
