// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Where a network's ledger lives and how to call it.
///
/// Created once per network and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub abi: serde_json::Value,
    pub rpc_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer: Option<String>,
    /// Network key, e.g. `"fuji"`.
    pub network: String,
}

impl DeploymentRecord {
    /// Explorer link for the contract, if the network has an explorer.
    pub fn explorer_address_url(&self) -> Option<String> {
        self.block_explorer
            .as_deref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), self.address))
    }
}

/// The persisted deployment record set, keyed by chain id.
///
/// Serializes to `{"<chainId>": {address, abi, rpcUrl, blockExplorer, network}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentRegistry {
    records: BTreeMap<u64, DeploymentRecord>,
}

impl DeploymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, chain_id: u64) -> Option<&DeploymentRecord> {
        self.records.get(&chain_id)
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.records.contains_key(&chain_id)
    }

    /// Adds a record for a chain that has none.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] if the chain already has a
    /// record; contract addresses are permanent.
    pub fn insert(&mut self, chain_id: u64, record: DeploymentRecord) -> Result<()> {
        if let Some(existing) = self.records.get(&chain_id) {
            return Err(BridgeError::InvalidConfig(format!(
                "chain {chain_id} already has a ledger at {}",
                existing.address
            )));
        }
        self.records.insert(chain_id, record);
        Ok(())
    }

    /// Finds a record by network key, case-insensitively.
    pub fn find_network(&self, network: &str) -> Option<(u64, &DeploymentRecord)> {
        self.records
            .iter()
            .find(|(_, record)| record.network.eq_ignore_ascii_case(network))
            .map(|(chain_id, record)| (*chain_id, record))
    }

    /// Like [`DeploymentRegistry::find_network`], but also accepts a numeric
    /// chain id and fails when nothing matches.
    pub fn require_network(&self, network: &str) -> Result<(u64, &DeploymentRecord)> {
        if let Some(found) = self.find_network(network) {
            return Ok(found);
        }
        network
            .parse::<u64>()
            .ok()
            .and_then(|chain_id| self.get(chain_id).map(|record| (chain_id, record)))
            .ok_or_else(|| BridgeError::NetworkNotDeployed {
                network: network.to_string(),
            })
    }

    /// Chain ids with a record, ascending.
    pub fn chain_ids(&self) -> Vec<u64> {
        self.records.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &DeploymentRecord)> {
        self.records.iter().map(|(chain_id, record)| (*chain_id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(network: &str, byte: u8) -> DeploymentRecord {
        DeploymentRecord {
            address: Address::repeat_byte(byte),
            abi: serde_json::json!([]),
            rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
            block_explorer: Some("https://testnet.snowtrace.io/".to_string()),
            network: network.to_string(),
        }
    }

    #[test]
    fn test_persisted_shape() {
        let mut registry = DeploymentRegistry::new();
        registry.insert(43113, record("fuji", 0x11)).unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        insta::assert_snapshot!(json, @r#"{"43113":{"address":"0x1111111111111111111111111111111111111111","abi":[],"rpcUrl":"https://api.avax-test.network/ext/bc/C/rpc","blockExplorer":"https://testnet.snowtrace.io/","network":"fuji"}}"#);

        assert_eq!(DeploymentRegistry::from_json(&json).unwrap(), registry);
    }

    #[test]
    fn test_existing_address_is_never_overwritten() {
        let mut registry = DeploymentRegistry::new();
        registry.insert(43113, record("fuji", 0xAA)).unwrap();

        assert!(registry.insert(43113, record("fuji", 0xBB)).is_err());
        assert_eq!(
            registry.get(43113).unwrap().address,
            Address::repeat_byte(0xAA)
        );
    }

    #[test]
    fn test_network_lookup() {
        let mut registry = DeploymentRegistry::new();
        registry.insert(43113, record("fuji", 0xAA)).unwrap();
        registry.insert(84532, record("baseSepolia", 0xBB)).unwrap();

        assert_eq!(registry.require_network("BaseSepolia").unwrap().0, 84532);
        assert_eq!(registry.require_network("43113").unwrap().0, 43113);
        assert!(matches!(
            registry.require_network("amoy"),
            Err(BridgeError::NetworkNotDeployed { .. })
        ));
        assert_eq!(registry.chain_ids(), vec![43113, 84532]);
    }

    #[test]
    fn test_explorer_link() {
        let link = record("fuji", 0x11).explorer_address_url().unwrap();
        assert_eq!(
            link,
            "https://testnet.snowtrace.io/address/0x1111111111111111111111111111111111111111"
        );
    }
}
