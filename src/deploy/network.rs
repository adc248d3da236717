// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use alloy_chains::NamedChain;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use super::DeploymentRecord;
use crate::chain::BridgeNetwork;
use crate::error::{BridgeError, Result};

/// A network the reconciler should have a ledger on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub network_key: String,
    pub chain_id: u64,
    pub rpc_url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer: Option<String>,
    /// Messaging endpoint passed to the ledger constructor. Falls back to the
    /// catalog value for known chains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_endpoint: Option<Address>,
}

impl NetworkDescriptor {
    /// Descriptor for a network from the built-in catalog.
    pub fn from_chain(chain: NamedChain) -> Result<Self> {
        let rpc_url = chain.default_rpc_url()?;
        Ok(Self {
            network_key: chain.network_key()?.to_string(),
            chain_id: chain as u64,
            rpc_url: parse_url(rpc_url)?,
            block_explorer: chain.block_explorer_url()?.map(str::to_string),
            messaging_endpoint: Some(chain.messaging_endpoint()?),
        })
    }

    /// Descriptor for a catalog network looked up by key.
    pub fn from_key(key: &str) -> Result<Self> {
        Self::from_chain(NamedChain::from_network_key(key)?)
    }

    /// Rebuilds the descriptor of an already deployed network.
    pub fn from_record(chain_id: u64, record: &DeploymentRecord) -> Result<Self> {
        Ok(Self {
            network_key: record.network.clone(),
            chain_id,
            rpc_url: parse_url(&record.rpc_url)?,
            block_explorer: record.block_explorer.clone(),
            messaging_endpoint: None,
        })
    }

    pub fn with_rpc_url(mut self, rpc_url: Url) -> Self {
        self.rpc_url = rpc_url;
        self
    }

    /// Endpoint address the ledger on this network is constructed with.
    pub fn resolve_messaging_endpoint(&self) -> Result<Address> {
        if let Some(endpoint) = self.messaging_endpoint {
            return Ok(endpoint);
        }
        NamedChain::try_from(self.chain_id)
            .map_err(|_| BridgeError::UnsupportedChain {
                chain_id: self.chain_id,
            })?
            .messaging_endpoint()
    }

    /// Parses a target list: a JSON array whose entries are either catalog
    /// keys (`"fuji"`) or full descriptor objects.
    pub fn parse_targets(json: &str) -> Result<Vec<Self>> {
        let entries: Vec<TargetEntry> = serde_json::from_str(json)?;
        let targets = entries
            .into_iter()
            .map(|entry| match entry {
                TargetEntry::Key(key) => Self::from_key(&key),
                TargetEntry::Full(descriptor) => Ok(descriptor),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = targets.iter().find(|t| !seen.insert(t.chain_id)) {
            return Err(BridgeError::InvalidConfig(format!(
                "chain {} listed more than once",
                dup.chain_id
            )));
        }
        Ok(targets)
    }

    pub async fn load_targets(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::parse_targets(&json)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TargetEntry {
    Key(String),
    Full(NetworkDescriptor),
}

fn parse_url(raw: &str) -> Result<Url> {
    raw.parse().map_err(|e: url::ParseError| BridgeError::InvalidUrl {
        reason: format!("{raw}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_mix_keys_and_objects() {
        let json = r#"[
            "fuji",
            {"networkKey": "devnet", "chainId": 31338, "rpcUrl": "http://127.0.0.1:9545", "messagingEndpoint": "0x0000000000000000000000000000000000000e0e"}
        ]"#;
        let targets = NetworkDescriptor::parse_targets(json).unwrap();

        assert_eq!(targets[0].chain_id, 43113);
        assert_eq!(targets[0].network_key, "fuji");
        assert_eq!(targets[1].network_key, "devnet");
        assert_eq!(
            targets[1].resolve_messaging_endpoint().unwrap(),
            "0x0000000000000000000000000000000000000e0e"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_duplicate_targets_are_rejected() {
        let result = NetworkDescriptor::parse_targets(r#"["fuji", "fuji"]"#);
        assert!(matches!(result, Err(BridgeError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(NetworkDescriptor::parse_targets(r#"["atlantis"]"#).is_err());
    }

    #[test]
    fn test_unknown_chain_needs_explicit_endpoint() {
        let descriptor = NetworkDescriptor {
            network_key: "devnet".to_string(),
            chain_id: 999_999_999,
            rpc_url: "http://127.0.0.1:9545".parse().unwrap(),
            block_explorer: None,
            messaging_endpoint: None,
        };
        assert!(matches!(
            descriptor.resolve_messaging_endpoint(),
            Err(BridgeError::UnsupportedChain { .. })
        ));
    }
}
