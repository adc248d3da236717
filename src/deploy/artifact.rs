// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Compiled contract artifacts
//!
//! Reads the `abi` and creation `bytecode` out of a Hardhat artifact
//! (`"bytecode": "0x..."`) or a Foundry artifact
//! (`"bytecode": {"object": "0x..."}`).

use std::path::Path;

use alloy_primitives::{hex, Bytes};
use serde::Deserialize;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ContractArtifact {
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: serde_json::Value,
    bytecode: RawBytecode,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hardhat(String),
    Foundry { object: String },
}

impl ContractArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

        if !raw.abi.is_array() {
            return Err(invalid("abi must be a JSON array"));
        }

        let code = match raw.bytecode {
            RawBytecode::Hardhat(code) | RawBytecode::Foundry { object: code } => code,
        };
        let bytecode = Bytes::from(hex::decode(code.trim())?);
        if bytecode.is_empty() {
            return Err(invalid("bytecode is empty (abstract contract or interface?)"));
        }

        Ok(Self {
            abi: raw.abi,
            bytecode,
        })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

fn invalid(reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidArtifact {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::hardhat(r#"{"abi": [], "bytecode": "0x6080"}"#)]
    #[case::foundry(r#"{"abi": [], "bytecode": {"object": "0x6080", "sourceMap": ""}}"#)]
    fn test_artifact_formats(#[case] json: &str) {
        let artifact = ContractArtifact::from_json(json).unwrap();
        assert_eq!(artifact.bytecode, Bytes::from_static(&[0x60, 0x80]));
        assert!(artifact.abi.as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_bytecode_is_rejected() {
        let result = ContractArtifact::from_json(r#"{"abi": [], "bytecode": "0x"}"#);
        assert!(matches!(result, Err(BridgeError::InvalidArtifact { .. })));
    }

    #[test]
    fn test_missing_abi_is_rejected() {
        let result = ContractArtifact::from_json(r#"{"bytecode": "0x6080"}"#);
        assert!(matches!(result, Err(BridgeError::InvalidArtifact { .. })));
    }
}
