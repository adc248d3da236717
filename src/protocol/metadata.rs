// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token metadata and the self-describing metadata document
//!
//! Metadata is written once at mint and carried verbatim through every bridge
//! hop. `origin_chain_id` therefore always names the chain that minted the
//! token, not the chain that currently holds it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

const DATA_URI_PREFIX: &str = "data:application/json;base64,";

/// Immutable metadata stored alongside every token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub origin_chain_id: u64,
    /// Unix timestamp (seconds) of the original mint.
    pub minted_at: u64,
}

impl TokenMetadata {
    /// Builds the structured, embeddable document for this token.
    pub fn document(&self) -> MetadataDocument {
        MetadataDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            attributes: vec![
                MetadataAttribute {
                    trait_type: "Origin Chain".to_string(),
                    value: serde_json::Value::from(self.origin_chain_id),
                    display_type: None,
                },
                MetadataAttribute {
                    trait_type: "Minted At".to_string(),
                    value: serde_json::Value::from(self.minted_at),
                    display_type: Some("date".to_string()),
                },
            ],
        }
    }

    /// Returns the `data:` URI a wallet or marketplace renders for this token.
    pub fn token_uri(&self) -> Result<String> {
        self.document().to_data_uri()
    }
}

/// A single `attributes` entry of the metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

/// The JSON document behind a token URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<MetadataAttribute>,
}

impl MetadataDocument {
    /// Encodes the document as `data:application/json;base64,<json>`.
    pub fn to_data_uri(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(json)))
    }

    /// Decodes a document previously produced by [`MetadataDocument::to_data_uri`].
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let encoded = uri.strip_prefix(DATA_URI_PREFIX).ok_or_else(|| {
            BridgeError::InvalidMetadata("token URI is not a base64 JSON data URI".to_string())
        })?;
        let json = STANDARD
            .decode(encoded)
            .map_err(|e| BridgeError::InvalidMetadata(format!("bad base64 payload: {e}")))?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Looks up an attribute value by its trait type.
    pub fn attribute(&self, trait_type: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| &a.value)
    }
}
