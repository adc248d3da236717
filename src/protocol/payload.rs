// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Wire format of the cross-chain bridge message
//!
//! The payload is `abi.encode(recipient, tokenId, metadata)`, the same bytes the
//! deployed contract hands to its messaging endpoint, so local and on-chain
//! ledgers can exchange messages.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolValue};

use super::{TokenId, TokenMetadata};
use crate::error::{BridgeError, Result};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct WireMetadata {
        string name;
        string description;
        string image;
        uint256 originChainId;
        uint256 mintedAt;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct WirePayload {
        address recipient;
        uint256 tokenId;
        WireMetadata metadata;
    }
}

/// Decoded content of an outbound/inbound bridge message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePayload {
    pub recipient: Address,
    pub token_id: TokenId,
    pub metadata: TokenMetadata,
}

impl BridgePayload {
    pub fn encode(&self) -> Bytes {
        let wire = WirePayload {
            recipient: self.recipient,
            tokenId: self.token_id.as_u256(),
            metadata: WireMetadata {
                name: self.metadata.name.clone(),
                description: self.metadata.description.clone(),
                image: self.metadata.image.clone(),
                originChainId: U256::from(self.metadata.origin_chain_id),
                mintedAt: U256::from(self.metadata.minted_at),
            },
        };
        Bytes::from(wire.abi_encode_params())
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let wire = WirePayload::abi_decode_params(data)?;
        Ok(Self {
            recipient: wire.recipient,
            token_id: TokenId::from(wire.tokenId),
            metadata: TokenMetadata {
                name: wire.metadata.name,
                description: wire.metadata.description,
                image: wire.metadata.image,
                origin_chain_id: narrow(wire.metadata.originChainId, "originChainId")?,
                minted_at: narrow(wire.metadata.mintedAt, "mintedAt")?,
            },
        })
    }
}

fn narrow(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| BridgeError::InvalidMetadata(format!("{field} does not fit in 64 bits")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn payload() -> BridgePayload {
        BridgePayload {
            recipient: address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"),
            token_id: TokenId::new(43113, 0).unwrap(),
            metadata: TokenMetadata {
                name: "Wanderer #431130000".to_string(),
                description: "A token that travels between networks".to_string(),
                image: "ipfs://bafy/wanderer.png".to_string(),
                origin_chain_id: 43113,
                minted_at: 1_735_689_600,
            },
        }
    }

    #[test]
    fn test_payload_survives_the_wire() {
        let encoded = payload().encode();
        assert_eq!(BridgePayload::decode(&encoded).unwrap(), payload());
    }

    #[test]
    fn test_head_starts_with_recipient_word() {
        let encoded = payload().encode();
        // First 32-byte word is the left-padded recipient address.
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..32], payload().recipient.as_slice());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(BridgePayload::decode(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
