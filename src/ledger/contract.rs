// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, B256, U256};
use bon::Builder;
use tracing::{debug, info, warn};

use super::events::LedgerEvent;
use super::messaging::{Envelope, MessageReceipt, MessagingEndpoint, OutboundMessage};
use crate::error::{BridgeError, Result};
use crate::protocol::{BridgePayload, TokenId, TokenMetadata, TOKEN_ID_NAMESPACE};

/// Collection-level values copied into every token minted on a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionConfig {
    pub name: String,
    pub description: String,
    pub image: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "Universal NFT".to_string(),
            description: "A token that keeps its identity across networks".to_string(),
            image: "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi".to_string(),
        }
    }
}

/// Authoritative token state for one network.
///
/// Each token id moves through `Nonexistent -> Active(chain) -> InFlight ->
/// Active(other chain) -> ...`. Ownership only leaves this ledger through
/// [`LedgerContract::bridge`] and only arrives through
/// [`LedgerContract::receive`]. Every mutating call checks all of its
/// preconditions before touching state, so a rejected call leaves the ledger
/// exactly as it was.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use alloy_primitives::Address;
/// use nft_bridge::ledger::{LedgerContract, LocalMessageBus};
///
/// let bus = LocalMessageBus::new();
/// let mut ledger = LedgerContract::builder()
///     .chain_id(43113)
///     .address(Address::repeat_byte(0xAA))
///     .owner(Address::repeat_byte(0x01))
///     .endpoint(Arc::new(bus))
///     .build();
///
/// let alice = Address::repeat_byte(0x0A);
/// let id = ledger.mint(alice).unwrap();
/// assert_eq!(id.to_string(), "431130000");
/// assert_eq!(ledger.owner_of(id).unwrap(), alice);
/// ```
#[derive(Debug, Builder)]
pub struct LedgerContract {
    chain_id: u64,
    /// Address the ledger is deployed at; peers see it as the message sender.
    address: Address,
    /// Administrator allowed to configure peers and pause the ledger.
    owner: Address,
    endpoint: Arc<dyn MessagingEndpoint>,
    #[builder(default)]
    collection: CollectionConfig,
    /// Pins the mint timestamp instead of reading the system clock.
    block_timestamp: Option<u64>,
    #[builder(skip)]
    next_sequence: u64,
    #[builder(skip)]
    owners: BTreeMap<TokenId, Address>,
    #[builder(skip)]
    metadata: BTreeMap<TokenId, TokenMetadata>,
    #[builder(skip)]
    peers: BTreeMap<u64, Address>,
    #[builder(skip)]
    processed: HashSet<B256>,
    #[builder(skip)]
    paused: bool,
    #[builder(skip)]
    events: Vec<LedgerEvent>,
}

impl LedgerContract {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Number of ids this ledger has assigned from its own namespace.
    pub fn minted_count(&self) -> u64 {
        self.next_sequence
    }

    /// Mints the next id of this ledger's namespace to `caller`.
    pub fn mint(&mut self, caller: Address) -> Result<TokenId> {
        if self.paused {
            return Err(BridgeError::ContractPaused);
        }
        let token_id = TokenId::new(self.chain_id, self.next_sequence).ok_or(
            BridgeError::TokenIdSpaceExhausted {
                chain_id: self.chain_id,
            },
        )?;

        let metadata = TokenMetadata {
            name: format!("{} #{}", self.collection.name, token_id),
            description: self.collection.description.clone(),
            image: self.collection.image.clone(),
            origin_chain_id: self.chain_id,
            minted_at: self.now(),
        };

        self.next_sequence += 1;
        self.owners.insert(token_id, caller);
        self.metadata.insert(token_id, metadata);
        self.events.push(LedgerEvent::Minted {
            token_id,
            owner: caller,
        });

        info!(
            chain_id = self.chain_id,
            token_id = %token_id,
            owner = %caller,
            event = "token_minted"
        );

        Ok(token_id)
    }

    /// Native fee the messaging endpoint charges to bridge `token_id`.
    pub fn quote_bridge(
        &self,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
    ) -> Result<U256> {
        let metadata = self.token_metadata(token_id)?;
        let payload = BridgePayload {
            recipient,
            token_id,
            metadata,
        };
        self.endpoint.quote(dest_chain_id, &payload.encode())
    }

    /// Burns `token_id` here and sends it to `dest_chain_id`.
    ///
    /// The message is handed to the endpoint before the burn is applied. If
    /// the endpoint refuses it, the token stays with `caller`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ContractPaused`] while paused
    /// - [`BridgeError::TokenNotFound`] / [`BridgeError::NotTokenOwner`] if
    ///   `caller` does not hold the token here
    /// - [`BridgeError::InvalidRecipient`] for the zero address
    /// - [`BridgeError::SameChain`] / [`BridgeError::UntrustedDestination`] for
    ///   a destination this ledger will not send to
    /// - [`BridgeError::MessagingFailed`] if the fee is too low or the endpoint
    ///   rejects the message
    pub fn bridge(
        &mut self,
        caller: Address,
        dest_chain_id: u64,
        recipient: Address,
        token_id: TokenId,
        fee: U256,
    ) -> Result<MessageReceipt> {
        if self.paused {
            return Err(BridgeError::ContractPaused);
        }
        match self.owners.get(&token_id) {
            None => return Err(BridgeError::TokenNotFound { token_id }),
            Some(owner) if *owner != caller => {
                return Err(BridgeError::NotTokenOwner { token_id, caller })
            }
            Some(_) => {}
        }
        if recipient == Address::ZERO {
            return Err(BridgeError::InvalidRecipient(recipient.to_string()));
        }
        if dest_chain_id == self.chain_id {
            return Err(BridgeError::SameChain {
                chain_id: dest_chain_id,
            });
        }
        let peer = *self
            .peers
            .get(&dest_chain_id)
            .ok_or(BridgeError::UntrustedDestination {
                chain_id: dest_chain_id,
            })?;

        let metadata = self.token_metadata(token_id)?;
        let payload = BridgePayload {
            recipient,
            token_id,
            metadata,
        }
        .encode();

        let required = self.endpoint.quote(dest_chain_id, &payload)?;
        if fee < required {
            return Err(BridgeError::MessagingFailed {
                reason: format!("insufficient fee: sent {fee}, required {required}"),
            });
        }

        let receipt = self.endpoint.send(OutboundMessage {
            src_chain: self.chain_id,
            dst_chain: dest_chain_id,
            sender: self.address,
            receiver: peer,
            payload,
        })?;

        self.owners.remove(&token_id);
        self.metadata.remove(&token_id);
        self.events.push(LedgerEvent::BridgedOut {
            token_id,
            src_chain: self.chain_id,
            dst_chain: dest_chain_id,
            recipient,
            guid: receipt.guid,
        });

        info!(
            chain_id = self.chain_id,
            dest_chain_id = dest_chain_id,
            token_id = %token_id,
            recipient = %recipient,
            guid = %receipt.guid,
            event = "token_bridged_out"
        );

        Ok(receipt)
    }

    /// Inbound handler invoked by the messaging channel.
    ///
    /// Accepts the envelope only if it was sent by the configured peer for its
    /// source chain, was not processed before, and carries an id that does not
    /// currently exist here.
    pub fn receive(&mut self, envelope: &Envelope) -> Result<TokenId> {
        if envelope.dst_chain != self.chain_id || envelope.receiver != self.address {
            return Err(BridgeError::MessagingFailed {
                reason: format!(
                    "message {} is addressed to {} on chain {}",
                    envelope.guid, envelope.receiver, envelope.dst_chain
                ),
            });
        }
        if self.peers.get(&envelope.src_chain) != Some(&envelope.sender) {
            warn!(
                chain_id = self.chain_id,
                src_chain = envelope.src_chain,
                sender = %envelope.sender,
                event = "untrusted_peer_rejected"
            );
            return Err(BridgeError::UntrustedPeer {
                src_chain: envelope.src_chain,
                sender: envelope.sender,
            });
        }
        if self.processed.contains(&envelope.guid) {
            return Err(BridgeError::DuplicateDelivery {
                guid: envelope.guid,
            });
        }

        let payload = BridgePayload::decode(&envelope.payload)?;
        if self.owners.contains_key(&payload.token_id) {
            return Err(BridgeError::TokenAlreadyExists {
                token_id: payload.token_id,
            });
        }

        self.processed.insert(envelope.guid);
        self.owners.insert(payload.token_id, payload.recipient);
        self.metadata.insert(payload.token_id, payload.metadata);
        self.events.push(LedgerEvent::BridgedIn {
            token_id: payload.token_id,
            recipient: payload.recipient,
            src_chain: envelope.src_chain,
            guid: envelope.guid,
        });

        info!(
            chain_id = self.chain_id,
            src_chain = envelope.src_chain,
            token_id = %payload.token_id,
            recipient = %payload.recipient,
            event = "token_bridged_in"
        );

        Ok(payload.token_id)
    }

    /// Trusts `peer` as this ledger's counterpart on `chain_id`.
    ///
    /// Setting the peer that is already configured succeeds without change.
    pub fn set_peer(&mut self, caller: Address, chain_id: u64, peer: Address) -> Result<()> {
        self.only_owner(caller)?;
        if chain_id == self.chain_id {
            return Err(BridgeError::SameChain { chain_id });
        }
        if peer == Address::ZERO {
            return Err(BridgeError::InvalidConfig(format!(
                "peer for chain {chain_id} must not be the zero address"
            )));
        }

        if self.peers.insert(chain_id, peer) == Some(peer) {
            debug!(
                chain_id = self.chain_id,
                peer_chain_id = chain_id,
                event = "peer_unchanged"
            );
            return Ok(());
        }

        self.events.push(LedgerEvent::PeerSet { chain_id, peer });
        info!(
            chain_id = self.chain_id,
            peer_chain_id = chain_id,
            peer = %peer,
            event = "peer_set"
        );
        Ok(())
    }

    pub fn peer(&self, chain_id: u64) -> Option<Address> {
        self.peers.get(&chain_id).copied()
    }

    pub fn is_peer(&self, chain_id: u64, address: Address) -> bool {
        self.peer(chain_id) == Some(address)
    }

    /// Chains this ledger currently trusts, in ascending order.
    pub fn peer_chain_ids(&self) -> Vec<u64> {
        self.peers.keys().copied().collect()
    }

    pub fn pause(&mut self, caller: Address) -> Result<()> {
        self.only_owner(caller)?;
        if !self.paused {
            self.paused = true;
            self.events.push(LedgerEvent::Paused { by: caller });
        }
        Ok(())
    }

    pub fn unpause(&mut self, caller: Address) -> Result<()> {
        self.only_owner(caller)?;
        if self.paused {
            self.paused = false;
            self.events.push(LedgerEvent::Unpaused { by: caller });
        }
        Ok(())
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        self.try_owner_of(token_id)
            .ok_or(BridgeError::TokenNotFound { token_id })
    }

    /// Owner of `token_id`, or `None` if the token is not active here.
    pub fn try_owner_of(&self, token_id: TokenId) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    /// Ids held by `owner`, in ascending order.
    pub fn tokens_by_owner(&self, owner: Address) -> Vec<TokenId> {
        self.owners
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata> {
        self.metadata
            .get(&token_id)
            .cloned()
            .ok_or(BridgeError::TokenNotFound { token_id })
    }

    /// Ids held by `owner` and their metadata, index-aligned.
    pub fn tokens_with_metadata(&self, owner: Address) -> (Vec<TokenId>, Vec<TokenMetadata>) {
        self.owners
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .filter_map(|(id, _)| self.metadata.get(id).map(|m| (*id, m.clone())))
            .unzip()
    }

    /// Self-describing metadata document for an existing token.
    pub fn token_uri(&self, token_id: TokenId) -> Result<String> {
        self.token_metadata(token_id)?.token_uri()
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Drains the notifications emitted since the last call.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    fn only_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(BridgeError::Unauthorized { caller });
        }
        Ok(())
    }

    fn now(&self) -> u64 {
        self.block_timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
    }
}

/// Highest sequence a ledger can assign before its namespace runs out.
pub const MAX_SEQUENCE: u64 = TOKEN_ID_NAMESPACE - 1;
