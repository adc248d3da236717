// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Messaging capability used by ledgers to reach their peers
//!
//! The capability is an asynchronous store-and-forward channel: `send` only
//! queues a message, and delivery to the destination ledger happens later,
//! with no bound on how much later. [`LocalMessageBus`] and [`LocalRelayer`]
//! model that channel in-process. The relayer can hold, drop and redeliver
//! messages, which is how the protocol is exercised against lost and
//! duplicated deliveries.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use tracing::{debug, info, warn};

use super::SharedLedger;
use crate::error::{BridgeError, Result};
use crate::protocol::TokenId;

/// A message a ledger asks the capability to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub src_chain: u64,
    pub dst_chain: u64,
    /// Address of the sending ledger contract.
    pub sender: Address,
    /// Address of the receiving ledger contract (the configured peer).
    pub receiver: Address,
    pub payload: Bytes,
}

/// Acknowledgement returned by [`MessagingEndpoint::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageReceipt {
    pub guid: B256,
    pub nonce: u64,
    pub fee: U256,
}

/// A message in transit, as handed to the destination ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub guid: B256,
    pub nonce: u64,
    pub src_chain: u64,
    pub dst_chain: u64,
    pub sender: Address,
    pub receiver: Address,
    pub payload: Bytes,
}

/// Client-facing contract of the cross-chain messaging channel.
pub trait MessagingEndpoint: Send + Sync + fmt::Debug {
    /// Native fee required to carry `payload` to `dst_chain`.
    fn quote(&self, dst_chain: u64, payload: &Bytes) -> Result<U256>;

    /// Queues a message for delivery.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MessagingFailed`] if the message could not be
    /// accepted. Callers must treat this as "nothing was sent".
    fn send(&self, message: OutboundMessage) -> Result<MessageReceipt>;
}

/// Deterministic message id: `keccak256(src ‖ dst ‖ nonce ‖ sender)`.
pub fn message_guid(src_chain: u64, dst_chain: u64, nonce: u64, sender: Address) -> B256 {
    let mut preimage = Vec::with_capacity(44);
    preimage.extend_from_slice(&src_chain.to_be_bytes());
    preimage.extend_from_slice(&dst_chain.to_be_bytes());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    preimage.extend_from_slice(sender.as_slice());
    keccak256(preimage)
}

#[derive(Debug, Default)]
struct BusState {
    pending: VecDeque<Envelope>,
    nonces: HashMap<(u64, u64), u64>,
    fee: U256,
    offline: bool,
    sent: u64,
}

/// In-process messaging channel shared by every local ledger.
#[derive(Debug, Clone, Default)]
pub struct LocalMessageBus {
    state: Arc<Mutex<BusState>>,
}

impl LocalMessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus that charges `fee` per message.
    pub fn with_fee(fee: U256) -> Self {
        let bus = Self::new();
        bus.lock().fee = fee;
        bus
    }

    /// While offline every `send` fails and nothing is queued.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Total number of messages accepted since creation.
    pub fn sent_count(&self) -> u64 {
        self.lock().sent
    }

    /// Removes and returns the oldest in-flight message.
    pub fn pop(&self) -> Option<Envelope> {
        self.lock().pending.pop_front()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MessagingEndpoint for LocalMessageBus {
    fn quote(&self, _dst_chain: u64, _payload: &Bytes) -> Result<U256> {
        Ok(self.lock().fee)
    }

    fn send(&self, message: OutboundMessage) -> Result<MessageReceipt> {
        let mut state = self.lock();
        if state.offline {
            return Err(BridgeError::MessagingFailed {
                reason: "messaging endpoint unavailable".to_string(),
            });
        }

        let counter = state
            .nonces
            .entry((message.src_chain, message.dst_chain))
            .or_insert(0);
        *counter += 1;
        let nonce = *counter;
        let guid = message_guid(message.src_chain, message.dst_chain, nonce, message.sender);

        state.pending.push_back(Envelope {
            guid,
            nonce,
            src_chain: message.src_chain,
            dst_chain: message.dst_chain,
            sender: message.sender,
            receiver: message.receiver,
            payload: message.payload,
        });
        state.sent += 1;

        debug!(
            guid = %guid,
            nonce = nonce,
            src_chain = message.src_chain,
            dst_chain = message.dst_chain,
            event = "message_queued"
        );

        Ok(MessageReceipt {
            guid,
            nonce,
            fee: state.fee,
        })
    }
}

/// Result of handing one envelope to its destination ledger.
#[derive(Debug)]
pub struct DeliveryReport {
    pub envelope: Envelope,
    pub result: Result<TokenId>,
}

impl DeliveryReport {
    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Moves envelopes from a [`LocalMessageBus`] to the ledgers they address.
#[derive(Debug, Clone)]
pub struct LocalRelayer {
    bus: LocalMessageBus,
    ledgers: HashMap<u64, SharedLedger>,
}

impl LocalRelayer {
    pub fn new(bus: LocalMessageBus) -> Self {
        Self {
            bus,
            ledgers: HashMap::new(),
        }
    }

    /// Makes `ledger` reachable as a delivery target for its chain.
    pub fn register(&mut self, ledger: SharedLedger) {
        let chain_id = ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .chain_id();
        self.ledgers.insert(chain_id, ledger);
    }

    pub fn bus(&self) -> &LocalMessageBus {
        &self.bus
    }

    /// Delivers the oldest in-flight message, if there is one.
    pub fn deliver_next(&self) -> Option<DeliveryReport> {
        self.bus.pop().map(|envelope| self.deliver(envelope))
    }

    /// Delivers every in-flight message in send order.
    pub fn deliver_all(&self) -> Vec<DeliveryReport> {
        std::iter::from_fn(|| self.deliver_next()).collect()
    }

    /// Discards the oldest in-flight message, as a lossy channel would.
    pub fn drop_next(&self) -> Option<Envelope> {
        let envelope = self.bus.pop()?;
        warn!(
            guid = %envelope.guid,
            src_chain = envelope.src_chain,
            dst_chain = envelope.dst_chain,
            event = "message_dropped"
        );
        Some(envelope)
    }

    /// Hands `envelope` to its destination ledger.
    ///
    /// Can be called again with an already delivered envelope to model a
    /// duplicate delivery.
    pub fn deliver(&self, envelope: Envelope) -> DeliveryReport {
        let result = match self.ledgers.get(&envelope.dst_chain) {
            Some(ledger) => ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .receive(&envelope),
            None => Err(BridgeError::MessagingFailed {
                reason: format!("no ledger registered for chain {}", envelope.dst_chain),
            }),
        };

        match &result {
            Ok(token_id) => info!(
                guid = %envelope.guid,
                token_id = %token_id,
                src_chain = envelope.src_chain,
                dst_chain = envelope.dst_chain,
                event = "message_delivered"
            ),
            Err(e) => warn!(
                guid = %envelope.guid,
                src_chain = envelope.src_chain,
                dst_chain = envelope.dst_chain,
                error = %e,
                event = "inbound_message_rejected"
            ),
        }

        DeliveryReport { envelope, result }
    }
}
