// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-network ledger state machine
//!
//! [`LedgerContract`] holds the authoritative ownership and metadata of every
//! token active on one network. Ledgers talk to each other only through a
//! [`MessagingEndpoint`]; the in-process [`LocalMessageBus`] and
//! [`LocalRelayer`] stand in for the real relay network.

mod contract;
mod events;
mod messaging;

use std::sync::{Arc, Mutex};

pub use contract::{CollectionConfig, LedgerContract, MAX_SEQUENCE};
pub use events::LedgerEvent;
pub use messaging::{
    message_guid, DeliveryReport, Envelope, LocalMessageBus, LocalRelayer, MessageReceipt,
    MessagingEndpoint, OutboundMessage,
};

/// A ledger shared between local clients and the relayer.
pub type SharedLedger = Arc<Mutex<LedgerContract>>;

/// Wraps a ledger for shared use.
pub fn shared(ledger: LedgerContract) -> SharedLedger {
    Arc::new(Mutex::new(ledger))
}
