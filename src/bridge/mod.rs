//! Bridge orchestration
//!
//! [`NftBridge`] drives one bridge operation through
//! `submitted -> source-confirmed -> destination-confirmed | timed-out`,
//! polling the destination ledger with a cancellable completion watch.
//! [`list_nfts`] returns a wallet's tokens on one network.

mod config;
mod listing;
mod operation;
mod orchestrator;
mod request;

pub use config::PollingConfig;
pub use listing::{list_nfts, OwnedNft};
pub use operation::{BridgeOperation, BridgeReport, BridgeStatus, CompletionOutcome};
pub use orchestrator::NftBridge;
pub use request::{parse_recipient, resolve_recipient};
