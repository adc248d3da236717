//! Implementations of the bridge trait abstractions.
//!
//! The alloy-backed providers talk to real networks; [`local`] hosts an
//! in-memory devnet implementing the same traits. Users building applications
//! will typically use the alloy providers, while tests run against [`local`]
//! or the fakes in [`testing`](crate::testing).

mod alloy;
pub mod local;
mod tokio_clock;

pub use self::alloy::{AlloyDeployer, AlloyLedgerClient, SignerWallet};
pub use self::tokio_clock::TokioClock;
