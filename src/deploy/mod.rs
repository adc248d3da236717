// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Deployment reconciliation
//!
//! Keeps one ledger per target network and a complete trust graph between
//! them. The resulting [`DeploymentRegistry`] is the single source every other
//! component reads contract addresses and RPC endpoints from.

mod artifact;
mod network;
mod reconciler;
mod record;
mod store;
pub mod trust;

pub use artifact::ContractArtifact;
pub use network::NetworkDescriptor;
pub use reconciler::{ReconcileReport, Reconciler};
pub use record::{DeploymentRecord, DeploymentRegistry};
pub use store::{JsonFileStore, MemoryStore};
pub use trust::TrustEdge;
