//! Chain configuration for bridge deployments
//!
//! Network keys, default RPC endpoints, explorers and messaging endpoint
//! addresses for every network the bridge knows how to deploy to.

mod addresses;
mod networks;

pub use addresses::{MESSAGING_ENDPOINT_MAINNET, MESSAGING_ENDPOINT_TESTNET};
pub use networks::BridgeNetwork;
