//! Ledger network integration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkConfig (RPC URL, failovers, passphrase)
//!     → client.rs (JSON-RPC 2.0 over HTTP with timeouts and failover)
//!     → types.rs (wire shapes: accounts, simulations, send/get status)
//! ```
//!
//! # Constraints
//! - Envelopes are opaque strings at this layer
//! - All RPC calls have configurable timeouts
//! - The configured passphrase must match the node's or every envelope is rejected

pub mod client;
pub mod types;

pub use client::{LedgerClient, LedgerRpc};
pub use types::{RpcError, RpcResult};
