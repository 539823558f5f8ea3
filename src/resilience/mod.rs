//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Network-bound pipeline step (simulate, submit, account fetch):
//!     → timeouts.rs (caller deadline, if any)
//!     → ledger client (per-request timeout, endpoint failover)
//! ```
//!
//! # Design Decisions
//! - Every external call has a per-request timeout
//! - Submissions are never retried here; the caller decides
//! - The confirmation poll loop is the only built-in retry

pub mod timeouts;

pub use timeouts::{within, Deadline};
