//! Caller deadline enforcement.
//!
//! # Responsibilities
//! - Wrap network-bound pipeline steps with an optional absolute deadline
//! - Report deadline expiry distinctly from RPC timeouts
//!
//! Per-request timeouts live in the ledger client; this is the outer, caller-owned bound.

use std::future::Future;
use tokio::time::{timeout_at, Instant};

use crate::ledger::types::{RpcError, RpcResult};

/// Absolute point in time by which a step must finish. `None` means unbounded.
pub type Deadline = Option<Instant>;

/// Run `fut` to completion or until `deadline` passes.
pub async fn within<F, T>(deadline: Deadline, step: &'static str, fut: F) -> RpcResult<T>
where
    F: Future<Output = RpcResult<T>>,
{
    match deadline {
        None => fut.await,
        Some(at) => match timeout_at(at, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(step, "Caller deadline exceeded");
                Err(RpcError::DeadlineExceeded(step))
            }
        },
    }
}
