//! Account state reads.
//!
//! The sequence number changes after every successful write from the account,
//! including writes made by other clients, so it is read fresh before each
//! build and never cached.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ledger::LedgerRpc;
use crate::observability::metrics;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::resilience::{within, Deadline};

/// Snapshot of a signer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: String,
    pub sequence_number: i64,
    pub exists: bool,
}

impl AccountState {
    /// Sequence number the next transaction from this account must carry.
    pub fn next_sequence(&self) -> i64 {
        self.sequence_number + 1
    }
}

/// Reads signer account state from the ledger.
#[derive(Clone)]
pub struct AccountSequencer {
    rpc: Arc<dyn LedgerRpc>,
}

impl AccountSequencer {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { rpc }
    }

    /// Fetch the current state of `address`.
    pub async fn fetch_account_state(&self, address: &str) -> PipelineResult<AccountState> {
        self.fetch_account_state_by(address, None).await
    }

    /// Like [`fetch_account_state`](Self::fetch_account_state) with a caller deadline.
    pub async fn fetch_account_state_by(
        &self,
        address: &str,
        deadline: Deadline,
    ) -> PipelineResult<AccountState> {
        let entry = within(deadline, "fetch_account", self.rpc.get_account(address)).await?;

        match entry {
            Some(entry) => {
                metrics::record_stage("account", "ok");
                tracing::debug!(address, sequence = entry.sequence, "Fetched account state");
                Ok(AccountState {
                    address: entry.id,
                    sequence_number: entry.sequence,
                    exists: true,
                })
            }
            None => {
                metrics::record_stage("account", "not_found");
                Err(PipelineError::AccountNotFound(address.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_sequence() {
        let state = AccountState {
            address: "GABC".to_string(),
            sequence_number: 99,
            exists: true,
        };
        assert_eq!(state.next_sequence(), 100);
    }
}
