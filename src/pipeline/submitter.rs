//! Sending signed envelopes to the network.
//!
//! # Responsibilities
//! - Re-check the source sequence right before sending
//! - Send the signed envelope and map the acknowledgment
//!
//! Submissions are never retried here.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ledger::types::SendStatus;
use crate::ledger::LedgerRpc;
use crate::observability::metrics;
use crate::pipeline::account::AccountSequencer;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::preparer::{PreparedTransaction, SignedTransaction};
use crate::pipeline::record::InitialStatus;
use crate::resilience::{within, Deadline};

/// Message used when the node asks the client to back off.
pub const TRY_AGAIN_LATER_MESSAGE: &str = "network busy: try again later";

/// Immediate answer to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub hash: String,
    pub initial_status: InitialStatus,
    /// Node-side reason when `initial_status` is `Error`.
    pub error: Option<String>,
}

impl SubmitAck {
    /// `Err(SubmissionRejected)` for an `Error` ack, the ack itself otherwise.
    pub fn into_result(self) -> PipelineResult<Self> {
        match self.initial_status {
            InitialStatus::Error => Err(PipelineError::SubmissionRejected {
                message: self.error.unwrap_or_else(|| "transaction rejected".to_string()),
                hash: self.hash,
            }),
            InitialStatus::Pending | InitialStatus::Duplicate => Ok(self),
        }
    }
}

/// Sends signed envelopes.
#[derive(Clone)]
pub struct Submitter {
    rpc: Arc<dyn LedgerRpc>,
    sequencer: AccountSequencer,
}

impl Submitter {
    pub fn new(rpc: Arc<dyn LedgerRpc>) -> Self {
        Self {
            sequencer: AccountSequencer::new(rpc.clone()),
            rpc,
        }
    }

    /// Fail with `StaleSequence` if the account moved since `prepared` was built.
    pub async fn ensure_sequence_current(
        &self,
        prepared: &PreparedTransaction,
        deadline: Deadline,
    ) -> PipelineResult<()> {
        let current = self
            .sequencer
            .fetch_account_state_by(prepared.source(), deadline)
            .await?;

        if current.sequence_number != prepared.source_sequence() {
            metrics::record_stage("submit", "stale_sequence");
            tracing::warn!(
                source = prepared.source(),
                prepared = prepared.source_sequence(),
                current = current.sequence_number,
                "Prepared transaction is stale"
            );
            return Err(PipelineError::StaleSequence {
                prepared: prepared.source_sequence(),
                current: current.sequence_number,
            });
        }
        Ok(())
    }

    /// Send a signed envelope.
    pub async fn submit(&self, signed: &SignedTransaction) -> PipelineResult<SubmitAck> {
        self.submit_by(signed, None).await
    }

    /// Send with a caller deadline on the network round trip.
    pub async fn submit_by(&self, signed: &SignedTransaction, deadline: Deadline) -> PipelineResult<SubmitAck> {
        let response = within(deadline, "submit", self.rpc.send_transaction(signed.envelope.as_str())).await?;

        let (initial_status, error) = match response.status {
            SendStatus::Pending => (InitialStatus::Pending, None),
            SendStatus::Duplicate => (InitialStatus::Duplicate, None),
            SendStatus::TryAgainLater => (InitialStatus::Error, Some(TRY_AGAIN_LATER_MESSAGE.to_string())),
            SendStatus::Error => (
                InitialStatus::Error,
                Some(
                    response
                        .error_result_xdr
                        .clone()
                        .unwrap_or_else(|| "transaction rejected".to_string()),
                ),
            ),
        };

        let outcome = match initial_status {
            InitialStatus::Pending => "pending",
            InitialStatus::Duplicate => "duplicate",
            InitialStatus::Error => "error",
        };
        metrics::record_stage("submit", outcome);
        tracing::info!(hash = %response.hash, status = outcome, "Transaction submitted");

        Ok(SubmitAck {
            hash: response.hash,
            initial_status,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_ack_becomes_rejection() {
        let ack = SubmitAck {
            hash: "h1".to_string(),
            initial_status: InitialStatus::Error,
            error: Some("txBadSeq".to_string()),
        };
        match ack.into_result() {
            Err(PipelineError::SubmissionRejected { hash, message }) => {
                assert_eq!(hash, "h1");
                assert_eq!(message, "txBadSeq");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ack_passes() {
        let ack = SubmitAck {
            hash: "h1".to_string(),
            initial_status: InitialStatus::Duplicate,
            error: None,
        };
        assert!(ack.into_result().is_ok());
    }
}
