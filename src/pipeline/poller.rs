//! Confirmation polling.
//!
//! # State Transitions
//! ```text
//! Pending → Pending:   NOT_FOUND or transport error (attempt consumed)
//! Pending → Success:   SUCCESS
//! Pending → Success*:  response arrived but could not be decoded (presumed)
//! Pending → Failed:    FAILED on-chain
//! Pending → Error:     node returned a JSON-RPC error object
//! Pending → TimedOut:  attempts exhausted (Duplicate if the ack was Duplicate)
//! ```
//!
//! The interval is fixed and the attempt cap is hard: the network has a known
//! maximum inclusion latency, so there is no backoff.
//!
//! Presumed success is intentional. Status responses that fail to decode have,
//! in practice, almost always belonged to transactions that were applied;
//! marking them `Failed` would be wrong more often than right, and retrying
//! would spin until the cap. The record carries `presumed = true` so callers
//! can verify out-of-band.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::PollerConfig;
use crate::ledger::types::{GetTransactionStatus, RpcError};
use crate::ledger::LedgerRpc;
use crate::observability::metrics;
use crate::pipeline::record::{InitialStatus, TransactionRecord, TxStatus};
use crate::pipeline::submitter::SubmitAck;

/// True for errors meaning "a response came back but we could not read it".
pub fn is_decode_glitch(err: &RpcError) -> bool {
    match err {
        RpcError::Decode(_) => true,
        RpcError::Response { message, .. } => {
            let lower = message.to_ascii_lowercase();
            lower.contains("union") || lower.contains("xdr")
        }
        _ => false,
    }
}

/// Polls transaction status until a terminal state or the attempt cap.
#[derive(Clone)]
pub struct ConfirmationPoller {
    rpc: Arc<dyn LedgerRpc>,
    interval: Duration,
    max_attempts: u32,
}

impl ConfirmationPoller {
    pub fn new(rpc: Arc<dyn LedgerRpc>, config: &PollerConfig) -> Self {
        Self {
            rpc,
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// Poll the transaction a submission acknowledged.
    pub async fn poll(&self, ack: &SubmitAck) -> TransactionRecord {
        let mut record = TransactionRecord::submitted(&ack.hash, ack.initial_status);
        record.error = ack.error.clone();
        self.drive(record).await
    }

    /// Poll an arbitrary hash, e.g. one handed back by an earlier timed-out run.
    pub async fn poll_hash(&self, hash: &str) -> TransactionRecord {
        self.drive(TransactionRecord::submitted(hash, InitialStatus::Pending))
            .await
    }

    async fn drive(&self, mut record: TransactionRecord) -> TransactionRecord {
        if record.is_terminal() {
            return record;
        }

        loop {
            sleep(self.interval).await;
            record.attempts += 1;
            record.last_polled_at = Some(Utc::now());

            match self.rpc.get_transaction(&record.hash).await {
                Ok(response) => match response.status {
                    GetTransactionStatus::NotFound => {
                        tracing::debug!(hash = %record.hash, attempt = record.attempts, "Transaction pending");
                    }
                    GetTransactionStatus::Success => {
                        record.status = TxStatus::Success;
                        record.ledger = response.ledger;
                        record.return_value = response.return_value;
                        break;
                    }
                    GetTransactionStatus::Failed => {
                        record.status = TxStatus::Failed;
                        record.ledger = response.ledger;
                        record.error = response.result_xdr;
                        break;
                    }
                },
                Err(e) if is_decode_glitch(&e) => {
                    tracing::warn!(
                        hash = %record.hash,
                        error = %e,
                        "Status response could not be decoded; presuming success"
                    );
                    record.status = TxStatus::Success;
                    record.presumed = true;
                    break;
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!(hash = %record.hash, attempt = record.attempts, error = %e, "Status query failed");
                }
                Err(e) => {
                    tracing::error!(hash = %record.hash, error = %e, "Status query rejected by node");
                    record.status = TxStatus::Error;
                    record.error = Some(e.to_string());
                    break;
                }
            }

            if record.attempts >= self.max_attempts {
                record.status = match record.initial_status {
                    InitialStatus::Duplicate => TxStatus::Duplicate,
                    _ => TxStatus::TimedOut,
                };
                tracing::warn!(
                    hash = %record.hash,
                    attempts = record.attempts,
                    "No terminal status within poll budget; verify the hash out-of-band"
                );
                break;
            }
        }

        metrics::record_poll_attempts(record.attempts);
        metrics::record_stage("poll", record.status.as_str());
        tracing::info!(
            hash = %record.hash,
            status = record.status.as_str(),
            attempts = record.attempts,
            presumed = record.presumed,
            "Confirmation finished"
        );
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_glitch_detection() {
        assert!(is_decode_glitch(&RpcError::Decode("Bad union switch: 4".into())));
        assert!(is_decode_glitch(&RpcError::Response {
            code: -32603,
            message: "XDR decoding failed".into()
        }));
        assert!(!is_decode_glitch(&RpcError::Response {
            code: -32602,
            message: "invalid hash".into()
        }));
        assert!(!is_decode_glitch(&RpcError::Timeout(5)));
    }
}
