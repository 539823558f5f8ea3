//! Internal pipeline errors.
//!
//! These carry the raw cause. Callers see them wrapped in a
//! [`ClassifiedError`](crate::classify::ClassifiedError).

use thiserror::Error;

use crate::ledger::types::RpcError;
use crate::pipeline::amount::AmountError;
use crate::pipeline::signer::SignerError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The dry run failed; carries the engine message verbatim.
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// Expired ledger state must be restored before the call can succeed.
    #[error("Ledger state must be restored first: {0}")]
    RestoreRequired(String),

    /// `prepare` was handed a simulation that did not succeed.
    #[error("Cannot prepare a transaction from an unsuccessful simulation")]
    NotSimulated,

    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Another write consumed the sequence this transaction was built on.
    #[error("Stale sequence: prepared against {prepared}, account is at {current}")]
    StaleSequence { prepared: i64, current: i64 },

    /// The network refused the envelope outright.
    #[error("Submission rejected ({hash}): {message}")]
    SubmissionRejected { hash: String, message: String },

    #[error("Envelope error: {0}")]
    Envelope(String),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
