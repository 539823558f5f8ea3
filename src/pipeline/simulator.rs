//! Dry runs against current ledger state.
//!
//! # Responsibilities
//! - Build an unsigned draft over the account's next sequence
//! - Send it to the simulation endpoint
//! - Interpret the answer as Success, Failure or NeedsRestore
//!
//! Nothing is retried: a failed simulation means the call as built cannot
//! succeed and must not reach the signer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ledger::types::{Footprint, RestorePreamble, SimulateResponse};
use crate::ledger::LedgerRpc;
use crate::observability::metrics;
use crate::pipeline::account::AccountState;
use crate::pipeline::call::CallDescriptor;
use crate::pipeline::envelope::{BuildSettings, TransactionDocument};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::resilience::{within, Deadline};

/// What a successful dry run tells us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSuccess {
    /// Ledger entries the real execution will touch.
    pub footprint: Footprint,
    /// Resource fee in stroops, on top of the inclusion fee.
    pub estimated_fee: i64,
    /// Encoded return value of the call, if any.
    pub return_value: Option<String>,
    /// Opaque resource blob to carry into the final envelope.
    pub transaction_data: Option<String>,
    pub latest_ledger: u32,
}

/// Outcome of one dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SimulationResult {
    Success(SimulationSuccess),
    Failure {
        raw_message: String,
    },
    NeedsRestore {
        raw_message: String,
        preamble: Option<RestorePreamble>,
    },
}

impl SimulationResult {
    /// Interpret a raw simulation response.
    pub fn from_response(response: SimulateResponse) -> Self {
        if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
            return match response.restore_preamble {
                Some(preamble) => Self::NeedsRestore {
                    raw_message: error,
                    preamble: Some(preamble),
                },
                None => Self::Failure { raw_message: error },
            };
        }

        if let Some(preamble) = response.restore_preamble {
            return Self::NeedsRestore {
                raw_message: "archived ledger entries must be restored before this call".to_string(),
                preamble: Some(preamble),
            };
        }

        let Some(estimated_fee) = response.min_resource_fee else {
            return Self::Failure {
                raw_message: "simulation response is missing a resource fee".to_string(),
            };
        };

        Self::Success(SimulationSuccess {
            footprint: response.footprint.unwrap_or_default(),
            estimated_fee,
            return_value: response.results.into_iter().next().map(|r| r.xdr),
            transaction_data: response.transaction_data,
            latest_ledger: response.latest_ledger,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Turn a non-success outcome into the matching error.
    pub fn into_success(self) -> PipelineResult<SimulationSuccess> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure { raw_message } => Err(PipelineError::SimulationFailed(raw_message)),
            Self::NeedsRestore { raw_message, .. } => Err(PipelineError::RestoreRequired(raw_message)),
        }
    }
}

/// Runs dry runs against the simulation endpoint.
#[derive(Clone)]
pub struct Simulator {
    rpc: Arc<dyn LedgerRpc>,
    settings: BuildSettings,
}

impl Simulator {
    pub fn new(rpc: Arc<dyn LedgerRpc>, settings: BuildSettings) -> Self {
        Self { rpc, settings }
    }

    /// Simulate `call` as sent from `account`.
    pub async fn simulate(&self, call: &CallDescriptor, account: &AccountState) -> PipelineResult<SimulationResult> {
        self.simulate_by(call, account, None).await
    }

    /// Simulate with a caller deadline on the network round trip.
    pub async fn simulate_by(
        &self,
        call: &CallDescriptor,
        account: &AccountState,
        deadline: Deadline,
    ) -> PipelineResult<SimulationResult> {
        let draft = TransactionDocument::draft(call, account, &self.settings).encode()?;

        let response = within(deadline, "simulate", self.rpc.simulate_transaction(draft.as_str())).await?;
        let result = SimulationResult::from_response(response);

        match &result {
            SimulationResult::Success(s) => {
                metrics::record_stage("simulate", "success");
                tracing::debug!(
                    method = call.method(),
                    fee = s.estimated_fee,
                    footprint_entries = s.footprint.len(),
                    "Simulation succeeded"
                );
            }
            SimulationResult::Failure { raw_message } => {
                metrics::record_stage("simulate", "failure");
                tracing::info!(method = call.method(), error = %raw_message, "Simulation failed");
            }
            SimulationResult::NeedsRestore { .. } => {
                metrics::record_stage("simulate", "needs_restore");
                tracing::info!(method = call.method(), "Simulation requires state restore");
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::SimulateHostResult;

    fn ok_response() -> SimulateResponse {
        SimulateResponse {
            latest_ledger: 500,
            min_resource_fee: Some(42_000),
            transaction_data: Some("AAAA".to_string()),
            footprint: Some(Footprint {
                read_only: vec!["code".to_string()],
                read_write: vec!["position:GUSER".to_string()],
            }),
            results: vec![SimulateHostResult {
                xdr: "AAAAAw==".to_string(),
                auth: vec![],
            }],
            error: None,
            restore_preamble: None,
        }
    }

    #[test]
    fn test_success_interpretation() {
        let SimulationResult::Success(s) = SimulationResult::from_response(ok_response()) else {
            panic!("expected success");
        };
        assert_eq!(s.estimated_fee, 42_000);
        assert_eq!(s.return_value.as_deref(), Some("AAAAAw=="));
        assert_eq!(s.footprint.len(), 2);
    }

    #[test]
    fn test_engine_error_kept_verbatim() {
        let mut response = ok_response();
        response.error = Some("HostError: Error(WasmVm, InvalidAction) \"Borrow exceeds LTV limit\"".to_string());
        match SimulationResult::from_response(response) {
            SimulationResult::Failure { raw_message } => {
                assert!(raw_message.contains("Borrow exceeds LTV limit"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_restore_preamble_means_needs_restore() {
        let mut response = ok_response();
        response.restore_preamble = Some(RestorePreamble {
            transaction_data: "BBBB".to_string(),
            min_resource_fee: 900,
        });
        let result = SimulationResult::from_response(response);
        assert!(matches!(result, SimulationResult::NeedsRestore { .. }));
        assert!(matches!(result.into_success(), Err(PipelineError::RestoreRequired(_))));
    }

    #[test]
    fn test_missing_fee_is_failure() {
        let mut response = ok_response();
        response.min_resource_fee = None;
        assert!(!SimulationResult::from_response(response).is_success());
    }
}
