//! Contract invocation pipeline.
//!
//! # Data Flow
//! ```text
//! CallDescriptor
//!     → account.rs   (fresh sequence number)
//!     → simulator.rs (dry run: footprint, resource fee, return value)
//!     → preparer.rs  (final unsigned envelope)
//!     → signer.rs    (external capability)
//!     → submitter.rs (sequence re-check, send)
//!     → poller.rs    (confirmation)
//!     → TransactionRecord
//! ```
//!
//! Every failure on the way is wrapped by the classifier before it reaches
//! the caller. The remote sequence number is the only serialization point:
//! two concurrent writes from one account race, and the loser fails with
//! `StaleSequence` or is rejected by the network.

pub mod account;
pub mod amount;
pub mod call;
pub mod envelope;
pub mod error;
pub mod poller;
pub mod preparer;
pub mod record;
pub mod signer;
pub mod simulator;
pub mod submitter;

use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::classify::{ClassifiedError, ErrorClassifier, Stage, Step};
use crate::config::PipelineConfig;
use crate::ledger::LedgerRpc;
use crate::resilience::Deadline;

pub use account::{AccountSequencer, AccountState};
pub use amount::{Amount, AmountError};
pub use call::{CallDescriptor, ContractAction, ScArg};
pub use envelope::{BuildSettings, Envelope};
pub use error::{PipelineError, PipelineResult};
pub use poller::ConfirmationPoller;
pub use preparer::{prepare, PreparedTransaction, SignedTransaction};
pub use record::{InitialStatus, TransactionRecord, TxStatus};
pub use signer::{SignerError, TransactionSigner};
pub use simulator::{SimulationResult, SimulationSuccess, Simulator};
pub use submitter::{SubmitAck, Submitter};

/// All pipeline stages wired to one ledger client.
///
/// Cheap to clone; build once and share.
#[derive(Clone)]
pub struct Pipeline {
    sequencer: AccountSequencer,
    simulator: Simulator,
    settings: BuildSettings,
    submitter: Submitter,
    poller: ConfirmationPoller,
    classifier: ErrorClassifier,
}

impl Pipeline {
    pub fn new(rpc: Arc<dyn LedgerRpc>, config: &PipelineConfig) -> Self {
        let settings = BuildSettings::from_config(config);
        Self {
            sequencer: AccountSequencer::new(rpc.clone()),
            simulator: Simulator::new(rpc.clone(), settings.clone()),
            submitter: Submitter::new(rpc.clone()),
            poller: ConfirmationPoller::new(rpc, &config.poller),
            classifier: ErrorClassifier::new(&config.classifier),
            settings,
        }
    }

    pub fn poller(&self) -> &ConfirmationPoller {
        &self.poller
    }

    /// Run `call` from `source` through to a terminal record.
    pub async fn invoke(
        &self,
        call: &CallDescriptor,
        source: &str,
        signer: &dyn TransactionSigner,
    ) -> Result<TransactionRecord, ClassifiedError> {
        self.invoke_by(call, source, signer, None).await
    }

    /// Like [`invoke`](Self::invoke), with a deadline on the network steps
    /// before confirmation. Signing is never bounded.
    pub async fn invoke_by(
        &self,
        call: &CallDescriptor,
        source: &str,
        signer: &dyn TransactionSigner,
        deadline: Deadline,
    ) -> Result<TransactionRecord, ClassifiedError> {
        let span = tracing::info_span!(
            "invoke",
            run_id = %Uuid::new_v4(),
            contract = call.contract_address(),
            method = call.method(),
        );

        async move {
            let prepared = self.prepare_by(call, source, deadline).await?;

            let signed = signer
                .sign(prepared.envelope())
                .await
                .map(SignedTransaction::new)
                .map_err(|e| self.fail(Step::Signing, call, e.into()))?;
            tracing::debug!("Envelope signed");

            self.submitter
                .ensure_sequence_current(&prepared, deadline)
                .await
                .map_err(|e| self.fail(Step::Submission, call, e))?;

            self.submit_and_confirm(&signed, call.action(), deadline).await
        }
        .instrument(span)
        .await
    }

    /// Fetch, simulate and prepare, stopping before the signer.
    pub async fn prepare_by(
        &self,
        call: &CallDescriptor,
        source: &str,
        deadline: Deadline,
    ) -> Result<PreparedTransaction, ClassifiedError> {
        let account = self
            .sequencer
            .fetch_account_state_by(source, deadline)
            .await
            .map_err(|e| self.fail(Step::AccountFetch, call, e))?;

        let simulation = self
            .simulator
            .simulate_by(call, &account, deadline)
            .await
            .map_err(|e| self.fail(Step::Simulation, call, e))?;

        let resource_fee = match &simulation {
            SimulationResult::Success(success) => success.estimated_fee,
            SimulationResult::Failure { raw_message } => {
                return Err(self.fail(Step::Simulation, call, PipelineError::SimulationFailed(raw_message.clone())));
            }
            SimulationResult::NeedsRestore { raw_message, .. } => {
                return Err(self.fail(Step::Simulation, call, PipelineError::RestoreRequired(raw_message.clone())));
            }
        };

        let prepared = prepare(call, &simulation, &account, &self.settings)
            .map_err(|e| self.fail(Step::Preparation, call, e))?;

        tracing::info!(
            source,
            sequence = prepared.source_sequence(),
            fee = prepared.fee(),
            resource_fee,
            "Transaction prepared"
        );
        Ok(prepared)
    }

    /// Submit an already-signed envelope and wait for confirmation.
    ///
    /// An `Error` acknowledgment is classified and returned without polling.
    pub async fn submit_and_confirm(
        &self,
        signed: &SignedTransaction,
        action: ContractAction,
        deadline: Deadline,
    ) -> Result<TransactionRecord, ClassifiedError> {
        let stage = Stage::new(Step::Submission, action);
        let ack = self
            .submitter
            .submit_by(signed, deadline)
            .await
            .and_then(SubmitAck::into_result)
            .map_err(|e| self.classifier.classify_error(e, stage))?;

        Ok(self.poller.poll(&ack).await)
    }

    /// Read-only call: simulate and return the encoded return value.
    ///
    /// Never signs or submits.
    pub async fn simulate_read(
        &self,
        call: &CallDescriptor,
        source: &str,
    ) -> Result<Option<String>, ClassifiedError> {
        let account = self
            .sequencer
            .fetch_account_state(source)
            .await
            .map_err(|e| self.fail(Step::AccountFetch, call, e))?;

        self.simulator
            .simulate(call, &account)
            .await
            .and_then(SimulationResult::into_success)
            .map(|success| success.return_value)
            .map_err(|e| self.fail(Step::Simulation, call, e))
    }

    fn fail(&self, step: Step, call: &CallDescriptor, cause: PipelineError) -> ClassifiedError {
        self.classifier.classify_error(cause, Stage::new(step, call.action()))
    }
}
