//! Merging a successful simulation into a ready-to-sign envelope.
//!
//! Pure: no network access, same inputs give the same envelope.

use serde::{Deserialize, Serialize};

use crate::pipeline::account::AccountState;
use crate::pipeline::call::CallDescriptor;
use crate::pipeline::envelope::{BuildSettings, Envelope, SorobanData, TransactionDocument};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::simulator::SimulationResult;

/// An unsigned envelope plus the account sequence it was built against.
///
/// Single use: once the account's sequence moves past `source_sequence`
/// it can no longer be submitted and must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedTransaction {
    envelope: Envelope,
    source_sequence: i64,
    source: String,
    fee: i64,
}

impl PreparedTransaction {
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Account sequence observed when this was built.
    pub fn source_sequence(&self) -> i64 {
        self.source_sequence
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Total fee in stroops.
    pub fn fee(&self) -> i64 {
        self.fee
    }
}

/// A signed envelope. Never inspected by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub envelope: Envelope,
}

impl SignedTransaction {
    pub fn new(envelope: Envelope) -> Self {
        Self { envelope }
    }
}

/// Build the final unsigned envelope from a successful simulation.
pub fn prepare(
    call: &CallDescriptor,
    simulation: &SimulationResult,
    account: &AccountState,
    settings: &BuildSettings,
) -> PipelineResult<PreparedTransaction> {
    let SimulationResult::Success(success) = simulation else {
        return Err(PipelineError::NotSimulated);
    };

    let mut document = TransactionDocument::draft(call, account, settings);
    document.fee = i64::from(settings.base_fee).saturating_add(success.estimated_fee);
    document.soroban_data = Some(SorobanData {
        footprint: success.footprint.clone(),
        resource_fee: success.estimated_fee,
        transaction_data: success.transaction_data.clone(),
    });

    Ok(PreparedTransaction {
        envelope: document.encode()?,
        source_sequence: account.sequence_number,
        source: account.address.clone(),
        fee: document.fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransactionConfig;
    use crate::ledger::types::Footprint;
    use crate::pipeline::call::ScArg;
    use crate::pipeline::simulator::SimulationSuccess;

    fn fixtures() -> (CallDescriptor, AccountState, BuildSettings, SimulationResult) {
        let call = CallDescriptor::new("CPOOL", "supply", vec![ScArg::symbol("XLM"), ScArg::I128(10)]);
        let account = AccountState {
            address: "GUSER".to_string(),
            sequence_number: 7,
            exists: true,
        };
        let settings = BuildSettings::new("Standalone Network ; February 2017", &TransactionConfig::default());
        let sim = SimulationResult::Success(SimulationSuccess {
            footprint: Footprint {
                read_only: vec!["code".to_string()],
                read_write: vec!["shares:GUSER".to_string()],
            },
            estimated_fee: 5_000,
            return_value: None,
            transaction_data: Some("DATA".to_string()),
            latest_ledger: 10,
        });
        (call, account, settings, sim)
    }

    #[test]
    fn test_prepare_merges_fee_and_footprint() {
        let (call, account, settings, sim) = fixtures();
        let prepared = prepare(&call, &sim, &account, &settings).unwrap();
        assert_eq!(prepared.source_sequence(), 7);
        assert_eq!(prepared.fee(), 5_100);

        let doc = TransactionDocument::decode(prepared.envelope()).unwrap();
        assert_eq!(doc.sequence, 8);
        let data = doc.soroban_data.unwrap();
        assert_eq!(data.footprint.read_write, vec!["shares:GUSER".to_string()]);
        assert_eq!(data.transaction_data.as_deref(), Some("DATA"));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let (call, account, settings, sim) = fixtures();
        let a = prepare(&call, &sim, &account, &settings).unwrap();
        let b = prepare(&call, &sim, &account, &settings).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prepare_refuses_failed_simulation() {
        let (call, account, settings, _) = fixtures();
        let sim = SimulationResult::Failure {
            raw_message: "trap".to_string(),
        };
        assert!(matches!(
            prepare(&call, &sim, &account, &settings),
            Err(PipelineError::NotSimulated)
        ));
    }
}
