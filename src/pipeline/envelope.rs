//! Transaction envelopes.
//!
//! An envelope is base64 over a deterministic JSON document. The network
//! passphrase travels inside it, which is what binds a draft, its prepared
//! form and the signed submission to a single network.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{PipelineConfig, TransactionConfig};
use crate::ledger::types::Footprint;
use crate::pipeline::account::AccountState;
use crate::pipeline::call::{CallDescriptor, ScArg};
use crate::pipeline::error::PipelineError;

/// Network and fee parameters shared by every transaction built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub network_passphrase: String,
    pub base_fee: u32,
    pub timeout_secs: u64,
}

impl BuildSettings {
    pub fn new(network_passphrase: impl Into<String>, transaction: &TransactionConfig) -> Self {
        Self {
            network_passphrase: network_passphrase.into(),
            base_fee: transaction.base_fee,
            timeout_secs: transaction.timeout_secs,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.network.network_passphrase.clone(), &config.transaction)
    }
}

/// An opaque, signable transaction blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(String);

impl Envelope {
    /// Wrap an envelope string received from elsewhere (e.g. a wallet).
    pub fn from_opaque(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single contract-invocation operation a transaction carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeOperation {
    pub contract: String,
    pub function: String,
    pub args: Vec<ScArg>,
}

impl From<&CallDescriptor> for InvokeOperation {
    fn from(call: &CallDescriptor) -> Self {
        Self {
            contract: call.contract_address().to_string(),
            function: call.method().to_string(),
            args: call.args().to_vec(),
        }
    }
}

/// Resource declaration merged in from a successful simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SorobanData {
    pub footprint: Footprint,
    pub resource_fee: i64,
    /// Opaque resource blob as returned by the simulation endpoint.
    pub transaction_data: Option<String>,
}

/// Everything a transaction envelope describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDocument {
    pub network_passphrase: String,
    pub source: String,
    /// Sequence number this transaction consumes (account sequence + 1).
    pub sequence: i64,
    /// Total fee in stroops.
    pub fee: i64,
    pub timeout_secs: u64,
    pub operation: InvokeOperation,
    pub soroban_data: Option<SorobanData>,
}

impl TransactionDocument {
    /// Unsigned draft over the account's next sequence, before any simulation.
    pub fn draft(call: &CallDescriptor, account: &AccountState, settings: &BuildSettings) -> Self {
        Self {
            network_passphrase: settings.network_passphrase.clone(),
            source: account.address.clone(),
            sequence: account.next_sequence(),
            fee: i64::from(settings.base_fee),
            timeout_secs: settings.timeout_secs,
            operation: InvokeOperation::from(call),
            soroban_data: None,
        }
    }

    /// Encode to an envelope.
    pub fn encode(&self) -> Result<Envelope, PipelineError> {
        let json = serde_json::to_vec(self).map_err(|e| PipelineError::Envelope(e.to_string()))?;
        Ok(Envelope(STANDARD.encode(json)))
    }

    /// Decode an envelope built by [`TransactionDocument::encode`].
    pub fn decode(envelope: &Envelope) -> Result<Self, PipelineError> {
        let bytes = STANDARD
            .decode(envelope.as_str())
            .map_err(|e| PipelineError::Envelope(format!("invalid base64: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::Envelope(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> TransactionDocument {
        TransactionDocument {
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            source: "GSOURCE".to_string(),
            sequence: 42,
            fee: 100,
            timeout_secs: 30,
            operation: InvokeOperation {
                contract: "CPOOL".to_string(),
                function: "borrow".to_string(),
                args: vec![ScArg::address("GSOURCE"), ScArg::symbol("USDC"), ScArg::I128(5)],
            },
            soroban_data: None,
        }
    }

    #[test]
    fn test_draft_uses_next_sequence() {
        let call = CallDescriptor::new("CPOOL", "repay", vec![ScArg::I128(1)]);
        let account = AccountState {
            address: "GSOURCE".to_string(),
            sequence_number: 41,
            exists: true,
        };
        let settings = BuildSettings::new("Test SDF Network ; September 2015", &TransactionConfig::default());
        let draft = TransactionDocument::draft(&call, &account, &settings);
        assert_eq!(draft.sequence, 42);
        assert_eq!(draft.fee, 100);
        assert_eq!(draft.operation.function, "repay");
        assert!(draft.soroban_data.is_none());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(doc().encode().unwrap(), doc().encode().unwrap());
    }

    #[test]
    fn test_decode_recovers_document() {
        let envelope = doc().encode().unwrap();
        assert_eq!(TransactionDocument::decode(&envelope).unwrap(), doc());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = TransactionDocument::decode(&Envelope::from_opaque("%%%")).unwrap_err();
        assert!(matches!(err, PipelineError::Envelope(_)));
    }
}
