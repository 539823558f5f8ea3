//! Ledger RPC wire types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NetworkConfig from config module to avoid duplication
pub use crate::config::schema::NetworkConfig;

/// Errors that can occur while talking to the ledger RPC.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// Connection or HTTP-level failure.
    #[error("RPC transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Caller-provided deadline passed before the call completed.
    #[error("Deadline exceeded before {0} completed")]
    DeadlineExceeded(&'static str),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Response { code: i64, message: String },

    /// A JSON-RPC result arrived but did not match the expected shape.
    #[error("Failed to decode RPC response: {0}")]
    Decode(String),

    /// The body was not a JSON-RPC response at all (proxy error page, truncated body).
    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    /// Configured network does not match the node.
    #[error("Network passphrase mismatch: expected '{expected}', got '{actual}'")]
    NetworkMismatch { expected: String, actual: String },

    /// Endpoint URL could not be parsed.
    #[error("Invalid RPC endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl RpcError {
    /// Failures that say nothing about the request itself: worth trying the next
    /// endpoint, and never evidence about a transaction's status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout(_) | Self::Malformed(_))
    }
}

/// Result type for ledger RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Account entry as returned by `getAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    /// Account address.
    pub id: String,
    /// Current sequence number (string-encoded on the wire).
    #[serde(with = "crate::ledger::types::i64_string")]
    pub sequence: i64,
}

/// Ledger keys a transaction declares it will touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footprint {
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub read_write: Vec<String>,
}

impl Footprint {
    /// Total number of declared entries.
    pub fn len(&self) -> usize {
        self.read_only.len() + self.read_write.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One host-function result from a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateHostResult {
    /// Encoded return value.
    pub xdr: String,
    #[serde(default)]
    pub auth: Vec<String>,
}

/// Entries that must be restored before the call can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreamble {
    pub transaction_data: String,
    #[serde(with = "crate::ledger::types::i64_string")]
    pub min_resource_fee: i64,
}

/// Response of `simulateTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    #[serde(default)]
    pub latest_ledger: u32,
    #[serde(default, with = "crate::ledger::types::opt_i64_string")]
    pub min_resource_fee: Option<i64>,
    #[serde(default)]
    pub transaction_data: Option<String>,
    #[serde(default)]
    pub footprint: Option<Footprint>,
    #[serde(default)]
    pub results: Vec<SimulateHostResult>,
    /// Engine error text when the dry run failed.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub restore_preamble: Option<RestorePreamble>,
}

/// Status reported by `sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    Pending,
    Duplicate,
    TryAgainLater,
    Error,
}

/// Response of `sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub status: SendStatus,
    pub hash: String,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
}

/// Status reported by `getTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GetTransactionStatus {
    Success,
    NotFound,
    Failed,
}

/// Response of `getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: GetTransactionStatus,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub return_value: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

impl GetTransactionResponse {
    pub fn not_found() -> Self {
        Self {
            status: GetTransactionStatus::NotFound,
            ledger: None,
            return_value: None,
            result_xdr: None,
        }
    }
}

/// Response of `getNetwork`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub passphrase: String,
    #[serde(default)]
    pub protocol_version: Option<u32>,
}

/// 64-bit integers travel as JSON strings.
pub(crate) mod i64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(i64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Num(n) => Ok(n),
        }
    }
}

pub(crate) mod opt_i64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(i64),
        }
        match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Str(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
            Some(Raw::Num(n)) => Ok(Some(n)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RpcError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = RpcError::NetworkMismatch {
            expected: "Test SDF Network ; September 2015".into(),
            actual: "Public Global Stellar Network ; September 2015".into(),
        };
        assert!(err.to_string().contains("Public Global"));
    }

    #[test]
    fn test_transport_errors_are_failover_candidates() {
        assert!(RpcError::Timeout(5).is_transport());
        assert!(RpcError::Transport {
            endpoint: "http://localhost:8000".into(),
            message: "connection refused".into(),
        }
        .is_transport());
        assert!(!RpcError::Decode("bad".into()).is_transport());
        assert!(RpcError::Malformed("<html>".into()).is_transport());
        assert!(!RpcError::Response { code: -32602, message: "invalid params".into() }.is_transport());
    }

    #[test]
    fn test_account_sequence_accepts_string_or_number() {
        let a: AccountEntry = serde_json::from_str(r#"{"id":"GABC","sequence":"4294967296"}"#).unwrap();
        assert_eq!(a.sequence, 4_294_967_296);
        let b: AccountEntry = serde_json::from_str(r#"{"id":"GABC","sequence":7}"#).unwrap();
        assert_eq!(b.sequence, 7);
    }

    #[test]
    fn test_simulate_response_parsing() {
        let raw = r#"{
            "latestLedger": 1200,
            "minResourceFee": "58181",
            "transactionData": "AAAAAQ==",
            "footprint": {"readOnly": ["contract-code"], "readWrite": ["balance:GABC"]},
            "results": [{"xdr": "AAAACgAAAAA="}]
        }"#;
        let resp: SimulateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.min_resource_fee, Some(58181));
        assert_eq!(resp.footprint.unwrap().len(), 2);
        assert!(resp.error.is_none());
        assert!(resp.restore_preamble.is_none());
    }

    #[test]
    fn test_status_enums_use_screaming_case() {
        let s: SendResponse =
            serde_json::from_str(r#"{"status":"TRY_AGAIN_LATER","hash":"ab12"}"#).unwrap();
        assert_eq!(s.status, SendStatus::TryAgainLater);

        let g: GetTransactionResponse = serde_json::from_str(r#"{"status":"NOT_FOUND"}"#).unwrap();
        assert_eq!(g, GetTransactionResponse::not_found());
    }
}
