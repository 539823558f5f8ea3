//! Transaction records: what the caller gets back after submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse status returned by the network on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialStatus {
    /// Accepted, awaiting inclusion.
    Pending,
    /// Already known to the network; treated as in flight.
    Duplicate,
    /// Rejected outright; never polled.
    Error,
}

/// Lifecycle status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
    Duplicate,
    Error,
    /// Poll budget exhausted. Not proof of failure.
    TimedOut,
}

impl TxStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
            Self::Error => "error",
            Self::TimedOut => "timed_out",
        }
    }
}

/// A submitted transaction as tracked by the confirmation poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub status: TxStatus,
    /// Number of status queries made.
    pub attempts: u32,
    pub initial_status: InitialStatus,
    /// Success inferred from an unparseable status response rather than observed.
    pub presumed: bool,
    pub first_seen_at: DateTime<Utc>,
    pub last_polled_at: Option<DateTime<Utc>>,
    /// Ledger the transaction was included in, when known.
    pub ledger: Option<u32>,
    /// Encoded return value, when the network reports one.
    pub return_value: Option<String>,
    /// Node-side error text for `Error` records.
    pub error: Option<String>,
}

impl TransactionRecord {
    /// Fresh record at submission time.
    pub fn submitted(hash: impl Into<String>, initial_status: InitialStatus) -> Self {
        Self {
            hash: hash.into(),
            status: match initial_status {
                InitialStatus::Error => TxStatus::Error,
                InitialStatus::Pending | InitialStatus::Duplicate => TxStatus::Pending,
            },
            attempts: 0,
            initial_status,
            presumed: false,
            first_seen_at: Utc::now(),
            last_polled_at: None,
            ledger: None,
            return_value: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
