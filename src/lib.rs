//! Client-side contract invocation pipeline for Soroban-style ledgers.

pub mod classify;
pub mod config;
pub mod ledger;
pub mod observability;
pub mod pipeline;
pub mod resilience;

pub use classify::{ClassifiedError, ErrorCategory, ErrorClassifier};
pub use config::schema::PipelineConfig;
pub use ledger::{LedgerClient, LedgerRpc};
pub use pipeline::{CallDescriptor, Pipeline, TransactionRecord, TransactionSigner, TxStatus};
