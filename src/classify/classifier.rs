//! Mapping raw failures to caller-facing errors.
//!
//! Order of evaluation for a raw message:
//! 1. exact phrase table (configured phrases first)
//! 2. ordered regex patterns
//! 3. fallback: short messages verbatim, long ones replaced by a generic message
//!
//! Structured errors (signer outcomes, transport failures, stale sequences)
//! are mapped directly and never reach text matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::classify::catalog::{ErrorCatalog, ErrorCategory, PatternTarget};
use crate::classify::messages::{default_message, GENERIC_MESSAGE};
use crate::config::ClassifierConfig;
use crate::ledger::types::RpcError;
use crate::observability::metrics;
use crate::pipeline::call::ContractAction;
use crate::pipeline::error::PipelineError;
use crate::pipeline::signer::SignerError;

/// Pipeline step a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AccountFetch,
    Simulation,
    Preparation,
    Signing,
    Submission,
    Polling,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountFetch => "account_fetch",
            Self::Simulation => "simulation",
            Self::Preparation => "preparation",
            Self::Signing => "signing",
            Self::Submission => "submission",
            Self::Polling => "polling",
        }
    }
}

/// Where a failure happened and what the caller was trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stage {
    pub step: Step,
    pub action: ContractAction,
}

impl Stage {
    pub fn new(step: Step, action: ContractAction) -> Self {
        Self { step, action }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.step.as_str(), self.action)
    }
}

/// Category plus wording, before any cause is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: String,
}

/// What callers see when an invocation fails.
#[derive(Debug, Error)]
#[error("{category}: {message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
    pub stage: Stage,
    #[source]
    pub cause: PipelineError,
}

#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    catalog: ErrorCatalog,
    long_message_threshold: usize,
}

impl ErrorClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            catalog: ErrorCatalog::with_extra_phrases(&config.extra_phrases),
            long_message_threshold: config.long_message_threshold,
        }
    }

    pub fn catalog(&self) -> &ErrorCatalog {
        &self.catalog
    }

    /// Classify a raw engine or network message.
    pub fn classify(&self, raw: &str, stage: Stage) -> Classification {
        if let Some(rule) = self.catalog.match_phrase(raw) {
            return Classification {
                category: rule.category,
                message: rule
                    .message
                    .clone()
                    .unwrap_or_else(|| default_message(rule.category, stage.action)),
            };
        }

        if let Some(target) = self.catalog.match_pattern(raw) {
            let category = match target {
                PatternTarget::Fixed(category) => category,
                PatternTarget::InsufficientByAction => insufficient_for(stage.action),
            };
            return Classification {
                category,
                message: default_message(category, stage.action),
            };
        }

        self.fallback(raw, stage)
    }

    /// Wrap a pipeline failure for the caller.
    pub fn classify_error(&self, cause: PipelineError, stage: Stage) -> ClassifiedError {
        let Classification { category, message } = self.classify_cause(&cause, stage);

        metrics::record_classified_error(category.as_str());
        tracing::warn!(
            stage = stage.step.as_str(),
            category = category.as_str(),
            error = %cause,
            "Invocation failed"
        );

        ClassifiedError {
            category,
            message,
            stage,
            cause,
        }
    }

    fn classify_cause(&self, cause: &PipelineError, stage: Stage) -> Classification {
        let direct = |category: ErrorCategory| Classification {
            category,
            message: default_message(category, stage.action),
        };

        match cause {
            PipelineError::Rpc(rpc) => match rpc {
                RpcError::Timeout(_) | RpcError::DeadlineExceeded(_) => direct(ErrorCategory::Timeout),
                RpcError::Transport { .. } | RpcError::Malformed(_) => direct(ErrorCategory::NetworkError),
                RpcError::NetworkMismatch { .. } => Classification {
                    category: ErrorCategory::NetworkError,
                    message: "The RPC node is on a different network than configured.".to_string(),
                },
                RpcError::Response { message, .. } => self.classify(message, stage),
                RpcError::Decode(_) | RpcError::InvalidEndpoint { .. } => self.fallback(&rpc.to_string(), stage),
            },
            PipelineError::AccountNotFound(_) => direct(ErrorCategory::AccountNotFound),
            PipelineError::SimulationFailed(raw) => self.classify(raw, stage),
            PipelineError::RestoreRequired(_) => direct(ErrorCategory::RestoreRequired),
            PipelineError::NotSimulated | PipelineError::Envelope(_) => direct(ErrorCategory::Unknown),
            PipelineError::Signer(signer) => match signer {
                SignerError::UserRejected => direct(ErrorCategory::UserRejected),
                SignerError::WalletLocked => direct(ErrorCategory::WalletLocked),
                SignerError::Backend(raw) => self.classify(raw, stage),
            },
            PipelineError::StaleSequence { .. } => direct(ErrorCategory::StaleSequence),
            PipelineError::SubmissionRejected { message, .. } => self.classify(message, stage),
            PipelineError::Amount(e) => Classification {
                category: ErrorCategory::InvalidAmount,
                message: e.to_string(),
            },
        }
    }

    fn fallback(&self, raw: &str, stage: Stage) -> Classification {
        let category = match stage.step {
            Step::Simulation => ErrorCategory::SimulationFailed,
            _ => ErrorCategory::Unknown,
        };
        let trimmed = raw.trim();
        let message = if trimmed.is_empty() {
            default_message(category, stage.action)
        } else if trimmed.chars().count() > self.long_message_threshold {
            GENERIC_MESSAGE.to_string()
        } else {
            trimmed.to_string()
        };
        Classification { category, message }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

// A bare "insufficient" names whatever the action consumes.
fn insufficient_for(action: ContractAction) -> ErrorCategory {
    match action {
        ContractAction::Borrow | ContractAction::Withdraw => ErrorCategory::InsufficientLiquidity,
        ContractAction::WithdrawCollateral | ContractAction::Liquidate => ErrorCategory::InsufficientCollateral,
        ContractAction::Supply
        | ContractAction::DepositCollateral
        | ContractAction::Repay
        | ContractAction::Other => ErrorCategory::InsufficientBalance,
    }
}
