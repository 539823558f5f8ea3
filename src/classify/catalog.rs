//! Error vocabulary: categories, the phrase table and the pattern list.
//!
//! Engine error text is not a stable contract, so this mapping is best-effort.
//! New phrases are configuration (`[classifier] extra_phrases`), not code
//! changes; bump [`CATALOG_VERSION`] whenever the built-in table changes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::PhraseRuleConfig;

/// Version of the built-in phrase table and pattern list.
pub const CATALOG_VERSION: u32 = 1;

/// Stable caller-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    InsufficientBalance,
    InsufficientCollateral,
    InsufficientLiquidity,
    LimitExceeded,
    UnsafePosition,
    PositionHealthy,
    Unauthorized,
    NotInitialized,
    UserRejected,
    WalletLocked,
    NetworkError,
    SimulationFailed,
    Timeout,
    Unknown,
    AccountNotFound,
    RestoreRequired,
    StaleSequence,
    InvalidAmount,
    AssetNotSupported,
    NoDebt,
    OracleUnavailable,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 21] = [
        Self::InsufficientBalance,
        Self::InsufficientCollateral,
        Self::InsufficientLiquidity,
        Self::LimitExceeded,
        Self::UnsafePosition,
        Self::PositionHealthy,
        Self::Unauthorized,
        Self::NotInitialized,
        Self::UserRejected,
        Self::WalletLocked,
        Self::NetworkError,
        Self::SimulationFailed,
        Self::Timeout,
        Self::Unknown,
        Self::AccountNotFound,
        Self::RestoreRequired,
        Self::StaleSequence,
        Self::InvalidAmount,
        Self::AssetNotSupported,
        Self::NoDebt,
        Self::OracleUnavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientBalance => "InsufficientBalance",
            Self::InsufficientCollateral => "InsufficientCollateral",
            Self::InsufficientLiquidity => "InsufficientLiquidity",
            Self::LimitExceeded => "LimitExceeded",
            Self::UnsafePosition => "UnsafePosition",
            Self::PositionHealthy => "PositionHealthy",
            Self::Unauthorized => "Unauthorized",
            Self::NotInitialized => "NotInitialized",
            Self::UserRejected => "UserRejected",
            Self::WalletLocked => "WalletLocked",
            Self::NetworkError => "NetworkError",
            Self::SimulationFailed => "SimulationFailed",
            Self::Timeout => "Timeout",
            Self::Unknown => "Unknown",
            Self::AccountNotFound => "AccountNotFound",
            Self::RestoreRequired => "RestoreRequired",
            Self::StaleSequence => "StaleSequence",
            Self::InvalidAmount => "InvalidAmount",
            Self::AssetNotSupported => "AssetNotSupported",
            Self::NoDebt => "NoDebt",
            Self::OracleUnavailable => "OracleUnavailable",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ErrorCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Exact-substring rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRule {
    pub phrase: String,
    pub category: ErrorCategory,
    /// Wording that replaces the category default.
    pub message: Option<String>,
}

impl PhraseRule {
    fn new(phrase: &str, category: ErrorCategory) -> Self {
        Self {
            phrase: phrase.to_string(),
            category,
            message: None,
        }
    }

    fn with_message(phrase: &str, category: ErrorCategory, message: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            category,
            message: Some(message.to_string()),
        }
    }
}

/// What a matching pattern resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternTarget {
    Fixed(ErrorCategory),
    /// Bare "insufficient": the category depends on the contract action.
    InsufficientByAction,
}

/// Regular-expression rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub target: PatternTarget,
}

// Engine phrases, mostly the lending contracts' panic messages. More specific
// phrases come before their prefixes.
fn builtin_phrases() -> Vec<PhraseRule> {
    use ErrorCategory::*;
    vec![
        PhraseRule::new("Borrow exceeds LTV limit", LimitExceeded),
        PhraseRule::new("Withdrawal would make position unhealthy", UnsafePosition),
        PhraseRule::new("Position is healthy, cannot liquidate", PositionHealthy),
        PhraseRule::with_message(
            "Insufficient collateral to seize",
            InsufficientCollateral,
            "The borrower does not have enough collateral to seize for this liquidation.",
        ),
        PhraseRule::new("Insufficient collateral", InsufficientCollateral),
        PhraseRule::new("Insufficient pool liquidity", InsufficientLiquidity),
        PhraseRule::with_message(
            "Insufficient share balance",
            InsufficientBalance,
            "You don't have enough supplied shares to withdraw this amount.",
        ),
        PhraseRule::new("No outstanding debt", NoDebt),
        PhraseRule::new("Borrower has no debt in this asset", NoDebt),
        PhraseRule::with_message(
            "Asset not enabled as collateral",
            AssetNotSupported,
            "This asset cannot be used as collateral.",
        ),
        PhraseRule::with_message(
            "Asset not enabled for borrowing",
            AssetNotSupported,
            "This asset cannot be borrowed.",
        ),
        PhraseRule::new("Unknown asset", AssetNotSupported),
        PhraseRule::new("Repay amount must be positive", InvalidAmount),
        PhraseRule::new("Amount must be positive", InvalidAmount),
        PhraseRule::with_message("Amount too small", InvalidAmount, "The amount is too small."),
        PhraseRule::new("Price is stale", OracleUnavailable),
        PhraseRule::new("Price not set for asset", OracleUnavailable),
        PhraseRule::new("XLM price not set", OracleUnavailable),
        PhraseRule::new("Not initialized", NotInitialized),
        PhraseRule::new("Error(Auth, InvalidAction)", Unauthorized),
        PhraseRule::new("Error(Storage, MissingValue)", NotInitialized),
        PhraseRule::new("txBadSeq", StaleSequence),
        PhraseRule::new("txBadAuth", Unauthorized),
        PhraseRule::new("txInsufficientBalance", InsufficientBalance),
    ]
}

fn builtin_patterns() -> Vec<(&'static str, PatternTarget)> {
    use ErrorCategory::*;
    use PatternTarget::*;
    vec![
        (
            r"(?i)\b(user|request)\s+(rejected|declined|denied|cancel+ed)|rejected by (the )?user",
            Fixed(UserRejected),
        ),
        (r"(?i)wallet\s+(is\s+)?locked|unlock (your )?wallet", Fixed(WalletLocked)),
        (
            r"(?i)insufficient\s+(balance|funds)|underfunded|not enough (balance|funds)",
            Fixed(InsufficientBalance),
        ),
        (r"(?i)insufficient\s+collateral", Fixed(InsufficientCollateral)),
        (r"(?i)insufficient\s+(pool\s+)?liquidity", Fixed(InsufficientLiquidity)),
        (
            r"(?i)exceed(s|ed)?\b.*\b(limit|ltv|threshold|cap|max(imum)?)\b|\b(limit|threshold)\s+(exceeded|reached)",
            Fixed(LimitExceeded),
        ),
        (r"(?i)unhealthy|health\s*factor|undercollateral", Fixed(UnsafePosition)),
        (
            r"(?i)unauthori[sz]ed|not\s+authori[sz]ed|require_auth|auth(orization)?\s+failed|permission\s+denied|forbidden",
            Fixed(Unauthorized),
        ),
        (r"(?i)not\s+initiali[sz]ed|uninitiali[sz]ed", Fixed(NotInitialized)),
        (r"(?i)bad\s*seq|sequence\s+number", Fixed(StaleSequence)),
        (r"(?i)timed?\s*out|deadline\s+exceeded", Fixed(Timeout)),
        (
            r"(?i)network|connection|fetch\s+failed|econn|\bdns\b|unreachable|try again later|transport|\b50[234]\b",
            Fixed(NetworkError),
        ),
        (r"(?i)insufficient", InsufficientByAction),
    ]
}

/// Phrase table plus ordered pattern list.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    pub version: u32,
    phrases: Vec<PhraseRule>,
    patterns: Vec<PatternRule>,
}

impl ErrorCatalog {
    /// The built-in vocabulary.
    pub fn builtin() -> Self {
        let patterns = builtin_patterns()
            .into_iter()
            .filter_map(|(pattern, target)| match Regex::new(pattern) {
                Ok(regex) => Some(PatternRule { regex, target }),
                Err(e) => {
                    tracing::error!(pattern, error = %e, "Skipping invalid classifier pattern");
                    None
                }
            })
            .collect();

        Self {
            version: CATALOG_VERSION,
            phrases: builtin_phrases(),
            patterns,
        }
    }

    /// Built-in vocabulary with configured phrase rules checked first.
    ///
    /// Rules naming an unknown category are skipped with a warning; config
    /// validation reports them before this point.
    pub fn with_extra_phrases(extra: &[PhraseRuleConfig]) -> Self {
        let mut catalog = Self::builtin();
        let mut phrases: Vec<PhraseRule> = extra
            .iter()
            .filter_map(|rule| match rule.category.parse::<ErrorCategory>() {
                Ok(category) if !rule.phrase.is_empty() => Some(PhraseRule {
                    phrase: rule.phrase.clone(),
                    category,
                    message: rule.message.clone(),
                }),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(phrase = %rule.phrase, error = %e, "Ignoring classifier rule");
                    None
                }
            })
            .collect();
        phrases.append(&mut catalog.phrases);
        catalog.phrases = phrases;
        catalog
    }

    /// First phrase rule contained in `raw`.
    pub fn match_phrase(&self, raw: &str) -> Option<&PhraseRule> {
        self.phrases.iter().find(|rule| raw.contains(&rule.phrase))
    }

    /// First pattern rule matching `raw`.
    pub fn match_pattern(&self, raw: &str) -> Option<PatternTarget> {
        self.patterns
            .iter()
            .find(|rule| rule.regex.is_match(raw))
            .map(|rule| rule.target)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
