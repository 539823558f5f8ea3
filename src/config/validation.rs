//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Check endpoint URLs and bind addresses parse
//! - Check extra classifier rules name known categories
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

use crate::classify::ErrorCategory;
use crate::config::schema::PipelineConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid URL for {field}: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid bind address for {field}: '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("classifier rule #{index} names unknown category '{category}'")]
    UnknownCategory { index: usize, category: String },

    #[error("classifier rule #{index} has an empty phrase")]
    EmptyPhrase { index: usize },
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let network = &config.network;
    if !is_http_url(&network.rpc_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "network.rpc_url",
            value: network.rpc_url.clone(),
        });
    }
    for url in &network.failover_urls {
        if !is_http_url(url) {
            errors.push(ValidationError::InvalidUrl {
                field: "network.failover_urls",
                value: url.clone(),
            });
        }
    }
    if network.network_passphrase.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "network.network_passphrase" });
    }
    if network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "network.rpc_timeout_secs" });
    }

    if config.transaction.base_fee == 0 {
        errors.push(ValidationError::Zero { field: "transaction.base_fee" });
    }
    if config.transaction.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "transaction.timeout_secs" });
    }

    if config.poller.interval_ms == 0 {
        errors.push(ValidationError::Zero { field: "poller.interval_ms" });
    }
    if config.poller.max_attempts == 0 {
        errors.push(ValidationError::Zero { field: "poller.max_attempts" });
    }

    for (index, rule) in config.classifier.extra_phrases.iter().enumerate() {
        if rule.phrase.is_empty() {
            errors.push(ValidationError::EmptyPhrase { index });
        }
        if ErrorCategory::from_str(&rule.category).is_err() {
            errors.push(ValidationError::UnknownCategory {
                index,
                category: rule.category.clone(),
            });
        }
    }

    let obs = &config.observability;
    if !matches!(
        obs.log_level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ValidationError::UnknownLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: obs.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
