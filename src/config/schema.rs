//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pipeline.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Passphrase of the public test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Public test network RPC endpoint.
pub const TESTNET_RPC_URL: &str = "https://soroban-testnet.stellar.org";

/// Root configuration for the invocation pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ledger RPC endpoint and network identity.
    pub network: NetworkConfig,

    /// Transaction construction parameters.
    pub transaction: TransactionConfig,

    /// Confirmation polling.
    pub poller: PollerConfig,

    /// Error classification tuning and extra phrase rules.
    pub classifier: ClassifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Network passphrase; must match between simulate, prepare and submit.
    pub network_passphrase: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Check the node's passphrase when connecting.
    pub verify_network: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: TESTNET_RPC_URL.to_string(),
            failover_urls: Vec::new(),
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            rpc_timeout_secs: 30,
            verify_network: true,
        }
    }
}

/// Transaction construction parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Inclusion fee in stroops, added to the simulated resource fee.
    pub base_fee: u32,

    /// Validity window of a built transaction in seconds.
    pub timeout_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            base_fee: 100,
            timeout_secs: 30,
        }
    }
}

/// Confirmation poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Fixed delay between status queries in milliseconds.
    pub interval_ms: u64,

    /// Hard cap on status queries before giving up.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 30,
        }
    }
}

/// Extra phrase rule appended to the built-in error catalog.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PhraseRuleConfig {
    /// Substring to look for in raw engine text.
    pub phrase: String,

    /// Category name, e.g. "InsufficientCollateral".
    pub category: String,

    /// Optional message overriding the category's default wording.
    #[serde(default)]
    pub message: Option<String>,
}

/// Error classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Unmatched raw messages longer than this are replaced by a generic message.
    pub long_message_threshold: usize,

    /// Phrase rules checked before the built-in table.
    pub extra_phrases: Vec<PhraseRuleConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            long_message_threshold: 100,
            extra_phrases: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for terminals, JSON for log aggregation.
    pub log_format: LogFormat,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_testnet() {
        let config = PipelineConfig::default();
        assert_eq!(config.network.network_passphrase, TESTNET_PASSPHRASE);
        assert_eq!(config.poller.interval_ms, 1000);
        assert_eq!(config.poller.max_attempts, 30);
        assert_eq!(config.transaction.base_fee, 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let raw = r#"
            [network]
            rpc_url = "http://localhost:8000/soroban/rpc"
            network_passphrase = "Standalone Network ; February 2017"

            [poller]
            max_attempts = 5

            [[classifier.extra_phrases]]
            phrase = "Reserve frozen"
            category = "InsufficientLiquidity"
        "#;
        let config: PipelineConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.network.rpc_timeout_secs, 30);
        assert_eq!(config.poller.max_attempts, 5);
        assert_eq!(config.poller.interval_ms, 1000);
        assert_eq!(config.classifier.extra_phrases.len(), 1);
        assert!(config.classifier.extra_phrases[0].message.is_none());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }
}
