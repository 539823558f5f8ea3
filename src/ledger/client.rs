//! Ledger JSON-RPC client with timeout, failover and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint (primary + failovers)
//! - Query ledger state (accounts, transaction status)
//! - Dry-run and send transaction envelopes
//! - Verify the node serves the configured network

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::ledger::types::{
    AccountEntry, GetTransactionResponse, NetworkConfig, NetworkInfo, RpcError, RpcResult,
    SendResponse, SimulateResponse,
};
use crate::observability::metrics;

/// The four logical ledger calls the pipeline needs, plus network identification.
///
/// Implemented by [`LedgerClient`] over HTTP; tests substitute in-memory ledgers.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch an account entry. `Ok(None)` when the account does not exist.
    async fn get_account(&self, address: &str) -> RpcResult<Option<AccountEntry>>;

    /// Dry-run an unsigned envelope.
    async fn simulate_transaction(&self, envelope: &str) -> RpcResult<SimulateResponse>;

    /// Send a signed envelope.
    async fn send_transaction(&self, envelope: &str) -> RpcResult<SendResponse>;

    /// Query the final status of a transaction.
    async fn get_transaction(&self, hash: &str) -> RpcResult<GetTransactionResponse>;

    /// Identify the network the node serves.
    async fn get_network(&self) -> RpcResult<NetworkInfo>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Ledger RPC client with failover support.
#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers in configured order.
    endpoints: Vec<Url>,
    config: NetworkConfig,
    timeout_duration: Duration,
    next_id: Arc<AtomicU64>,
}

impl LedgerClient {
    /// Create a client without contacting the node.
    pub fn new(config: NetworkConfig) -> RpcResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut endpoints = Vec::new();

        let primary: Url = config.rpc_url.parse().map_err(|e: url::ParseError| {
            RpcError::InvalidEndpoint {
                url: config.rpc_url.clone(),
                reason: e.to_string(),
            }
        })?;
        endpoints.push(primary);

        for url_str in &config.failover_urls {
            match url_str.parse::<Url>() {
                Ok(url) => endpoints.push(url),
                Err(e) => {
                    tracing::warn!(url = %url_str, error = %e, "Ignoring invalid failover RPC URL")
                }
            }
        }

        let http = reqwest::Client::builder()
            .timeout(timeout_duration)
            .build()
            .map_err(|e| RpcError::Transport {
                endpoint: config.rpc_url.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            endpoints,
            config,
            timeout_duration,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Create a client and check the node's network passphrase.
    ///
    /// A mismatch is fatal since every envelope would be rejected; an unreachable
    /// node only logs a warning so the caller can degrade gracefully.
    pub async fn connect(config: NetworkConfig) -> RpcResult<Self> {
        let client = Self::new(config)?;

        if !client.config.verify_network {
            return Ok(client);
        }

        match client.verify_network().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %client.config.rpc_url,
                    network = %client.config.network_passphrase,
                    "Ledger client initialized"
                );
            }
            Err(e @ RpcError::NetworkMismatch { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Ledger client initialized but network verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the node's passphrase matches configuration.
    pub async fn verify_network(&self) -> RpcResult<()> {
        let info = self.get_network().await?;
        if info.passphrase != self.config.network_passphrase {
            return Err(RpcError::NetworkMismatch {
                expected: self.config.network_passphrase.clone(),
                actual: info.passphrase,
            });
        }
        Ok(())
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_network().await.is_ok();
        metrics::record_endpoint_health(&self.config.rpc_url, healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Issue a call, failing over to the next endpoint on transport errors.
    async fn call<R: DeserializeOwned>(&self, method: &'static str, params: Value) -> RpcResult<Option<R>> {
        let mut last_error = None;

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            match self.call_endpoint(endpoint, method, &params).await {
                Ok(result) => {
                    metrics::record_rpc_request(method, "ok");
                    return Ok(result);
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next endpoint");
                    metrics::record_rpc_request(method, "transport_error");
                    last_error = Some(e);
                }
                Err(e) => {
                    metrics::record_rpc_request(method, "error");
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RpcError::Transport {
            endpoint: self.config.rpc_url.clone(),
            message: "no endpoints configured".to_string(),
        }))
    }

    async fn call_endpoint<R: DeserializeOwned>(
        &self,
        endpoint: &Url,
        method: &str,
        params: &Value,
    ) -> RpcResult<Option<R>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let transport = |message: String| RpcError::Transport {
            endpoint: endpoint.to_string(),
            message,
        };

        let fut = self.http.post(endpoint.clone()).json(&request).send();
        let response = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(RpcError::Timeout(self.config.rpc_timeout_secs)),
            Ok(Err(e)) => return Err(transport(e.to_string())),
            Err(_) => return Err(RpcError::Timeout(self.config.rpc_timeout_secs)),
        };

        // Rate limits, wrong paths and gateway errors carry no JSON-RPC payload.
        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| transport(e.to_string()))?;
        let envelope: JsonRpcResponse =
            serde_json::from_str(&body).map_err(|e| RpcError::Malformed(format!("{}: {}", method, e)))?;

        if let Some(err) = envelope.error {
            let message = match err.data {
                Some(Value::String(detail)) if !detail.is_empty() => format!("{}: {}", err.message, detail),
                _ => err.message,
            };
            return Err(RpcError::Response { code: err.code, message });
        }

        match envelope.result {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RpcError::Decode(format!("{}: {}", method, e))),
        }
    }

    async fn call_required<R: DeserializeOwned>(&self, method: &'static str, params: Value) -> RpcResult<R> {
        self.call(method, params)
            .await?
            .ok_or_else(|| RpcError::Decode(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl LedgerRpc for LedgerClient {
    async fn get_account(&self, address: &str) -> RpcResult<Option<AccountEntry>> {
        self.call("getAccount", json!({ "address": address })).await
    }

    async fn simulate_transaction(&self, envelope: &str) -> RpcResult<SimulateResponse> {
        self.call_required("simulateTransaction", json!({ "transaction": envelope }))
            .await
    }

    async fn send_transaction(&self, envelope: &str) -> RpcResult<SendResponse> {
        self.call_required("sendTransaction", json!({ "transaction": envelope }))
            .await
    }

    async fn get_transaction(&self, hash: &str) -> RpcResult<GetTransactionResponse> {
        // Some nodes answer an unknown hash with a null result.
        Ok(self
            .call("getTransaction", json!({ "hash": hash }))
            .await?
            .unwrap_or_else(GetTransactionResponse::not_found))
    }

    async fn get_network(&self) -> RpcResult<NetworkInfo> {
        self.call_required("getNetwork", json!({})).await
    }
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("network", &self.config.network_passphrase)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> NetworkConfig {
        NetworkConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            network_passphrase: "Standalone Network ; February 2017".to_string(),
            rpc_timeout_secs: 2,
            verify_network: true,
        }
    }

    #[test]
    fn test_invalid_primary_url() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let err = LedgerClient::new(config).unwrap_err();
        assert!(matches!(err, RpcError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_invalid_failover_is_skipped() {
        let mut config = test_config();
        config.failover_urls.push("::::".to_string());
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = LedgerClient::new(config).unwrap();
        assert_eq!(client.endpoints.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_node_degrades_gracefully() {
        // Nothing listens on port 1; connect should still hand back a client.
        let result = LedgerClient::connect(test_config()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausts_all_endpoints() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = LedgerClient::new(config).unwrap();

        let err = client.get_network().await.unwrap_err();
        assert!(err.is_transport());
    }
}
