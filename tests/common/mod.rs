//! Shared utilities for pipeline integration tests.
//!
//! `MockLedger` keeps account sequences, remembers every accepted envelope and
//! replays scripted simulation and status responses in order.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tx_pipeline::config::PipelineConfig;
use tx_pipeline::ledger::types::{
    AccountEntry, Footprint, GetTransactionResponse, GetTransactionStatus, NetworkInfo, RpcError,
    RpcResult, SendResponse, SendStatus, SimulateHostResult, SimulateResponse,
};
use tx_pipeline::ledger::LedgerRpc;
use tx_pipeline::pipeline::envelope::TransactionDocument;
use tx_pipeline::pipeline::{CallDescriptor, Envelope, ScArg, SignerError, TransactionSigner};

pub const PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const USER: &str = "GUSERACCOUNT";
pub const POOL: &str = "CPOOLCONTRACT";

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<String, i64>,
    simulations: VecDeque<RpcResult<SimulateResponse>>,
    sends: VecDeque<RpcResult<SendResponse>>,
    statuses: VecDeque<RpcResult<GetTransactionResponse>>,
    accepted: HashMap<String, String>,
    account_latency: Option<Duration>,
    simulate_latency: Option<Duration>,
}

/// In-memory ledger with scripted responses.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    pub simulate_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_account(self: Arc<Self>, address: &str, sequence: i64) -> Arc<Self> {
        self.state.lock().unwrap().accounts.insert(address.to_string(), sequence);
        self
    }

    /// Slow node: account lookups take `latency` to answer.
    pub fn with_account_latency(self: Arc<Self>, latency: Duration) -> Arc<Self> {
        self.state.lock().unwrap().account_latency = Some(latency);
        self
    }

    pub fn with_simulate_latency(self: Arc<Self>, latency: Duration) -> Arc<Self> {
        self.state.lock().unwrap().simulate_latency = Some(latency);
        self
    }

    pub fn sequence_of(&self, address: &str) -> Option<i64> {
        self.state.lock().unwrap().accounts.get(address).copied()
    }

    /// Simulates another write from `address` landing first.
    pub fn bump_sequence(&self, address: &str) {
        if let Some(seq) = self.state.lock().unwrap().accounts.get_mut(address) {
            *seq += 1;
        }
    }

    pub fn push_simulation(&self, response: RpcResult<SimulateResponse>) {
        self.state.lock().unwrap().simulations.push_back(response);
    }

    pub fn push_send(&self, response: RpcResult<SendResponse>) {
        self.state.lock().unwrap().sends.push_back(response);
    }

    pub fn push_status(&self, response: RpcResult<GetTransactionResponse>) {
        self.state.lock().unwrap().statuses.push_back(response);
    }

    pub fn push_not_found(&self, times: usize) {
        for _ in 0..times {
            self.push_status(Ok(GetTransactionResponse::not_found()));
        }
    }

    pub fn push_success(&self) {
        self.push_status(Ok(status(GetTransactionStatus::Success)));
    }

    pub fn sends(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn get_account(&self, address: &str) -> RpcResult<Option<AccountEntry>> {
        let latency = self.state.lock().unwrap().account_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let state = self.state.lock().unwrap();
        Ok(state.accounts.get(address).map(|&sequence| AccountEntry {
            id: address.to_string(),
            sequence,
        }))
    }

    async fn simulate_transaction(&self, _envelope: &str) -> RpcResult<SimulateResponse> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.state.lock().unwrap().simulate_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.state
            .lock()
            .unwrap()
            .simulations
            .pop_front()
            .unwrap_or_else(|| Ok(simulation_ok(1_000)))
    }

    async fn send_transaction(&self, envelope: &str) -> RpcResult<SendResponse> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(scripted) = state.sends.pop_front() {
            return scripted;
        }

        let hash = hash_of(envelope);
        if state.accepted.contains_key(envelope) {
            return Ok(send(SendStatus::Duplicate, &hash, None));
        }

        let Ok(doc) = TransactionDocument::decode(&Envelope::from_opaque(envelope)) else {
            return Ok(send(SendStatus::Error, &hash, Some("txMalformed")));
        };
        let current = state.accounts.get(&doc.source).copied().unwrap_or_default();
        if doc.sequence != current + 1 {
            return Ok(send(SendStatus::Error, &hash, Some("txBadSeq")));
        }

        state.accounts.insert(doc.source.clone(), doc.sequence);
        state.accepted.insert(envelope.to_string(), hash.clone());
        Ok(send(SendStatus::Pending, &hash, None))
    }

    async fn get_transaction(&self, _hash: &str) -> RpcResult<GetTransactionResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .statuses
            .pop_front()
            .unwrap_or_else(|| Ok(GetTransactionResponse::not_found()))
    }

    async fn get_network(&self) -> RpcResult<NetworkInfo> {
        Ok(NetworkInfo {
            passphrase: PASSPHRASE.to_string(),
            protocol_version: Some(22),
        })
    }
}

fn hash_of(envelope: &str) -> String {
    let mut hasher = DefaultHasher::new();
    envelope.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn send(status: SendStatus, hash: &str, error: Option<&str>) -> SendResponse {
    SendResponse {
        status,
        hash: hash.to_string(),
        error_result_xdr: error.map(str::to_string),
        latest_ledger: Some(100),
    }
}

pub fn status(status: GetTransactionStatus) -> GetTransactionResponse {
    GetTransactionResponse {
        status,
        ledger: Some(101),
        return_value: Some("AAAAAQ==".to_string()),
        result_xdr: None,
    }
}

pub fn simulation_ok(fee: i64) -> SimulateResponse {
    SimulateResponse {
        latest_ledger: 100,
        min_resource_fee: Some(fee),
        transaction_data: Some("RESOURCES".to_string()),
        footprint: Some(Footprint {
            read_only: vec!["contract_code".to_string()],
            read_write: vec![format!("balance:{}", USER)],
        }),
        results: vec![SimulateHostResult {
            xdr: "AAAAAw==".to_string(),
            auth: Vec::new(),
        }],
        error: None,
        restore_preamble: None,
    }
}

pub fn simulation_error(message: &str) -> SimulateResponse {
    SimulateResponse {
        latest_ledger: 100,
        error: Some(message.to_string()),
        ..Default::default()
    }
}

pub fn decode_glitch() -> RpcError {
    RpcError::Decode("Bad union switch: 4".to_string())
}

pub fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.network.network_passphrase = PASSPHRASE.to_string();
    config.poller.interval_ms = 1_000;
    config.poller.max_attempts = 30;
    config
}

pub fn call(method: &str) -> CallDescriptor {
    CallDescriptor::new(POOL, method, vec![ScArg::address(USER), ScArg::symbol("XLM"), ScArg::I128(10_000_000)])
}

/// Headless signer: hands the envelope back unchanged.
#[derive(Default)]
pub struct PassthroughSigner {
    pub calls: AtomicUsize,
}

#[async_trait]
impl TransactionSigner for PassthroughSigner {
    async fn sign(&self, unsigned: &Envelope) -> Result<Envelope, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(unsigned.clone())
    }
}

/// Always declines.
pub struct RefusingSigner(pub SignerError);

#[async_trait]
impl TransactionSigner for RefusingSigner {
    async fn sign(&self, _unsigned: &Envelope) -> Result<Envelope, SignerError> {
        Err(self.0.clone())
    }
}

/// Lets another write from the same account land while the user is signing.
pub struct RacingSigner {
    pub ledger: Arc<MockLedger>,
    pub address: String,
}

#[async_trait]
impl TransactionSigner for RacingSigner {
    async fn sign(&self, unsigned: &Envelope) -> Result<Envelope, SignerError> {
        self.ledger.bump_sequence(&self.address);
        Ok(unsigned.clone())
    }
}
