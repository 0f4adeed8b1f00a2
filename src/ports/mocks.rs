//! Scripted port implementations for tests
//!
//! `ScriptedTransport` answers JSON-RPC posts per method name. The last
//! scripted answer for a method repeats once the queue is down to one entry.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::host::{HostError, ItemSource};
use super::market_data::{PriceError, PricePort};
use super::transport::{TransportError, TransportPort};
use crate::application::OperationRequest;
use crate::config::Credentials;

type Scripted = Result<Value, TransportError>;

/// Transport that records calls and replays scripted JSON-RPC responses
#[derive(Debug, Default, Clone)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, method: &str, response: Scripted) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Answer `method` with a successful `result`
    pub fn with_result(self, method: &str, result: Value) -> Self {
        self.push(method, Ok(json!({ "jsonrpc": "2.0", "id": 1, "result": result })))
    }

    /// Answer `method` with an error envelope
    pub fn with_rpc_error(self, method: &str, code: i64, message: &str) -> Self {
        self.push(
            method,
            Ok(json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": code, "message": message } })),
        )
    }

    /// Fail `method` at the transport level
    pub fn with_transport_error(self, method: &str, error: TransportError) -> Self {
        self.push(method, Err(error))
    }

    /// All recorded `(url, request body)` pairs
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Method names in call order
    pub fn methods(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|(_, body)| body["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| m.as_str() == method).count()
    }
}

#[async_trait]
impl TransportPort for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((url.to_string(), body.clone()));
        let method = body["method"].as_str().unwrap_or_default().to_string();

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(&method)
            .ok_or_else(|| TransportError::Connection(format!("no scripted response for {}", method)))?;
        match queue.len() {
            0 => Err(TransportError::Connection(format!("no scripted response for {}", method))),
            1 => queue[0].clone(),
            _ => queue.pop_front().unwrap_or_else(|| Err(TransportError::Timeout)),
        }
    }
}

/// Price feed answering from a fixed table
#[derive(Debug, Default, Clone)]
pub struct MockPriceFeed {
    prices: HashMap<String, f64>,
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PricePort for MockPriceFeed {
    async fn usd_price(&self, symbol: &str) -> Result<Option<f64>, PriceError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if self.fail {
            return Err(PriceError::Http("price index unreachable".into()));
        }
        Ok(self.prices.get(symbol).copied())
    }
}

/// In-memory batch with one credential set for every item
#[derive(Debug, Clone)]
pub struct StaticItemSource {
    pub items: Vec<Result<OperationRequest, String>>,
    pub credentials: Credentials,
    pub continue_on_fail: bool,
}

impl StaticItemSource {
    pub fn new(items: Vec<OperationRequest>, credentials: Credentials) -> Self {
        Self {
            items: items.into_iter().map(Ok).collect(),
            credentials,
            continue_on_fail: false,
        }
    }

    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    /// Append an item whose parameters fail to bind
    pub fn with_unbindable_item(mut self, message: &str) -> Self {
        self.items.push(Err(message.to_string()));
        self
    }
}

impl ItemSource for StaticItemSource {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn operation(&self, index: usize) -> Result<OperationRequest, HostError> {
        match self.items.get(index) {
            Some(Ok(request)) => Ok(request.clone()),
            Some(Err(message)) => Err(HostError::InvalidParameters {
                index,
                message: message.clone(),
            }),
            None => Err(HostError::NoSuchItem(index)),
        }
    }

    fn credentials(&self, _index: usize) -> Result<Credentials, HostError> {
        Ok(self.credentials.clone())
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn node_name(&self) -> &str {
        "Solana"
    }
}
