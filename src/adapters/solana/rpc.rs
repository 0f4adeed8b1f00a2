//! Solana JSON-RPC client
//!
//! Builds JSON-RPC 2.0 envelopes with `RpcRequest`, posts them through a
//! [`TransportPort`] and unwraps `result` / `error`. Retryable transport
//! failures are retried with linear backoff (`backoff * attempt`); an error
//! envelope from the node is returned immediately.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::hash::Hash;
use solana_transaction_status::UiTransactionEncoding;
use thiserror::Error;

use super::types::{
    LatestBlockhash, RpcBlockhash, RpcTokenSupply, RpcValue, SignatureInfo, TransactionSummary,
};
use crate::ports::transport::{TransportError, TransportPort};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RpcError {
    #[error("RPC Error ({method}): {message}\nEndpoint: {endpoint}")]
    Application {
        method: String,
        code: Option<i64>,
        message: String,
        endpoint: String,
    },
    #[error("RPC request failed ({method}) after {attempts} attempt(s): {source}\nEndpoint: {endpoint}")]
    Transport {
        method: String,
        attempts: u32,
        endpoint: String,
        #[source]
        source: TransportError,
    },
    #[error("Unexpected RPC result ({method}): {message}")]
    InvalidResult { method: String, message: String },
}

impl RpcError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }
}

/// Attempt budget and linear backoff unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1_000),
        }
    }
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// JSON-RPC client bound to one endpoint
#[derive(Clone)]
pub struct SolanaClient {
    transport: Arc<dyn TransportPort>,
    endpoint: String,
    retry: RetryPolicy,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for SolanaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaClient")
            .field("endpoint", &redact_endpoint(&self.endpoint))
            .field("retry", &self.retry)
            .finish()
    }
}

impl SolanaClient {
    pub fn new(transport: Arc<dyn TransportPort>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            retry: RetryPolicy::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issue one JSON-RPC call and return its `result`
    pub async fn call(&self, request: RpcRequest, params: Value) -> Result<Value, RpcError> {
        let method = request.to_string();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request.build_request_json(id, params);
        let max_attempts = self.retry.max_attempts.max(1);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::debug!(method = %method, attempt, "RPC call");

            match self.transport.post_json(&self.endpoint, &body).await {
                Ok(response) => return self.unwrap_envelope(&method, response),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff * attempt;
                    tracing::warn!(
                        "RPC {} failed ({}), retrying in {:?} (attempt {}/{})",
                        method, e, delay, attempt, max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(RpcError::Transport {
                        method,
                        attempts: attempt,
                        endpoint: redact_endpoint(&self.endpoint),
                        source: e,
                    })
                }
            }
        }
    }

    fn unwrap_envelope(&self, method: &str, mut response: Value) -> Result<Value, RpcError> {
        let error = response.get("error").filter(|e| !e.is_null());
        if let Some(error) = error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(RpcError::Application {
                method: method.to_string(),
                code: error.get("code").and_then(Value::as_i64),
                message,
                endpoint: redact_endpoint(&self.endpoint),
            });
        }

        response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| RpcError::InvalidResult {
                method: method.to_string(),
                message: "response has neither result nor error".to_string(),
            })
    }

    async fn call_typed<T: DeserializeOwned>(&self, request: RpcRequest, params: Value) -> Result<T, RpcError> {
        let result = self.call(request, params).await?;
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResult {
            method: request.to_string(),
            message: e.to_string(),
        })
    }

    /// Get SOL balance in lamports
    pub async fn get_balance(&self, address: &str) -> Result<u64, RpcError> {
        let result: RpcValue<u64> = self.call_typed(RpcRequest::GetBalance, json!([address])).await?;
        Ok(result.value)
    }

    /// SPL token accounts of `owner` holding `mint` (jsonParsed entries)
    pub async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> Result<Vec<Value>, RpcError> {
        let result: RpcValue<Vec<Value>> = self
            .call_typed(
                RpcRequest::GetTokenAccountsByOwner,
                json!([owner, { "mint": mint }, { "encoding": "jsonParsed" }]),
            )
            .await?;
        Ok(result.value)
    }

    pub async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<SignatureInfo>, RpcError> {
        self.call_typed(
            RpcRequest::GetSignaturesForAddress,
            json!([address, { "limit": limit }]),
        )
        .await
    }

    /// Raw `getTransaction` result; `None` when the node does not know the signature
    pub async fn get_transaction(&self, signature: &str) -> Result<Option<Value>, RpcError> {
        let result = self
            .call(
                RpcRequest::GetTransaction,
                json!([signature, {
                    "encoding": UiTransactionEncoding::JsonParsed,
                    "maxSupportedTransactionVersion": 0,
                }]),
            )
            .await?;
        Ok(Some(result).filter(|v| !v.is_null()))
    }

    pub async fn get_transaction_summary(&self, signature: &str) -> Result<Option<TransactionSummary>, RpcError> {
        Ok(self
            .get_transaction(signature)
            .await?
            .map(|tx| TransactionSummary::from_result(&tx)))
    }

    /// jsonParsed account info; `None` when the account does not exist
    pub async fn get_account_info(&self, address: &str) -> Result<Option<Value>, RpcError> {
        let result: RpcValue<Option<Value>> = self
            .call_typed(RpcRequest::GetAccountInfo, json!([address, { "encoding": "jsonParsed" }]))
            .await?;
        Ok(result.value)
    }

    /// Existence probe; requests base64 so large accounts encode without error
    pub async fn account_exists(&self, address: &str) -> Result<bool, RpcError> {
        let result: RpcValue<Option<Value>> = self
            .call_typed(
                RpcRequest::GetAccountInfo,
                json!([address, { "encoding": "base64", "dataSlice": { "offset": 0, "length": 0 } }]),
            )
            .await?;
        Ok(result.value.is_some())
    }

    /// Decimals of an SPL mint
    pub async fn get_token_decimals(&self, mint: &str) -> Result<u8, RpcError> {
        let result: RpcValue<RpcTokenSupply> =
            self.call_typed(RpcRequest::GetTokenSupply, json!([mint])).await?;
        Ok(result.value.decimals)
    }

    /// Recent blockhash (needed for transaction building)
    pub async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        let result: RpcValue<RpcBlockhash> = self.call_typed(RpcRequest::GetLatestBlockhash, json!([])).await?;
        let blockhash = Hash::from_str(&result.value.blockhash).map_err(|e| RpcError::InvalidResult {
            method: RpcRequest::GetLatestBlockhash.to_string(),
            message: format!("invalid blockhash: {}", e),
        })?;
        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height: result.value.last_valid_block_height,
        })
    }

    /// Broadcast a base64 transaction with preflight at `confirmed`.
    /// Returns the signature without waiting for confirmation.
    pub async fn send_transaction(&self, transaction_base64: &str) -> Result<String, RpcError> {
        self.call_typed(
            RpcRequest::SendTransaction,
            json!([transaction_base64, {
                "encoding": UiTransactionEncoding::Base64,
                "skipPreflight": false,
                "preflightCommitment": CommitmentLevel::Confirmed,
            }]),
        )
        .await
    }

    pub async fn get_health(&self) -> Result<String, RpcError> {
        self.call_typed(RpcRequest::GetHealth, json!([])).await
    }
}

/// Strip query and credentials from an endpoint so API keys stay out of errors and logs
pub fn redact_endpoint(endpoint: &str) -> String {
    match reqwest::Url::parse(endpoint) {
        Ok(mut url) => {
            url.set_query(None);
            let _ = url.set_password(None);
            let _ = url.set_username("");
            url.to_string()
        }
        Err(_) => endpoint.split('?').next().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::ScriptedTransport;

    const NODE: &str = "https://rpc.example.com/?api-key=secret";

    fn client(transport: &ScriptedTransport) -> SolanaClient {
        SolanaClient::new(Arc::new(transport.clone()), NODE)
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_failures_with_linear_backoff() {
        let transport = ScriptedTransport::new()
            .with_transport_error("getBalance", TransportError::Timeout)
            .with_transport_error("getBalance", TransportError::Connection("reset".into()))
            .with_result("getBalance", json!({ "context": { "slot": 1 }, "value": 42 }));

        let started = tokio::time::Instant::now();
        let balance = client(&transport).get_balance("wallet").await.unwrap();

        assert_eq!(balance, 42);
        assert_eq!(transport.call_count("getBalance"), 3);
        assert!(started.elapsed() >= Duration::from_millis(1_000 + 2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_attempts() {
        let transport = ScriptedTransport::new().with_transport_error("getHealth", TransportError::Timeout);

        let err = client(&transport).get_health().await.unwrap_err();
        assert!(matches!(err, RpcError::Transport { attempts: 3, .. }));
        assert_eq!(transport.call_count("getHealth"), 3);
    }

    #[tokio::test]
    async fn test_error_envelope_is_not_retried() {
        let transport = ScriptedTransport::new()
            .with_rpc_error("getBalance", -32602, "Invalid param: WrongSize")
            .with_result("getBalance", json!({ "value": 1 }));

        let err = client(&transport).get_balance("bad").await.unwrap_err();
        match &err {
            RpcError::Application { method, code, message, endpoint } => {
                assert_eq!(method, "getBalance");
                assert_eq!(*code, Some(-32602));
                assert_eq!(message, "Invalid param: WrongSize");
                assert!(!endpoint.contains("secret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.call_count("getBalance"), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_fast() {
        let transport = ScriptedTransport::new().with_transport_error(
            "getBalance",
            TransportError::Status { status: 401, body: "unauthorized".into() },
        );
        let err = client(&transport).get_balance("w").await.unwrap_err();
        assert!(matches!(err, RpcError::Transport { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_request_envelope() {
        let transport = ScriptedTransport::new().with_result("getBalance", json!({ "value": 0 }));
        let rpc = client(&transport);
        rpc.get_balance("wallet").await.unwrap();
        rpc.get_balance("wallet").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].0, NODE);
        assert_eq!(calls[0].1["jsonrpc"], "2.0");
        assert_eq!(calls[0].1["method"], "getBalance");
        assert_eq!(calls[0].1["params"], json!(["wallet"]));
        assert_ne!(calls[0].1["id"], calls[1].1["id"]);
    }

    #[tokio::test]
    async fn test_send_transaction_params() {
        let transport = ScriptedTransport::new().with_result("sendTransaction", json!("5sig"));
        let sig = client(&transport).send_transaction("AQID").await.unwrap();
        assert_eq!(sig, "5sig");

        let params = &transport.calls()[0].1["params"];
        assert_eq!(params[0], "AQID");
        assert_eq!(params[1]["encoding"], "base64");
        assert_eq!(params[1]["skipPreflight"], false);
        assert_eq!(params[1]["preflightCommitment"], "confirmed");
    }

    #[tokio::test]
    async fn test_latest_blockhash() {
        let hash = Hash::new_unique();
        let transport = ScriptedTransport::new().with_result(
            "getLatestBlockhash",
            json!({ "context": { "slot": 9 }, "value": { "blockhash": hash.to_string(), "lastValidBlockHeight": 150 } }),
        );
        let latest = client(&transport).get_latest_blockhash().await.unwrap();
        assert_eq!(latest.blockhash, hash);
        assert_eq!(latest.last_valid_block_height, 150);
    }

    #[tokio::test]
    async fn test_missing_transaction_is_none() {
        let transport = ScriptedTransport::new().with_result("getTransaction", Value::Null);
        assert!(client(&transport).get_transaction("sig").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_account_exists() {
        let transport = ScriptedTransport::new()
            .with_result("getAccountInfo", json!({ "value": null }))
            .with_result("getAccountInfo", json!({ "value": { "lamports": 1 } }));
        let rpc = client(&transport);
        assert!(!rpc.account_exists("a").await.unwrap());
        assert!(rpc.account_exists("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_result() {
        let transport = ScriptedTransport::new().with_result("getBalance", json!({ "value": "many" }));
        let err = client(&transport).get_balance("w").await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResult { .. }));
    }

    #[test]
    fn test_redact_endpoint() {
        assert_eq!(redact_endpoint(NODE), "https://rpc.example.com/");
        assert_eq!(redact_endpoint("not a url?key=1"), "not a url");
    }
}
