//! Wallet JSON-RPC client.
//!
//! Speaks JSON-RPC 2.0 over HTTP to a wallet daemon: `get_witness` for
//! status reads, `unlock` followed by `update_witness` for key rotation.
//! Several endpoints may be configured; on a transport failure the client
//! advances to the next one, so the caller's next tick lands on a
//! different node.

use super::{ChainError, ChainReader, KeyRotator};
use async_trait::async_trait;
use sentinel_types::{SigningKey, WitnessName, WitnessStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for [`WalletRpcClient`].
#[derive(Debug, Clone)]
pub struct WalletRpcConfig {
    /// Ordered wallet/API endpoint URLs. Tried round-robin on transport
    /// failure.
    pub endpoints: Vec<String>,
    /// Wallet unlock password, required before `update_witness`. `None`
    /// skips the unlock call (wallet already unlocked out of band).
    pub wallet_password: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for WalletRpcConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            wallet_password: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// JSON-RPC client implementing [`ChainReader`] and [`KeyRotator`].
#[derive(Debug)]
pub struct WalletRpcClient {
    http: reqwest::Client,
    config: WalletRpcConfig,
    /// Index of the endpoint currently in use, advanced on transport
    /// failure. Read modulo the endpoint count.
    endpoint: AtomicUsize,
    /// JSON-RPC request id counter.
    next_id: AtomicU64,
}

/// Shape of a `get_witness` result. Other fields in the response are
/// ignored.
#[derive(Debug, Deserialize)]
struct WitnessRecord {
    signing_key: String,
    total_missed: u64,
}

impl WalletRpcClient {
    pub fn new(config: WalletRpcConfig) -> Result<Self, ChainError> {
        if config.endpoints.is_empty() {
            return Err(ChainError::NoEndpoints);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            config,
            endpoint: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    fn current_endpoint(&self) -> &str {
        let idx = self.endpoint.load(Ordering::Relaxed) % self.config.endpoints.len();
        &self.config.endpoints[idx]
    }

    /// Issue one JSON-RPC call and return its `result`.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let endpoint = self.current_endpoint().to_string();
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        debug!(%endpoint, method, "wallet rpc call");

        let response = self
            .http
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // Move on to the next configured endpoint; the caller
                // retries on its next tick.
                self.endpoint.fetch_add(1, Ordering::Relaxed);
                warn!(%endpoint, method, error = %e, "wallet rpc transport failure, advancing endpoint");
                ChainError::Transport(e.to_string())
            })?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(e.to_string()))?;

        if let Some(error) = payload.get("error") {
            if !error.is_null() {
                return Err(ChainError::Rpc(error.to_string()));
            }
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Malformed("response missing result".to_string()))
    }
}

#[async_trait]
impl ChainReader for WalletRpcClient {
    async fn witness_status(&self, witness: &WitnessName) -> Result<WitnessStatus, ChainError> {
        let result = self.call("get_witness", json!([witness.as_str()])).await?;
        let record: WitnessRecord =
            serde_json::from_value(result).map_err(|e| ChainError::Malformed(e.to_string()))?;

        Ok(WitnessStatus::new(
            SigningKey::new(record.signing_key),
            record.total_missed,
        ))
    }
}

#[async_trait]
impl KeyRotator for WalletRpcClient {
    async fn submit_key_update(
        &self,
        witness: &WitnessName,
        proposal_url: &str,
        key: &SigningKey,
    ) -> Result<(), ChainError> {
        if let Some(password) = &self.config.wallet_password {
            self.call("unlock", json!([password]))
                .await
                .map_err(|e| ChainError::Wallet(e.to_string()))?;
        }

        // Final `true` broadcasts the signed transaction.
        self.call(
            "update_witness",
            json!([witness.as_str(), proposal_url, key.as_str(), true]),
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    /// Spawn a mock wallet that records method names and answers
    /// `get_witness` with the given record, everything else with `true`.
    async fn spawn_wallet(
        signing_key: &str,
        total_missed: u64,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let calls: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let record = json!({
            "id": "1.6.42",
            "signing_key": signing_key,
            "total_missed": total_missed,
            "url": "https://example.invalid/witness",
        });

        let calls_handler = calls.clone();
        let app = Router::new().route(
            "/",
            post(move |Json(request): Json<Value>| {
                let calls = calls_handler.clone();
                let record = record.clone();
                async move {
                    let method = request["method"].as_str().unwrap_or_default().to_string();
                    calls.lock().unwrap().push(method.clone());
                    let result = if method == "get_witness" {
                        record
                    } else {
                        json!(true)
                    };
                    Json(json!({"jsonrpc": "2.0", "id": request["id"], "result": result}))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/"), calls)
    }

    fn client_for(endpoints: Vec<String>) -> WalletRpcClient {
        WalletRpcClient::new(WalletRpcConfig {
            endpoints,
            wallet_password: Some("hunter2".to_string()),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn rejects_empty_endpoint_list() {
        let err = WalletRpcClient::new(WalletRpcConfig::default()).unwrap_err();
        assert!(matches!(err, ChainError::NoEndpoints));
    }

    #[tokio::test]
    async fn fetches_witness_status() {
        let (endpoint, _) = spawn_wallet("BTS_active", 7).await;
        let client = client_for(vec![endpoint]);

        let status = client
            .witness_status(&WitnessName::from("init-witness"))
            .await
            .unwrap();

        assert_eq!(status.signing_key, SigningKey::from("BTS_active"));
        assert_eq!(status.total_missed, 7);
    }

    #[tokio::test]
    async fn unlocks_before_updating_witness() {
        let (endpoint, calls) = spawn_wallet("BTS_active", 0).await;
        let client = client_for(vec![endpoint]);

        client
            .submit_key_update(
                &WitnessName::from("init-witness"),
                "https://example.invalid/witness",
                &SigningKey::from("BTS_backup"),
            )
            .await
            .unwrap();

        assert_eq!(
            calls.lock().unwrap().as_slice(),
            ["unlock", "update_witness"]
        );
    }

    #[tokio::test]
    async fn transport_failure_advances_to_next_endpoint() {
        // Port 9 (discard) refuses connections; the second endpoint works.
        let (good, _) = spawn_wallet("BTS_active", 3).await;
        let client = client_for(vec!["http://127.0.0.1:9/".to_string(), good]);
        let witness = WitnessName::from("init-witness");

        let err = client.witness_status(&witness).await.unwrap_err();
        assert!(matches!(err, ChainError::Transport(_)));

        // The failure moved the cursor, so the retry reaches the live node.
        let status = client.witness_status(&witness).await.unwrap();
        assert_eq!(status.total_missed, 3);
    }

    #[tokio::test]
    async fn surfaces_rpc_errors() {
        let app = Router::new().route(
            "/",
            post(|Json(request): Json<Value>| async move {
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": {"code": -32000, "message": "witness not found"},
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = client_for(vec![format!("http://{addr}/")]);
        let err = client
            .witness_status(&WitnessName::from("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Rpc(_)));
    }
}
