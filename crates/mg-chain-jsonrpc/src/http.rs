use async_trait::async_trait;
use mg_api_types::{Address, ChainId};
use mg_chain_client::{ClientError, ProviderError, ProviderEvent};
use serde::Deserialize;
use serde_json::{Value, json};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::transport::{DEFAULT_POLL_INTERVAL, RpcTransport};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC 2.0 over HTTP, for development nodes with unlocked accounts.
///
/// Reads `MINT_RPC_URL` (default `http://localhost:8545`) and
/// `MINT_POLL_INTERVAL_MS` at construction time. Nodes push no wallet
/// events, so `subscribe` spawns a poller with `tokio::task::spawn_local`
/// and must be called from inside a `LocalSet`.
pub struct HttpTransport {
    client: RpcClient,
    poll_interval: Duration,
    subscribed: Cell<bool>,
}

#[derive(Clone)]
struct RpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: Rc<Cell<u64>>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("MINT_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let poll_interval = std::env::var("MINT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        Self {
            client: RpcClient {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                http: reqwest::Client::new(),
                next_id: Rc::new(Cell::new(1)),
            },
            poll_interval,
            subscribed: Cell::new(false),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.client.endpoint
    }
}

impl RpcClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| ClientError::Transport(format!("{method} transport: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!("{method} HTTP {status}: {text}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(format!("{method} response: {err}")))?;
        rpc_result(method, body)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ClientError> {
        crate::decode("eth_accounts", self.call("eth_accounts", json!([])).await?)
    }

    async fn chain_id(&self) -> Result<Option<ChainId>, ClientError> {
        let raw: String = crate::decode("eth_chainId", self.call("eth_chainId", json!([])).await?)?;
        Ok(ChainId::from_hex_quantity(&raw))
    }
}

/// Unwraps a JSON-RPC response envelope. An `error` member wins over
/// `result`; a missing result reads as `null`.
fn rpc_result(method: &str, body: Value) -> Result<Value, ClientError> {
    let body: RpcResponse = serde_json::from_value(body)
        .map_err(|err| ClientError::Decode(format!("{method} response: {err}")))?;

    if let Some(error) = body.error {
        debug!(method, code = ?error.code, "rpc error");
        return Err(ClientError::from_provider(error));
    }

    Ok(body.result.unwrap_or(Value::Null))
}

async fn poll_wallet_changes(
    client: RpcClient,
    interval: Duration,
    events: UnboundedSender<ProviderEvent>,
) {
    let mut accounts = client.accounts().await.unwrap_or_default();
    let mut chain = client.chain_id().await.ok().flatten();

    loop {
        tokio::time::sleep(interval).await;
        if events.is_closed() {
            break;
        }

        match client.accounts().await {
            Ok(current) if current != accounts => {
                accounts = current.clone();
                if events.send(ProviderEvent::AccountsChanged(current)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => warn!("account poll failed: {}", err),
        }

        match client.chain_id().await {
            Ok(Some(current)) if Some(current) != chain => {
                chain = Some(current);
                if events.send(ProviderEvent::ChainChanged(current)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => warn!("chain poll failed: {}", err),
        }
    }
}

#[async_trait(?Send)]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.client.call(method, params).await
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        if self.subscribed.replace(true) {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::task::spawn_local(poll_wallet_changes(
            self.client.clone(),
            self.poll_interval,
            tx,
        ));
        Some(rx)
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_member_becomes_provider_error() {
        let err = rpc_result(
            "eth_sendTransaction",
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": {
                    "code": -32603,
                    "message": "Internal JSON-RPC error.",
                    "data": { "message": "execution reverted: Insufficient funds!" }
                }
            }),
        )
        .unwrap_err();

        let provider = err.provider_error().expect("provider payload");
        assert!(matches!(err, ClientError::Provider(_)));
        assert_eq!(provider.code, Some(-32603));
        assert_eq!(
            provider.best_message(),
            Some("execution reverted: Insufficient funds!")
        );
    }

    #[test]
    fn code_4001_is_a_user_rejection() {
        let err = rpc_result(
            "eth_requestAccounts",
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": 4001, "message": "User rejected the request." }
            }),
        )
        .unwrap_err();

        assert!(matches!(err, ClientError::UserRejected(_)));
        assert_eq!(
            err.provider_error().and_then(ProviderError::best_message),
            Some("User rejected the request.")
        );
    }

    #[test]
    fn result_is_returned_and_missing_result_is_null() -> anyhow::Result<()> {
        let chain = rpc_result("eth_chainId", json!({ "jsonrpc": "2.0", "id": 2, "result": "0x1" }))?;
        assert_eq!(chain, json!("0x1"));

        let receipt = rpc_result(
            "eth_getTransactionReceipt",
            json!({ "jsonrpc": "2.0", "id": 3, "result": null }),
        )?;
        assert_eq!(receipt, Value::Null);

        let empty = rpc_result("eth_accounts", json!({ "jsonrpc": "2.0", "id": 4 }))?;
        assert_eq!(empty, Value::Null);
        Ok(())
    }

    #[test]
    fn malformed_envelope_is_a_decode_error() {
        let err = rpc_result("eth_call", json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
