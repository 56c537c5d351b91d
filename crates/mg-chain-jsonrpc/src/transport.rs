use async_trait::async_trait;
use mg_chain_client::{ClientError, ProviderEvent};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// A JSON-RPC channel to an Ethereum node or an injected wallet.
///
/// `request` returns the `result` member of the response; error objects come
/// back as `ClientError::Provider` / `ClientError::UserRejected`.
#[async_trait(?Send)]
pub trait RpcTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ClientError>;

    fn is_metamask(&self) -> bool {
        false
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        None
    }

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Sleep on whatever timer the host runtime provides.
    async fn delay(&self, duration: Duration);
}
