use async_trait::async_trait;
use mg_api_types::{Address, AllowlistProof, Bytes, Network, TxHash, TxReceipt, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// EIP-1193 code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error object as reported by a wallet provider or JSON-RPC node.
///
/// Providers nest the useful text in different places, so every level is
/// kept and `best_message` picks the most specific one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<Box<ProviderError>>,
}

impl ProviderError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
            error: None,
        }
    }

    pub fn data_message(&self) -> Option<&str> {
        self.data.as_ref()?.get("message")?.as_str()
    }

    /// Nested provider message, then data-level message, then top-level message.
    pub fn best_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|inner| inner.message.as_deref())
            .or_else(|| self.data_message())
            .or(self.message.as_deref())
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
            || self
                .error
                .as_ref()
                .is_some_and(|inner| inner.is_user_rejection())
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.best_message(), self.code) {
            (Some(message), _) => write!(f, "{message}"),
            (None, Some(code)) => write!(f, "provider error {code}"),
            (None, None) => write!(f, "provider error"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("user rejected the request: {0}")]
    UserRejected(ProviderError),
    #[error("{0}")]
    Provider(ProviderError),
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn from_provider(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected(err)
        } else {
            Self::Provider(err)
        }
    }

    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::UserRejected(err) | Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(mg_api_types::ChainId),
}

/// Browser wallet (or node) that owns the user's accounts.
#[async_trait(?Send)]
pub trait WalletProvider {
    fn is_metamask(&self) -> bool;
    /// May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError>;
    async fn list_accounts(&self) -> Result<Vec<Address>, ClientError>;
    async fn get_network(&self) -> Result<Network, ClientError>;
    async fn get_code(&self, address: Address) -> Result<Bytes, ClientError>;
    /// Account/chain change notifications. Only the first call gets a receiver.
    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>>;
    /// Bind the collection contract at `address`, signing as `signer`.
    fn contract(&self, address: Address, signer: Address) -> Rc<dyn MintContract>;
}

#[async_trait(?Send)]
pub trait MintContract {
    fn address(&self) -> Address;
    async fn max_supply(&self) -> Result<u64, ClientError>;
    async fn total_supply(&self) -> Result<u64, ClientError>;
    async fn max_mint_amount_per_tx(&self) -> Result<u64, ClientError>;
    async fn cost(&self) -> Result<U256, ClientError>;
    async fn paused(&self) -> Result<bool, ClientError>;
    async fn whitelist_mint_enabled(&self) -> Result<bool, ClientError>;
    async fn mint(
        &self,
        quantity: u64,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError>;
    async fn allowlist_mint(
        &self,
        quantity: u64,
        proof: &AllowlistProof,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError>;
}

#[async_trait(?Send)]
pub trait PendingTransaction {
    fn hash(&self) -> TxHash;
    /// Resolves once the transaction is included; a revert is an error.
    async fn wait(self: Box<Self>) -> Result<TxReceipt, ClientError>;
}
