use mg_api_types::{Address, ChainId};
use mg_chain_client::ClientError;
use mg_network_config::NetworkConfig;
use serde::Serialize;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "Unknown error...";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no compatible wallet provider detected")]
    ProviderNotFound,
    #[error("unsupported network (chain id {chain_id})")]
    UnsupportedNetwork { chain_id: ChainId },
    #[error("no contract code at {address} on chain {chain_id}")]
    ContractNotDeployed { address: Address, chain_id: ChainId },
    #[error("failed to read {accessor}: {source}")]
    ReadFailed {
        accessor: &'static str,
        source: ClientError,
    },
    #[error("transaction rejected: {0}")]
    TransactionRejected(ClientError),
    #[error("transaction failed: {0}")]
    TransactionFailed(ClientError),
    #[error("address {0} is not in the whitelist")]
    NotAllowlisted(Address),
    #[error("{0}")]
    Provider(ClientError),
    #[error("wallet is not connected to the collection contract")]
    NotReady,
    #[error("mint quantity {quantity} is outside 1..={max}")]
    InvalidQuantity { quantity: u64, max: u64 },
    #[error("payment for {quantity} tokens overflows")]
    PaymentOverflow { quantity: u64 },
}

impl SessionError {
    /// Errors from a mutating contract call, before or after broadcast.
    pub fn from_submission(err: ClientError) -> Self {
        match err {
            ClientError::UserRejected(_) => Self::TransactionRejected(err),
            other => Self::TransactionFailed(other),
        }
    }

    fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::TransactionRejected(err) | Self::TransactionFailed(err) | Self::Provider(err) => {
                Some(err)
            }
            _ => None,
        }
    }

    /// Text shown in the error banner, before capitalization.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedNetwork { .. } => "Unsupported network!".to_owned(),
            Self::ContractNotDeployed { .. } => {
                "Could not find the contract, are you connected to the right chain?".to_owned()
            }
            // A provider payload without any message gets the generic text,
            // never the Display chain.
            _ => match self.client_error().and_then(ClientError::provider_error) {
                Some(err) => err.best_message().unwrap_or(GENERIC_ERROR_MESSAGE).to_owned(),
                None => self.to_string(),
            },
        }
    }
}

/// Pre-built content shown verbatim, bypassing message normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RichError {
    ProviderNotFound {
        explorer_name: String,
        contract_url: String,
    },
}

impl RichError {
    pub fn plain_text(&self) -> String {
        match self {
            Self::ProviderNotFound {
                explorer_name,
                contract_url,
            } => format!(
                "We were not able to detect MetaMask. You can still interact with the \
                 contract through {explorer_name} ({contract_url}) and get your whitelist \
                 proof manually with the proof tool."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ErrorInfo {
    Text(String),
    Rich(RichError),
}

impl ErrorInfo {
    pub fn from_error(err: &SessionError, network: &NetworkConfig) -> Self {
        match err {
            SessionError::ProviderNotFound => Self::Rich(RichError::ProviderNotFound {
                explorer_name: network.block_explorer.name.clone(),
                contract_url: network.contract_url(),
            }),
            other => Self::Text(normalize_message(&other.user_message())),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Rich(rich) => rich.plain_text(),
        }
    }
}

pub fn normalize_message(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GENERIC_ERROR_MESSAGE.to_owned();
    }
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => GENERIC_ERROR_MESSAGE.to_owned(),
    }
}
