//! JSON-RPC implementation of the wallet provider and collection contract.
//!
//! The same code serves both hosts: the browser wraps `window.ethereum`
//! in an `RpcTransport`, the console uses `HttpTransport`.

pub mod abi;
pub mod contract;
#[cfg(feature = "http")]
pub mod http;
pub mod provider;
pub mod transport;

#[cfg(test)]
mod testing;

pub use contract::{RpcMintContract, RpcPendingTransaction};
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use provider::RpcWalletProvider;
pub use transport::RpcTransport;

use mg_chain_client::ClientError;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn decode<D: DeserializeOwned>(method: &str, value: Value) -> Result<D, ClientError> {
    serde_json::from_value(value).map_err(|err| ClientError::Decode(format!("{method}: {err}")))
}
