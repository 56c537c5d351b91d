use async_trait::async_trait;
use mg_api_types::{Address, Bytes, ChainId, Network};
use mg_chain_client::{ClientError, MintContract, ProviderEvent, WalletProvider};
use serde_json::{Value, json};
use std::rc::Rc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::contract::RpcMintContract;
use crate::decode;
use crate::transport::RpcTransport;

/// `WalletProvider` over any JSON-RPC transport.
pub struct RpcWalletProvider<T> {
    transport: Rc<T>,
}

impl<T> Clone for RpcWalletProvider<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Rc::clone(&self.transport),
        }
    }
}

impl<T: RpcTransport + 'static> RpcWalletProvider<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Rc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport + 'static> WalletProvider for RpcWalletProvider<T> {
    fn is_metamask(&self) -> bool {
        self.transport.is_metamask()
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let result = self
            .transport
            .request("eth_requestAccounts", Value::Array(Vec::new()))
            .await?;
        decode("eth_requestAccounts", result)
    }

    async fn list_accounts(&self) -> Result<Vec<Address>, ClientError> {
        let result = self
            .transport
            .request("eth_accounts", Value::Array(Vec::new()))
            .await?;
        decode("eth_accounts", result)
    }

    async fn get_network(&self) -> Result<Network, ClientError> {
        let result = self
            .transport
            .request("eth_chainId", Value::Array(Vec::new()))
            .await?;
        let raw: String = decode("eth_chainId", result)?;
        let chain_id = ChainId::from_hex_quantity(&raw)
            .ok_or_else(|| ClientError::Decode(format!("eth_chainId: invalid quantity '{raw}'")))?;
        debug!(%chain_id, "network detected");
        Ok(Network::from_chain_id(chain_id))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ClientError> {
        let result = self
            .transport
            .request("eth_getCode", json!([address, "latest"]))
            .await?;
        decode("eth_getCode", result)
    }

    fn subscribe(&self) -> Option<UnboundedReceiver<ProviderEvent>> {
        self.transport.subscribe()
    }

    fn contract(&self, address: Address, signer: Address) -> Rc<dyn MintContract> {
        Rc::new(RpcMintContract::new(Rc::clone(&self.transport), address, signer))
    }
}
