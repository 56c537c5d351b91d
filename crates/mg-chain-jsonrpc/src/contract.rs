use alloy_sol_types::SolCall;
use async_trait::async_trait;
use mg_api_types::{Address, AllowlistProof, Bytes, TxHash, TxReceipt, U256};
use mg_chain_client::{ClientError, MintContract, PendingTransaction};
use serde::Deserialize;
use serde_json::json;
use std::rc::Rc;
use tracing::{debug, info};

use crate::abi::IMintCollection;
use crate::decode;
use crate::transport::RpcTransport;

/// Collection contract bound through `eth_call` / `eth_sendTransaction`.
pub struct RpcMintContract<T> {
    transport: Rc<T>,
    address: Address,
    signer: Address,
}

impl<T: RpcTransport + 'static> RpcMintContract<T> {
    pub fn new(transport: Rc<T>, address: Address, signer: Address) -> Self {
        Self {
            transport,
            address,
            signer,
        }
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ClientError> {
        let data = Bytes::from(call.abi_encode());
        let result = self
            .transport
            .request("eth_call", json!([{ "to": self.address, "data": data }, "latest"]))
            .await?;
        let raw: Bytes = decode("eth_call", result)?;
        C::abi_decode_returns(&raw, true)
            .map_err(|err| ClientError::Decode(format!("{}: {err}", C::SIGNATURE)))
    }

    async fn send<C: SolCall>(
        &self,
        call: C,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        let data = Bytes::from(call.abi_encode());
        let result = self
            .transport
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": self.signer,
                    "to": self.address,
                    "data": data,
                    "value": value,
                }]),
            )
            .await?;
        let hash: TxHash = decode("eth_sendTransaction", result)?;
        info!(%hash, function = C::SIGNATURE, "transaction submitted");

        Ok(Box::new(RpcPendingTransaction {
            transport: Rc::clone(&self.transport),
            hash,
        }))
    }
}

fn to_u64(accessor: &str, value: U256) -> Result<u64, ClientError> {
    let limbs = value.as_limbs();
    if limbs[1..].iter().any(|limb| *limb != 0) {
        return Err(ClientError::Decode(format!(
            "{accessor}: {value} does not fit in u64"
        )));
    }
    Ok(limbs[0])
}

#[async_trait(?Send)]
impl<T: RpcTransport + 'static> MintContract for RpcMintContract<T> {
    fn address(&self) -> Address {
        self.address
    }

    async fn max_supply(&self) -> Result<u64, ClientError> {
        let value = self.call(IMintCollection::maxSupplyCall {}).await?._0;
        to_u64("maxSupply", value)
    }

    async fn total_supply(&self) -> Result<u64, ClientError> {
        let value = self.call(IMintCollection::totalSupplyCall {}).await?._0;
        to_u64("totalSupply", value)
    }

    async fn max_mint_amount_per_tx(&self) -> Result<u64, ClientError> {
        let value = self.call(IMintCollection::maxMintAmountPerTxCall {}).await?._0;
        to_u64("maxMintAmountPerTx", value)
    }

    async fn cost(&self) -> Result<U256, ClientError> {
        Ok(self.call(IMintCollection::costCall {}).await?._0)
    }

    async fn paused(&self) -> Result<bool, ClientError> {
        Ok(self.call(IMintCollection::pausedCall {}).await?._0)
    }

    async fn whitelist_mint_enabled(&self) -> Result<bool, ClientError> {
        Ok(self.call(IMintCollection::whitelistMintEnabledCall {}).await?._0)
    }

    async fn mint(
        &self,
        quantity: u64,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        let call = IMintCollection::mintCall {
            _mintAmount: U256::from(quantity),
        };
        self.send(call, value).await
    }

    async fn allowlist_mint(
        &self,
        quantity: u64,
        proof: &AllowlistProof,
        value: U256,
    ) -> Result<Box<dyn PendingTransaction>, ClientError> {
        let call = IMintCollection::whitelistMintCall {
            _mintAmount: U256::from(quantity),
            _merkleProof: proof.as_slice().to_vec(),
        };
        self.send(call, value).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: TxHash,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct RpcPendingTransaction<T> {
    transport: Rc<T>,
    hash: TxHash,
}

#[async_trait(?Send)]
impl<T: RpcTransport + 'static> PendingTransaction for RpcPendingTransaction<T> {
    fn hash(&self) -> TxHash {
        self.hash
    }

    async fn wait(self: Box<Self>) -> Result<TxReceipt, ClientError> {
        loop {
            let result = self
                .transport
                .request("eth_getTransactionReceipt", json!([self.hash]))
                .await?;

            if result.is_null() {
                debug!(hash = %self.hash, "receipt not available yet");
                self.transport.delay(self.transport.poll_interval()).await;
                continue;
            }

            let raw: RawReceipt = decode("eth_getTransactionReceipt", result)?;
            let block_number = raw
                .block_number
                .as_deref()
                .and_then(|n| u64::from_str_radix(n.trim_start_matches("0x"), 16).ok());
            // Pre-Byzantium receipts carry no status; treat inclusion as success.
            let success = raw.status.as_deref() != Some("0x0");

            if !success {
                return Err(ClientError::Reverted {
                    tx_hash: raw.transaction_hash,
                });
            }

            info!(hash = %raw.transaction_hash, ?block_number, "transaction confirmed");
            return Ok(TxReceipt {
                transaction_hash: raw.transaction_hash,
                block_number,
                success,
            });
        }
    }
}
