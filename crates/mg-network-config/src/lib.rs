//! Static network and collection configuration.
//!
//! A `CollectionConfig` is loaded once (from a JSON file or an embedded
//! string) and turned into a `NetworkTable`. Only chains listed in the table
//! are acceptable; there is no fallback network for an unknown chain id.

use mg_api_types::{Address, ChainId, TxHash};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkConfigError {
    #[error("unsupported network: chain id {0}")]
    UnsupportedNetwork(ChainId),
    #[error("duplicate chain id {0} in collection config")]
    DuplicateChainId(ChainId),
    #[error("failed to read collection config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid collection config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockExplorer {
    pub name: String,
    pub base_url: String,
}

impl BlockExplorer {
    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn transaction_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.base(), tx_hash)
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.base(), address)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: ChainId,
    pub display_name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub contract_address: Address,
    pub block_explorer: BlockExplorer,
}

fn default_symbol() -> String {
    "ETH".to_owned()
}

impl NetworkConfig {
    pub fn transaction_url(&self, tx_hash: &TxHash) -> String {
        self.block_explorer.transaction_url(tx_hash)
    }

    pub fn contract_url(&self) -> String {
        self.block_explorer.address_url(&self.contract_address)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionConfig {
    pub token_name: String,
    pub contract_name: String,
    pub mainnet: NetworkConfig,
    pub testnet: NetworkConfig,
    #[serde(default)]
    pub allowlist: Vec<String>,
}

impl CollectionConfig {
    pub fn from_json(raw: &str) -> Result<Self, NetworkConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| NetworkConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn network_table(&self) -> Result<NetworkTable, NetworkConfigError> {
        NetworkTable::new(self.mainnet.clone(), vec![self.testnet.clone()])
    }
}

/// Chain id to network lookup. The first entry is the primary (main) network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTable {
    networks: Vec<NetworkConfig>,
}

impl NetworkTable {
    pub fn new(
        primary: NetworkConfig,
        others: Vec<NetworkConfig>,
    ) -> Result<Self, NetworkConfigError> {
        let mut networks = Vec::with_capacity(others.len() + 1);
        networks.push(primary);
        for network in others {
            if networks.iter().any(|known| known.chain_id == network.chain_id) {
                return Err(NetworkConfigError::DuplicateChainId(network.chain_id));
            }
            networks.push(network);
        }
        Ok(Self { networks })
    }

    pub fn primary(&self) -> &NetworkConfig {
        &self.networks[0]
    }

    pub fn lookup(&self, chain_id: ChainId) -> Result<&NetworkConfig, NetworkConfigError> {
        self.networks
            .iter()
            .find(|network| network.chain_id == chain_id)
            .ok_or(NetworkConfigError::UnsupportedNetwork(chain_id))
    }

    pub fn is_primary(&self, chain_id: ChainId) -> bool {
        self.primary().chain_id == chain_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.iter()
    }
}
