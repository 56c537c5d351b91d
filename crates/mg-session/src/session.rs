use mg_api_types::{Address, AllowlistProof, ChainId, ContractSnapshot, Network, TxHash};
use mg_network_config::NetworkConfig;
use serde::Serialize;

use crate::error::ErrorInfo;
use crate::widget::MintWidgetProps;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProofFeedback {
    Proof { words: Vec<String> },
    NotAllowlisted { address: Address },
    InvalidAddress,
}

impl ProofFeedback {
    pub fn from_proof(proof: &AllowlistProof) -> Self {
        Self::Proof {
            words: proof.to_hex_words(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            // JSON array, pasteable as a bytes32[] explorer argument.
            Self::Proof { words } => serde_json::to_string(words).unwrap_or_default(),
            Self::NotAllowlisted { .. } => "The given address is not in the whitelist".to_owned(),
            Self::InvalidAddress => "Invalid address".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProofLookup {
    pub address: String,
    pub feedback: Option<ProofFeedback>,
}

/// Everything the rendering layer needs. Owned by `SessionController`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub connected_address: Option<Address>,
    pub network: Option<Network>,
    pub network_config: NetworkConfig,
    pub primary_chain_id: ChainId,
    pub loading: bool,
    pub last_error: Option<ErrorInfo>,
    pub provider_available: bool,
    pub contract_ready: bool,
    pub snapshot: ContractSnapshot,
    pub manual_proof: ProofLookup,
}

impl Session {
    pub fn new(primary: NetworkConfig) -> Self {
        Self {
            connected_address: None,
            network: None,
            primary_chain_id: primary.chain_id,
            network_config: primary,
            loading: false,
            last_error: None,
            provider_available: false,
            contract_ready: false,
            snapshot: ContractSnapshot::default(),
            manual_proof: ProofLookup::default(),
        }
    }

    /// Back to the mount-time state. Provider detection survives.
    pub(crate) fn reset(&mut self, primary: &NetworkConfig) {
        let provider_available = self.provider_available;
        *self = Self::new(primary.clone());
        self.provider_available = provider_available;
    }

    pub fn is_wallet_connected(&self) -> bool {
        self.connected_address.is_some()
    }

    pub fn is_contract_ready(&self) -> bool {
        self.contract_ready
    }

    pub fn is_sold_out(&self) -> bool {
        self.snapshot.is_sold_out()
    }

    pub fn is_not_mainnet(&self) -> bool {
        self.network
            .as_ref()
            .is_some_and(|network| network.chain_id != self.primary_chain_id)
    }

    pub fn can_connect(&self) -> bool {
        self.provider_available
    }

    pub fn contract_url(&self) -> String {
        self.network_config.contract_url()
    }

    pub fn transaction_url(&self, tx_hash: &TxHash) -> String {
        self.network_config.transaction_url(tx_hash)
    }

    /// Props for the mint widget, or `None` when it must not be shown.
    pub fn mint_widget_props(&self) -> Option<MintWidgetProps> {
        if !self.is_wallet_connected() || !self.contract_ready || self.is_sold_out() {
            return None;
        }
        Some(MintWidgetProps::from_session(self))
    }
}
