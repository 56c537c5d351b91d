use serde::{Deserialize, Serialize};
use std::fmt;

pub use alloy_primitives::{Address, B256, Bytes, U256};

pub type TxHash = B256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Parse a JSON-RPC hex quantity such as `"0x539"`.
    pub fn from_hex_quantity(raw: &str) -> Option<Self> {
        let digits = raw.trim().strip_prefix("0x").or_else(|| raw.trim().strip_prefix("0X"))?;
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(ChainId)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    pub chain_id: ChainId,
    pub name: String,
}

impl Network {
    pub fn from_chain_id(chain_id: ChainId) -> Self {
        let name = match chain_id.0 {
            1 => "mainnet",
            5 => "goerli",
            137 => "matic",
            80001 => "maticmum",
            11155111 => "sepolia",
            _ => "unknown",
        };
        Self {
            chain_id,
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Merkle proof that an address belongs to the collection allow-list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowlistProof(pub Vec<B256>);

impl AllowlistProof {
    pub fn as_slice(&self) -> &[B256] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Proof words as `0x`-prefixed hex, the form block explorers accept for `bytes32[]`.
    pub fn to_hex_words(&self) -> Vec<String> {
        self.0.iter().map(|word| word.to_string()).collect()
    }
}

/// Local mirror of the collection's public sale parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractSnapshot {
    pub total_supply: u64,
    pub max_supply: u64,
    pub max_mint_per_tx: u64,
    pub unit_price: U256,
    pub is_paused: bool,
    pub allowlist_mint_enabled: bool,
    pub caller_allowlisted: bool,
}

impl Default for ContractSnapshot {
    fn default() -> Self {
        Self {
            total_supply: 0,
            max_supply: 0,
            max_mint_per_tx: 0,
            unit_price: U256::ZERO,
            is_paused: true,
            allowlist_mint_enabled: false,
            caller_allowlisted: false,
        }
    }
}

impl ContractSnapshot {
    pub fn is_sold_out(&self) -> bool {
        self.max_supply != 0 && self.total_supply >= self.max_supply
    }

    pub fn remaining(&self) -> u64 {
        self.max_supply.saturating_sub(self.total_supply)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MintPath {
    Standard,
    Allowlist,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplorerLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<ExplorerLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_parses_hex_quantities() {
        assert_eq!(ChainId::from_hex_quantity("0x1"), Some(ChainId(1)));
        assert_eq!(ChainId::from_hex_quantity("0x7a69"), Some(ChainId(31337)));
        assert_eq!(ChainId::from_hex_quantity(" 0xaa36a7 "), Some(ChainId(11155111)));
        assert_eq!(ChainId::from_hex_quantity("0x"), None);
        assert_eq!(ChainId::from_hex_quantity("1"), None);
        assert_eq!(ChainId::from_hex_quantity("0xzz"), None);
    }

    #[test]
    fn sold_out_requires_known_max_supply() {
        let mut snapshot = ContractSnapshot::default();
        assert!(!snapshot.is_sold_out());

        snapshot.max_supply = 9999;
        snapshot.total_supply = 9998;
        assert!(!snapshot.is_sold_out());
        assert_eq!(snapshot.remaining(), 1);

        snapshot.total_supply = 9999;
        assert!(snapshot.is_sold_out());
        assert_eq!(snapshot.remaining(), 0);
    }

    #[test]
    fn default_snapshot_is_paused() {
        let snapshot = ContractSnapshot::default();
        assert!(snapshot.is_paused);
        assert_eq!(snapshot.unit_price, U256::ZERO);
    }

    #[test]
    fn notification_serializes_kind_in_snake_case() {
        let notification = Notification {
            kind: NotificationKind::Success,
            message: "Success!".to_owned(),
            link: None,
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["kind"], "success");
    }
}
