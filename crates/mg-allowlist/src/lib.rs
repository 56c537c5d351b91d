//! Allow-list membership and Merkle proofs.
//!
//! Leaves are `keccak256(address)` over the raw 20 address bytes, pairs are
//! hashed in sorted order and an odd trailing node is carried up unhashed.
//! That is the tree OpenZeppelin's `MerkleProof.verify` accepts.

use alloy_primitives::keccak256;
use mg_api_types::{Address, AllowlistProof, B256};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("address {0} is not in the allow-list")]
    NotAllowlisted(Address),
    #[error("invalid allow-list entry '{0}'")]
    InvalidEntry(String),
}

#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    index: HashMap<Address, usize>,
    layers: Vec<Vec<B256>>,
}

impl Allowlist {
    pub fn new<I, S>(entries: I) -> Result<Self, AllowlistError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut addresses = Vec::new();
        for entry in entries {
            let raw = entry.as_ref().trim();
            let address = Address::from_str(raw)
                .map_err(|_| AllowlistError::InvalidEntry(raw.to_owned()))?;
            addresses.push(address);
        }
        Ok(Self::from_addresses(addresses))
    }

    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        let mut index = HashMap::with_capacity(addresses.len());
        for (position, address) in addresses.iter().enumerate() {
            index.entry(*address).or_insert(position);
        }

        let leaves: Vec<B256> = addresses.iter().map(leaf_hash).collect();
        let layers = build_layers(leaves);
        debug!(leaves = addresses.len(), "allow-list tree built");

        Self { index, layers }
    }

    pub fn len(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// Case-insensitive membership test on user-supplied text.
    pub fn contains_str(&self, raw: &str) -> bool {
        Address::from_str(raw.trim())
            .map(|address| self.contains(&address))
            .unwrap_or(false)
    }

    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or(B256::ZERO)
    }

    pub fn proof_for(&self, address: &Address) -> Result<AllowlistProof, AllowlistError> {
        let Some(&leaf_index) = self.index.get(address) else {
            return Err(AllowlistError::NotAllowlisted(*address));
        };

        let mut proof = Vec::new();
        let mut position = leaf_index;
        for layer in &self.layers[..self.layers.len().saturating_sub(1)] {
            let sibling = position ^ 1;
            if let Some(node) = layer.get(sibling) {
                proof.push(*node);
            }
            position /= 2;
        }

        Ok(AllowlistProof(proof))
    }

    pub fn verify(proof: &AllowlistProof, address: &Address, root: B256) -> bool {
        let computed = proof
            .as_slice()
            .iter()
            .fold(leaf_hash(address), |node, sibling| hash_pair(&node, sibling));
        computed == root
    }
}

fn leaf_hash(address: &Address) -> B256 {
    keccak256(address.as_slice())
}

fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut input = [0_u8; 64];
    input[..32].copy_from_slice(first.as_slice());
    input[32..].copy_from_slice(second.as_slice());
    keccak256(input)
}

fn build_layers(leaves: Vec<B256>) -> Vec<Vec<B256>> {
    if leaves.is_empty() {
        return Vec::new();
    }

    let mut layers = vec![leaves];
    while layers[layers.len() - 1].len() > 1 {
        let current = &layers[layers.len() - 1];
        let next: Vec<B256> = current
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect();
        layers.push(next);
    }
    layers
}
