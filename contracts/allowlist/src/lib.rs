#![no_std]

//! Merkle allow-list builder.
//!
//! Leaves are 32-byte hashes. Internal nodes hash the two children in sorted
//! byte order, so a proof is just the list of siblings and carries no
//! left/right flags. A node left without a partner at the end of a layer is
//! promoted to the next layer unchanged.

use core::fmt;

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, Vec};


// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MerkleError {
    /// A tree needs at least one leaf.
    EmptyLeaves,
    /// The requested leaf is not part of the tree.
    LeafNotFound,
}

impl fmt::Display for MerkleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerkleError::EmptyLeaves => f.write_str("empty leaf set"),
            MerkleError::LeafNotFound => f.write_str("leaf not found"),
        }
    }
}

// ── Hashing ─────────────────────────────────────────────────────────────────

/// Hashes two nodes in sorted order: `keccak256(min || max)`.
pub fn hash_pair(env: &Env, a: &BytesN<32>, b: &BytesN<32>) -> BytesN<32> {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut data = Bytes::from_array(env, &first.to_array());
    data.extend_from_array(&second.to_array());
    env.crypto().keccak256(&data).into()
}

/// Canonical leaf for an account: `keccak256` of its XDR encoding.
pub fn leaf_for(env: &Env, account: &Address) -> BytesN<32> {
    let encoded = account.clone().to_xdr(env);
    env.crypto().keccak256(&encoded).into()
}

/// Folds `proof` into `leaf` and returns the resulting root.
pub fn process_proof(env: &Env, leaf: &BytesN<32>, proof: &Vec<BytesN<32>>) -> BytesN<32> {
    let mut computed = leaf.clone();
    for sibling in proof.iter() {
        computed = hash_pair(env, &computed, &sibling);
    }
    computed
}

/// Returns true when `proof` links `leaf` to `root`.
pub fn verify(env: &Env, root: &BytesN<32>, leaf: &BytesN<32>, proof: &Vec<BytesN<32>>) -> bool {
    process_proof(env, leaf, proof) == *root
}

// ── Tree ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MerkleTree {
    env: Env,
    /// Layer 0 holds the leaves, the last layer holds only the root.
    layers: Vec<Vec<BytesN<32>>>,
    root: BytesN<32>,
}

impl MerkleTree {
    /// Builds the tree bottom-up over `leaves`, in the order given.
    pub fn new(env: &Env, leaves: Vec<BytesN<32>>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }

        let mut layers: Vec<Vec<BytesN<32>>> = Vec::new(env);
        let mut current = leaves;
        while current.len() > 1 {
            let next = Self::next_layer(env, &current);
            layers.push_back(current);
            current = next;
        }

        let root = current.first().ok_or(MerkleError::EmptyLeaves)?;
        layers.push_back(current);

        Ok(Self {
            env: env.clone(),
            layers,
            root,
        })
    }

    /// Builds a tree whose leaves are `leaf_for` of each account.
    pub fn from_accounts(env: &Env, accounts: &Vec<Address>) -> Result<Self, MerkleError> {
        let mut leaves = Vec::new(env);
        for account in accounts.iter() {
            leaves.push_back(leaf_for(env, &account));
        }
        Self::new(env, leaves)
    }

    fn next_layer(env: &Env, layer: &Vec<BytesN<32>>) -> Vec<BytesN<32>> {
        let mut next = Vec::new(env);
        let mut i = 0;
        while i < layer.len() {
            match (layer.get(i), layer.get(i + 1)) {
                (Some(left), Some(right)) => next.push_back(hash_pair(env, &left, &right)),
                (Some(odd), None) => next.push_back(odd),
                _ => {}
            }
            i += 2;
        }
        next
    }

    pub fn root(&self) -> BytesN<32> {
        self.root.clone()
    }

    pub fn leaves(&self) -> Vec<BytesN<32>> {
        self.layers.first().unwrap_or_else(|| Vec::new(&self.env))
    }

    /// Number of hashing levels between the leaves and the root.
    pub fn depth(&self) -> u32 {
        self.layers.len() - 1
    }

    /// Sibling path from `leaf` to the root. Levels where the node was
    /// promoted without a partner add nothing to the path.
    pub fn proof(&self, leaf: &BytesN<32>) -> Result<Vec<BytesN<32>>, MerkleError> {
        let mut index = self
            .leaves()
            .first_index_of(leaf)
            .ok_or(MerkleError::LeafNotFound)?;

        let mut proof = Vec::new(&self.env);
        for layer in self.layers.iter() {
            let sibling = if index % 2 == 1 { index - 1 } else { index + 1 };
            if let Some(node) = layer.get(sibling) {
                proof.push_back(node);
            }
            index /= 2;
        }
        Ok(proof)
    }

    /// Proof for the canonical leaf of `account`.
    pub fn proof_for(&self, account: &Address) -> Result<Vec<BytesN<32>>, MerkleError> {
        self.proof(&leaf_for(&self.env, account))
    }
}
