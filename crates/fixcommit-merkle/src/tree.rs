//! Binary Keccak Merkle tree over sorted leaves.
//!
//! Leaves are ordered by the bytewise order of their path encodings. Each
//! level pairs adjacent nodes left to right; a trailing odd node moves up
//! unchanged. A tree with no leaves commits to [`empty_root`].

use std::collections::BTreeSet;

use fixcommit_canonical::{CanonicalTree, FieldPath};
use tracing::debug;

use crate::errors::MerkleError;
use crate::hash::{empty_root, hash_pair, Hash32};
use crate::leaves::{enumerate_leaves, CommittedLeaf, Leaf};

/// A fully materialized tree, kept so proofs can be cut from it.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    leaves: Vec<CommittedLeaf>,
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Hashes, sorts, and combines `leaves`.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::DuplicateLeaf`] if two leaves share a path.
    pub fn build(leaves: &[Leaf]) -> Result<Self, MerkleError> {
        let mut seen = BTreeSet::new();
        for leaf in leaves {
            if !seen.insert(&leaf.path) {
                return Err(MerkleError::DuplicateLeaf {
                    path: leaf.path.clone(),
                });
            }
        }

        let mut committed: Vec<CommittedLeaf> = leaves.iter().map(Leaf::commit).collect();
        committed.sort_by(|a, b| a.path_encoding.cmp(&b.path_encoding));

        let mut levels = Vec::new();
        if !committed.is_empty() {
            let mut level: Vec<Hash32> = committed.iter().map(|l| l.digest).collect();
            while level.len() > 1 {
                let next = combine(&level);
                levels.push(level);
                level = next;
            }
            levels.push(level);
        }

        debug!(leaves = committed.len(), depth = levels.len(), "built merkle tree");
        Ok(Self {
            leaves: committed,
            levels,
        })
    }

    /// Builds the tree for every scalar in `tree`.
    pub fn from_canonical(tree: &CanonicalTree) -> Result<Self, MerkleError> {
        Self::build(&enumerate_leaves(tree))
    }

    /// The committed root.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_else(empty_root)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaves in commitment order.
    pub fn leaves(&self) -> &[CommittedLeaf] {
        &self.leaves
    }

    /// Node digests per level, leaves first and root last.
    pub fn levels(&self) -> &[Vec<Hash32>] {
        &self.levels
    }

    /// Index of the leaf at `path` in commitment order.
    pub fn position(&self, path: &FieldPath) -> Option<usize> {
        let key = path.encode();
        self.leaves
            .binary_search_by(|leaf| leaf.path_encoding.as_slice().cmp(key.as_slice()))
            .ok()
    }
}

fn combine(level: &[Hash32]) -> Vec<Hash32> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            // trailing odd node
            _ => pair[0],
        })
        .collect()
}

/// Computes only the root for `leaves`.
pub fn compute_root(leaves: &[Leaf]) -> Result<Hash32, MerkleError> {
    Ok(MerkleTree::build(leaves)?.root())
}
