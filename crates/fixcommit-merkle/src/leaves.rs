//! Leaf enumeration: one `(path, value)` pair per present scalar.

use fixcommit_canonical::{CanonicalEntry, CanonicalNode, CanonicalTree, FieldPath};
use serde::{Deserialize, Serialize};

use crate::hash::{keccak256, Hash32};

/// A scalar field addressed by its path, before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Location of the field.
    pub path: FieldPath,
    /// Raw UTF-8 bytes of the scalar.
    pub value: Vec<u8>,
}

impl Leaf {
    /// Creates a leaf from a path and a text value.
    pub fn new(path: impl Into<FieldPath>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into().into_bytes(),
        }
    }

    /// Encodes the path and hashes the leaf.
    pub fn commit(&self) -> CommittedLeaf {
        let path_encoding = self.path.encode();
        let digest = leaf_digest(&path_encoding, &self.value);
        CommittedLeaf {
            path: self.path.clone(),
            path_encoding,
            value: self.value.clone(),
            digest,
        }
    }
}

/// A leaf together with its path encoding and digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedLeaf {
    /// Location of the field.
    pub path: FieldPath,
    /// Canonical encoding of `path`; the sort key for leaf ordering.
    pub path_encoding: Vec<u8>,
    /// Raw scalar bytes.
    pub value: Vec<u8>,
    /// `keccak256(path_encoding ‖ value)`.
    pub digest: Hash32,
}

/// Leaf digest: `keccak256(path_encoding ‖ value)`, no extra framing.
pub fn leaf_digest(path_encoding: &[u8], value: &[u8]) -> Hash32 {
    keccak256(&[path_encoding, value])
}

/// Walks `tree` and returns one leaf per scalar field.
///
/// Leaves come out in tree traversal order; callers must not rely on it,
/// since the Merkle builder re-sorts by path encoding.
pub fn enumerate_leaves(tree: &CanonicalTree) -> Vec<Leaf> {
    let mut leaves = Vec::new();
    walk(tree.root(), &FieldPath::root(), &mut leaves);
    leaves
}

fn walk(entry: &CanonicalEntry, prefix: &FieldPath, out: &mut Vec<Leaf>) {
    for (tag, node) in entry.iter() {
        let path = prefix.child(u64::from(tag));
        match node {
            CanonicalNode::Scalar(value) => out.push(Leaf {
                path,
                value: value.as_bytes().to_vec(),
            }),
            CanonicalNode::Group(entries) => {
                for (index, child) in entries.iter().enumerate() {
                    walk(child, &path.child(index as u64), out);
                }
            }
        }
    }
}
