//! The end-to-end pipeline: raw message to committed root.

use fixcommit_canonical::{
    canonicalize, decode, encode, CanonicalTree, ExtractOptions, ExtractionReport, FieldPath,
    Schema,
};
use fixcommit_merkle::{Hash32, MerkleTree, Proof};
use tracing::{debug, info};

use crate::errors::CoreError;

/// Everything produced by committing to one message.
#[derive(Debug, Clone)]
pub struct Commitment {
    /// Canonical tree of business fields.
    pub tree: CanonicalTree,
    /// Canonical encoding of `tree`.
    pub encoded: Vec<u8>,
    /// Merkle root over the tree's leaves.
    pub root: Hash32,
    /// Number of committed leaves.
    pub leaf_count: usize,
    /// What extraction dropped or excluded. Empty when built from a tree.
    pub report: ExtractionReport,
    merkle: MerkleTree,
}

impl Commitment {
    /// Inclusion proof for the field at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Merkle`] if no field exists at `path`.
    pub fn prove(&self, path: &FieldPath) -> Result<Proof, CoreError> {
        Ok(self.merkle.prove(path)?)
    }

    /// The Merkle tree the root was computed from.
    pub fn merkle(&self) -> &MerkleTree {
        &self.merkle
    }

    /// Canonical bytes as lowercase hex.
    pub fn encoded_hex(&self) -> String {
        hex::encode(&self.encoded)
    }
}

/// Canonicalizes `raw`, encodes it, and commits to its leaves.
///
/// # Errors
///
/// Propagates extraction, tree building, and encoding failures.
pub fn commit_message(
    raw: &str,
    schema: &Schema,
    options: &ExtractOptions,
) -> Result<Commitment, CoreError> {
    let (tree, report) = canonicalize(raw, schema, options)?;
    let mut commitment = commit_tree(tree)?;
    commitment.report = report;
    info!(
        root = %commitment.root,
        leaves = commitment.leaf_count,
        bytes = commitment.encoded.len(),
        "committed message"
    );
    Ok(commitment)
}

/// Commits to an already built tree.
pub fn commit_tree(tree: CanonicalTree) -> Result<Commitment, CoreError> {
    let encoded = encode(&tree)?;
    let merkle = MerkleTree::from_canonical(&tree)?;
    debug!(leaves = merkle.leaf_count(), "computed merkle root");
    Ok(Commitment {
        root: merkle.root(),
        leaf_count: merkle.leaf_count(),
        tree,
        encoded,
        report: ExtractionReport::default(),
        merkle,
    })
}

/// Decodes stored canonical bytes and commits to them again.
///
/// # Errors
///
/// Returns [`CoreError::Decode`] if `bytes` are not canonical.
pub fn commit_encoded(bytes: &[u8]) -> Result<Commitment, CoreError> {
    let tree = decode(bytes)?;
    commit_tree(tree)
}
