//! Inclusion proofs and their verification.
//!
//! A proof lists sibling digests from the leaf level upward. For each
//! sibling, `directions[i]` is `true` when the node being proven is the
//! right child at that level, so the parent is `H(sibling ‖ current)`;
//! `false` means `H(current ‖ sibling)`. Levels at which the node was the
//! promoted odd tail contribute no entry.

use fixcommit_canonical::FieldPath;
use serde::{Deserialize, Serialize};

use crate::errors::MerkleError;
use crate::hash::{hash_pair, Hash32};
use crate::leaves::{leaf_digest, Leaf};
use crate::tree::MerkleTree;

/// Evidence that `(path, value)` is one of the leaves under some root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Path of the proven field.
    pub path: FieldPath,
    /// Raw value bytes of the proven field.
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
    /// Sibling digests, leaf level first.
    pub siblings: Vec<Hash32>,
    /// One flag per sibling; `true` when the proven node is the right child.
    pub directions: Vec<bool>,
}

impl Proof {
    /// Checks this proof against `root`.
    pub fn verify(&self, root: &Hash32) -> bool {
        verify(root, &self.path, &self.value, &self.siblings, &self.directions)
    }

    /// Value as text, if it is valid UTF-8.
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

impl MerkleTree {
    /// Produces the inclusion proof for the leaf at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MerkleError::PathNotFound`] if no leaf has that path.
    pub fn prove(&self, path: &FieldPath) -> Result<Proof, MerkleError> {
        let mut index = self
            .position(path)
            .ok_or_else(|| MerkleError::PathNotFound { path: path.clone() })?;
        let leaf = &self.leaves()[index];

        let mut siblings = Vec::new();
        let mut directions = Vec::new();
        let levels = self.levels();
        for level in &levels[..levels.len().saturating_sub(1)] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                siblings.push(level[sibling]);
                directions.push(index % 2 == 1);
            }
            index /= 2;
        }

        Ok(Proof {
            path: leaf.path.clone(),
            value: leaf.value.clone(),
            siblings,
            directions,
        })
    }
}

/// Builds the tree for `leaves` and proves the one at `path`.
pub fn generate_proof(leaves: &[Leaf], path: &FieldPath) -> Result<Proof, MerkleError> {
    MerkleTree::build(leaves)?.prove(path)
}

/// Verifies that `(path, value)` is committed under `root`.
///
/// Returns `false` on any mismatch, including sibling and direction lists
/// of different lengths.
pub fn verify(
    root: &Hash32,
    path: &FieldPath,
    value: &[u8],
    siblings: &[Hash32],
    directions: &[bool],
) -> bool {
    verify_encoded(root, &path.encode(), value, siblings, directions)
}

/// As [`verify`], with the path already encoded.
pub fn verify_encoded(
    root: &Hash32,
    path_encoding: &[u8],
    value: &[u8],
    siblings: &[Hash32],
    directions: &[bool],
) -> bool {
    if siblings.len() != directions.len() {
        return false;
    }
    let computed = siblings
        .iter()
        .zip(directions)
        .fold(leaf_digest(path_encoding, value), |current, (sibling, is_right)| {
            if *is_right {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            }
        });
    computed == *root
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u64) -> Vec<Leaf> {
        (1..=n).map(|tag| Leaf::new([tag], format!("v{tag}"))).collect()
    }

    #[test]
    fn every_leaf_proves_for_sizes_one_through_nine() {
        for n in 1..=9 {
            let set = leaves(n);
            let tree = MerkleTree::build(&set).unwrap();
            let root = tree.root();
            for leaf in &set {
                let proof = tree.prove(&leaf.path).unwrap();
                assert!(proof.verify(&root), "n={n} path={}", leaf.path);
            }
        }
    }

    #[test]
    fn single_leaf_proof_is_empty() {
        let tree = MerkleTree::build(&leaves(1)).unwrap();
        let proof = tree.prove(&FieldPath::from([1])).unwrap();
        assert!(proof.siblings.is_empty());
        assert!(proof.directions.is_empty());
        assert!(proof.verify(&tree.root()));
    }

    #[test]
    fn promoted_leaf_skips_its_lonely_level() {
        let tree = MerkleTree::build(&leaves(3)).unwrap();
        let proof = tree.prove(&FieldPath::from([3])).unwrap();
        assert_eq!(proof.siblings.len(), 1);
        assert_eq!(proof.directions, vec![true]);
    }

    #[test]
    fn directions_follow_position() {
        let tree = MerkleTree::build(&leaves(4)).unwrap();
        let first = tree.prove(&FieldPath::from([1])).unwrap();
        assert_eq!(first.directions, vec![false, false]);
        let last = tree.prove(&FieldPath::from([4])).unwrap();
        assert_eq!(last.directions, vec![true, true]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let tree = MerkleTree::build(&leaves(2)).unwrap();
        assert!(matches!(
            tree.prove(&FieldPath::from([99])),
            Err(MerkleError::PathNotFound { .. })
        ));
    }

    #[test]
    fn mismatched_lengths_fail_verification() {
        let tree = MerkleTree::build(&leaves(4)).unwrap();
        let proof = tree.prove(&FieldPath::from([2])).unwrap();
        let mut directions = proof.directions.clone();
        directions.pop();
        assert!(!verify(
            &tree.root(),
            &proof.path,
            &proof.value,
            &proof.siblings,
            &directions
        ));
    }

    #[test]
    fn flipped_direction_fails_verification() {
        let tree = MerkleTree::build(&leaves(4)).unwrap();
        let mut proof = tree.prove(&FieldPath::from([2])).unwrap();
        proof.directions[0] = !proof.directions[0];
        assert!(!proof.verify(&tree.root()));
    }

    #[test]
    fn proof_json_uses_hex_strings() {
        let tree = MerkleTree::build(&leaves(2)).unwrap();
        let proof = tree.prove(&FieldPath::from([1])).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["path"], serde_json::json!([1]));
        assert_eq!(json["value"], "7631");
        assert!(json["siblings"][0].as_str().unwrap().starts_with("0x"));
        let back: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }
}
