//! Merkle commitments over canonical FIX trees.
//!
//! Every scalar in a [`CanonicalTree`](fixcommit_canonical::CanonicalTree)
//! becomes one leaf hashed as `keccak256(pathEncoding ‖ value)`. Leaves are
//! sorted by path encoding and folded pairwise into a single root that an
//! on-chain verifier can check proofs against.
//!
#![deny(missing_docs)]

/// Error types for commitment and proof operations.
pub mod errors;
/// Keccak-256 digests.
pub mod hash;
/// Leaf enumeration and hashing.
pub mod leaves;
/// Inclusion proofs.
pub mod proof;
/// Tree construction.
pub mod tree;

pub use errors::MerkleError;
pub use hash::{empty_root, hash_pair, keccak256, Hash32, HASH_LEN};
pub use leaves::{enumerate_leaves, leaf_digest, CommittedLeaf, Leaf};
pub use proof::{generate_proof, verify, verify_encoded, Proof};
pub use tree::{compute_root, MerkleTree};
