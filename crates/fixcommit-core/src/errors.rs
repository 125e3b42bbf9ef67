use fixcommit_canonical::{CanonicalError, DecodeError};
use fixcommit_merkle::{Hash32, MerkleError};
use thiserror::Error;

use crate::validation::ValidationError;

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Extraction or tree building failed.
    #[error("canonicalization failed: {0}")]
    Canonical(#[from] CanonicalError),
    /// Stored bytes are not a canonical encoding.
    #[error("decoding failed: {0}")]
    Decode(#[from] DecodeError),
    /// Commitment or proof generation failed.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),
    /// A value failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Recomputed root differs from the descriptor's root.
    #[error("root mismatch: descriptor has {expected}, bytes commit to {actual}")]
    RootMismatch {
        /// Root recorded in the descriptor.
        expected: Hash32,
        /// Root recomputed from the bytes.
        actual: Hash32,
    },
    /// Byte length differs from the descriptor's `blob_len`.
    #[error("blob length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length recorded in the descriptor.
        expected: u64,
        /// Length of the supplied bytes.
        actual: u64,
    },
    /// Bytes do not hash to the descriptor's `blob_ref`.
    #[error("blob digest mismatch for {0}")]
    BlobDigestMismatch(String),
}
