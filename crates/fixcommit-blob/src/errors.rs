//! Error types for blob store operations.

use fixcommit_core::{ContentDigest, ValidationError};
use thiserror::Error;

/// Errors that can occur during blob store operations.
#[derive(Error, Debug)]
pub enum BlobError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid file header (magic, version, or digest size).
    #[error("invalid blob store header: {0}")]
    InvalidHeader(String),
    /// A frame is cut short or declares a blob larger than the store allows.
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset where the frame starts.
        offset: u64,
        /// Reason for invalidity.
        reason: String,
    },
    /// Blob exceeds maximum size limit.
    #[error("blob size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual blob size.
        size: u64,
        /// Maximum allowed size.
        max: u32,
    },
    /// File has data but is too short to hold a header.
    #[error("file is not empty; cannot initialize header")]
    FileNotEmpty,
    /// Truncated record detected in strict mode.
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Byte offset where truncation occurred.
        offset: u64,
    },
    /// Stored bytes do not hash to the digest recorded beside them.
    #[error("digest mismatch at offset {offset}: expected {expected}")]
    DigestMismatch {
        /// Byte offset of the frame.
        offset: u64,
        /// Digest recorded in the frame.
        expected: ContentDigest,
    },
    /// No blob with the requested digest exists in the store.
    #[error("blob {0} not found")]
    NotFound(ContentDigest),
    /// A digest could not be converted to raw bytes.
    #[error("invalid digest: {0}")]
    Digest(#[from] ValidationError),
    /// A reference does not point at the blob it names.
    #[error("reference at offset {offset} does not match stored blob")]
    StaleReference {
        /// Offset named by the reference.
        offset: u64,
    },
}
