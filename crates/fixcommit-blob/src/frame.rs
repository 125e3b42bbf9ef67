//! On-disk layout of a blob store.
//!
//! A store is an 8-byte [`StoreHeader`] followed by records. Each record is
//! a 36-byte [`BlobFrame`] (blob length, then the raw SHA-256 of the blob)
//! and the blob bytes themselves:
//!
//! ```text
//! "FXB1" version:u16le digest_size:u16le
//! len:u32le sha256[32] bytes[len]
//! len:u32le sha256[32] bytes[len]
//! ...
//! ```

use crate::errors::BlobError;
use fixcommit_core::ContentDigest;

/// Store file magic bytes: `b"FXB1"`.
pub const MAGIC: &[u8; 4] = b"FXB1";

/// Current store format version.
pub const VERSION: u16 = 0x0002;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 8;

/// Size of the raw SHA-256 digest recorded for every blob.
pub const DIGEST_SIZE: usize = 32;

/// Blob frame size in bytes: length plus digest.
pub const FRAME_SIZE: usize = 4 + DIGEST_SIZE;

/// Largest blob a frame may describe: 16 MiB.
pub const MAX_BLOB_SIZE: u32 = 16 * 1024 * 1024;

/// Store file header: magic, format version, and the digest width every
/// frame uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    /// Format version.
    pub version: u16,
}

impl StoreHeader {
    /// Header for the current format.
    pub fn new() -> Self {
        Self { version: VERSION }
    }

    /// Serializes the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&(DIGEST_SIZE as u16).to_le_bytes());
        bytes
    }

    /// Parses and validates a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlobError> {
        let Some(bytes) = bytes.get(..HEADER_SIZE) else {
            return Err(BlobError::InvalidHeader(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        };
        if &bytes[0..4] != MAGIC {
            return Err(BlobError::InvalidHeader(format!(
                "invalid magic: {:?}, expected {:?}",
                &bytes[0..4],
                MAGIC
            )));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(BlobError::InvalidHeader(format!(
                "unsupported version: 0x{version:04x}, expected 0x{VERSION:04x}"
            )));
        }
        let digest_size = u16::from_le_bytes([bytes[6], bytes[7]]);
        if usize::from(digest_size) != DIGEST_SIZE {
            return Err(BlobError::InvalidHeader(format!(
                "digest size {digest_size}, expected {DIGEST_SIZE}"
            )));
        }
        Ok(Self { version })
    }
}

impl Default for StoreHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame preceding each stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobFrame {
    /// Blob length in bytes.
    pub len: u32,
    /// Raw SHA-256 of the blob.
    pub digest: [u8; DIGEST_SIZE],
}

impl BlobFrame {
    /// Frame describing `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::PayloadTooLarge`] past [`MAX_BLOB_SIZE`].
    pub fn for_blob(bytes: &[u8]) -> Result<Self, BlobError> {
        let size = bytes.len() as u64;
        if size > u64::from(MAX_BLOB_SIZE) {
            return Err(BlobError::PayloadTooLarge {
                size,
                max: MAX_BLOB_SIZE,
            });
        }
        Ok(Self {
            len: size as u32,
            digest: ContentDigest::of(bytes).to_bytes()?,
        })
    }

    /// The recorded digest.
    pub fn content_digest(&self) -> ContentDigest {
        ContentDigest::from_bytes(&self.digest)
    }

    /// Serializes the frame.
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut bytes = [0u8; FRAME_SIZE];
        bytes[0..4].copy_from_slice(&self.len.to_le_bytes());
        bytes[4..].copy_from_slice(&self.digest);
        bytes
    }

    /// Parses the frame found at file `offset`.
    pub fn from_bytes(bytes: &[u8], offset: u64) -> Result<Self, BlobError> {
        let Some(bytes) = bytes.get(..FRAME_SIZE) else {
            return Err(BlobError::InvalidFrame {
                offset,
                reason: format!("frame too short: {} bytes", bytes.len()),
            });
        };
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if len > MAX_BLOB_SIZE {
            return Err(BlobError::InvalidFrame {
                offset,
                reason: format!("blob size {len} exceeds maximum {MAX_BLOB_SIZE}"),
            });
        }
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&bytes[4..]);
        Ok(Self { len, digest })
    }

    /// Checks that `bytes` are the blob this frame describes.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::DigestMismatch`] naming the frame `offset`.
    pub fn verify(&self, bytes: &[u8], offset: u64) -> Result<ContentDigest, BlobError> {
        let expected = self.content_digest();
        if bytes.len() as u64 != u64::from(self.len) || !expected.matches(bytes) {
            return Err(BlobError::DigestMismatch { offset, expected });
        }
        Ok(expected)
    }
}
