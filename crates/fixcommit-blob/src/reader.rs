//! Blob store reader.

use crate::errors::BlobError;
use crate::frame::{BlobFrame, StoreHeader, FRAME_SIZE, HEADER_SIZE};
use fixcommit_core::ContentDigest;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::warn;

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Strict mode: truncated frames are errors.
    Strict,
    /// Permissive mode: truncation is treated as end-of-file.
    Permissive,
}

/// Location and identity of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// SHA-256 of the blob bytes.
    pub digest: ContentDigest,
    /// File offset of the blob's frame.
    pub offset: u64,
    /// Blob length, excluding the frame.
    pub len: u64,
}

/// Sequential reader over a blob store file.
///
/// Every blob returned has been checked against the digest stored in its
/// frame; a mismatch is reported as [`BlobError::DigestMismatch`] in both
/// read modes.
pub struct BlobReader {
    file: File,
    mode: ReadMode,
    position: u64,
}

impl BlobReader {
    /// Opens a store file and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] if the file cannot be opened or its header is invalid.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, BlobError> {
        let mut file = File::open(path)?;
        file.seek(io::SeekFrom::Start(0))?;
        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes)
            .map_err(|_| BlobError::InvalidHeader("file shorter than header".to_string()))?;
        StoreHeader::from_bytes(&header_bytes)?;

        Ok(Self {
            file,
            mode,
            position: HEADER_SIZE as u64,
        })
    }

    /// Current read position in the file.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Moves back to the first frame.
    pub fn rewind(&mut self) {
        self.position = HEADER_SIZE as u64;
    }

    /// Reads the next frame and the bytes it describes, unverified.
    ///
    /// Returns `Ok(None)` at end-of-file, or at a truncated record in permissive mode.
    pub fn read_frame(&mut self) -> Result<Option<(BlobFrame, u64, Vec<u8>)>, BlobError> {
        self.file.seek(io::SeekFrom::Start(self.position))?;

        let file_size = self.file.metadata()?.len();
        if self.position >= file_size {
            return Ok(None);
        }

        let offset = self.position;
        let mut frame_bytes = [0u8; FRAME_SIZE];
        if !self.fill(&mut frame_bytes, offset)? {
            return Ok(None);
        }
        let frame = BlobFrame::from_bytes(&frame_bytes, offset)?;

        let mut bytes = vec![0u8; frame.len as usize];
        if !self.fill(&mut bytes, offset)? {
            return Ok(None);
        }

        self.position = offset + FRAME_SIZE as u64 + u64::from(frame.len);
        Ok(Some((frame, offset, bytes)))
    }

    /// Reads exactly `buf.len()` bytes, mapping a short read by mode.
    fn fill(&mut self, buf: &mut [u8], offset: u64) -> Result<bool, BlobError> {
        match self.file.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if self.mode == ReadMode::Permissive {
                    warn!(offset, "ignoring truncated record");
                    return Ok(false);
                }
                Err(BlobError::TruncatedFrame { offset })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads and verifies the next blob.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::DigestMismatch`] if the bytes do not match their
    /// recorded digest, or any frame or I/O error.
    pub fn next_blob(&mut self) -> Result<Option<(BlobRef, Vec<u8>)>, BlobError> {
        match self.read_frame()? {
            None => Ok(None),
            Some((frame, offset, bytes)) => {
                let digest = frame.verify(&bytes, offset)?;
                let blob_ref = BlobRef {
                    digest,
                    offset,
                    len: bytes.len() as u64,
                };
                Ok(Some((blob_ref, bytes)))
            }
        }
    }

    /// Scans the store from the start for the blob with `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::NotFound`] if no stored blob has that digest.
    pub fn fetch(&mut self, digest: &ContentDigest) -> Result<Vec<u8>, BlobError> {
        self.rewind();
        while let Some((blob_ref, bytes)) = self.next_blob()? {
            if blob_ref.digest == *digest {
                return Ok(bytes);
            }
        }
        Err(BlobError::NotFound(digest.clone()))
    }

    /// Reads the blob a reference points at, without scanning.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::StaleReference`] if the frame at `blob_ref.offset`
    /// is not the referenced blob.
    pub fn get(&mut self, blob_ref: &BlobRef) -> Result<Vec<u8>, BlobError> {
        if blob_ref.offset < HEADER_SIZE as u64 {
            return Err(BlobError::StaleReference {
                offset: blob_ref.offset,
            });
        }
        self.position = blob_ref.offset;
        let (found, bytes) = self.next_blob()?.ok_or(BlobError::StaleReference {
            offset: blob_ref.offset,
        })?;
        if found != *blob_ref {
            return Err(BlobError::StaleReference {
                offset: blob_ref.offset,
            });
        }
        Ok(bytes)
    }
}
