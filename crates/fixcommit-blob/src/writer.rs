//! Blob store writer.

use crate::errors::BlobError;
use crate::frame::{BlobFrame, StoreHeader, FRAME_SIZE, HEADER_SIZE};
use crate::reader::{BlobReader, BlobRef, ReadMode};
use fixcommit_core::ContentDigest;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Options for blob store writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
    /// Whether to keep existing blobs (default: true). When false the store
    /// is truncated back to its header.
    pub append: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
            append: true,
        }
    }
}

/// Append-only writer for content-addressed blobs.
///
/// Blobs already present in the file are indexed on open, so appending
/// bytes that are already stored writes nothing and returns the existing
/// [`BlobRef`].
pub struct BlobWriter {
    file: File,
    sync: bool,
    end: u64,
    index: HashMap<ContentDigest, BlobRef>,
}

impl BlobWriter {
    /// Opens or creates a store file for writing.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError`] if:
    /// - the file cannot be opened or created
    /// - the file has data but no valid header
    /// - an existing blob is truncated or fails its digest check
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, BlobError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(options.create)
            .write(true)
            .read(true)
            .open(path)?;

        let mut writer = Self {
            file,
            sync: options.sync,
            end: HEADER_SIZE as u64,
            index: HashMap::new(),
        };

        let len = writer.file.metadata()?.len();
        if len == 0 {
            writer.write_header()?;
        } else if len < HEADER_SIZE as u64 {
            return Err(BlobError::FileNotEmpty);
        } else if options.append {
            writer.load_index(path)?;
            writer.end = len;
        } else {
            BlobReader::open(path, ReadMode::Strict)?;
            writer.file.set_len(HEADER_SIZE as u64)?;
        }

        writer.file.seek(io::SeekFrom::Start(writer.end))?;
        Ok(writer)
    }

    fn write_header(&mut self) -> Result<(), BlobError> {
        self.file.write_all(&StoreHeader::new().to_bytes())?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    fn load_index(&mut self, path: &Path) -> Result<(), BlobError> {
        let mut reader = BlobReader::open(path, ReadMode::Strict)?;
        while let Some((blob_ref, _)) = reader.next_blob()? {
            self.index.entry(blob_ref.digest.clone()).or_insert(blob_ref);
        }
        debug!(blobs = self.index.len(), "indexed blob store");
        Ok(())
    }

    /// Stores `bytes`, or returns the reference to an identical stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::PayloadTooLarge`] past
    /// [`MAX_BLOB_SIZE`](crate::frame::MAX_BLOB_SIZE), or an I/O error.
    pub fn append(&mut self, bytes: &[u8]) -> Result<BlobRef, BlobError> {
        let digest = ContentDigest::of(bytes);
        if let Some(existing) = self.index.get(&digest) {
            debug!(%digest, offset = existing.offset, "blob already stored");
            return Ok(existing.clone());
        }

        let frame = BlobFrame::for_blob(bytes)?;
        let offset = self.end;

        self.file.write_all(&frame.to_bytes())?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }

        self.end += (FRAME_SIZE + bytes.len()) as u64;
        let blob_ref = BlobRef {
            digest: digest.clone(),
            offset,
            len: bytes.len() as u64,
        };
        debug!(%digest, offset, len = bytes.len(), "stored blob");
        self.index.insert(digest, blob_ref.clone());
        Ok(blob_ref)
    }

    /// Whether a blob with `digest` is already stored.
    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.index.contains_key(digest)
    }

    /// Number of distinct blobs in the store.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Finishes writing and closes the file.
    pub fn finish(mut self) -> Result<(), BlobError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for BlobWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}
