//! Append-only, content-addressed storage for canonical descriptor bytes.
//!
//! This crate provides:
//! - A store file of length- and digest-framed blobs behind an `FXB1` header
//! - A writer that deduplicates by SHA-256 content digest
//! - A reader with strict and permissive truncation handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fixcommit_blob::{BlobReader, BlobWriter, ReadMode, WriteOptions};
//!
//! let mut writer = BlobWriter::open("descriptors.fxb", WriteOptions::default())?;
//! let blob_ref = writer.append(&[0xa1, 0x0f, 0x63, 0x55, 0x53, 0x44])?;
//! writer.finish()?;
//!
//! let mut reader = BlobReader::open("descriptors.fxb", ReadMode::Strict)?;
//! let bytes = reader.fetch(&blob_ref.digest)?;
//! assert_eq!(bytes.len(), 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Error types for blob store operations.
pub mod errors;
/// Store header and blob frame layout.
pub mod frame;
/// Blob store reader.
pub mod reader;
/// Blob store writer.
pub mod writer;

pub use errors::BlobError;
pub use frame::{BlobFrame, StoreHeader};
pub use reader::{BlobReader, BlobRef, ReadMode};
pub use writer::{BlobWriter, WriteOptions};
