//! Commitments and descriptors for FIX instrument messages.
//!
//! This crate ties the pipeline together:
//! - [`commit_message`]: raw text to canonical bytes and a Merkle root
//! - [`Descriptor`]: the record published for a commitment
//! - [`ContentDigest`]: SHA-256 addressing for stored canonical bytes
//!
//! Core invariants:
//! - The root depends only on the set of business fields, never on input order
//! - Stored bytes recommit to the published root or are rejected
//!
#![deny(missing_docs)]

/// The commit pipeline.
pub mod commitment;
/// Published descriptor records.
pub mod descriptor;
/// Content digests.
pub mod digest;
/// Error types for core operations.
pub mod errors;
/// Validation errors for value types.
pub mod validation;

pub use commitment::{commit_encoded, commit_message, commit_tree, Commitment};
pub use descriptor::Descriptor;
pub use digest::{ContentDigest, DigestAlg};
pub use errors::CoreError;
pub use validation::ValidationError;
