//! Canonicalization primitives for FIX descriptors.
//!
//! This crate provides the first three pipeline stages:
//! - [`extract`]: raw `tag=value` text to [`RawField`]s, session fields removed
//! - [`build_tree`]: fields plus a [`Schema`] to a [`CanonicalTree`]
//! - [`encode`]: a tree to deterministic CBOR bytes (and [`decode`] back)
//!
//! Every function here is pure. The same input always produces the same
//! output, and the bytes produced by [`encode`] are the only bytes a
//! commitment may be computed over.
//!
#![deny(missing_docs)]

/// Deterministic CBOR head and cursor primitives.
pub mod cbor;
/// Strict decoding of canonical bytes.
pub mod decoder;
/// Canonical encoding of trees.
pub mod encoder;
/// Error types for canonicalization.
pub mod errors;
/// Raw field extraction.
pub mod extract;
/// Integer paths addressing scalar fields.
pub mod path;
/// Extraction reports.
pub mod report;
/// Group-membership schemas.
pub mod schema;
/// Canonical tree model and builder.
pub mod tree;

pub use decoder::decode;
pub use encoder::encode;
pub use errors::{CanonicalError, DecodeError, SchemaError};
pub use extract::{extract, Delimiter, ExtractOptions, Extraction, RawField, SESSION_TAGS};
pub use path::{FieldPath, ParsePathError};
pub use report::{ExtractionReport, ExtractionStatus, ExtractionWarning, FixVersion, WarningCode};
pub use schema::{GroupDef, GroupPosition, GroupScope, Schema, SchemaBuilder};
pub use tree::{build_tree, CanonicalEntry, CanonicalNode, CanonicalTree};

/// Extracts, builds, and returns the canonical tree for `input` in one call.
///
/// # Errors
///
/// Propagates any [`CanonicalError`] from extraction or tree building.
pub fn canonicalize(
    input: &str,
    schema: &Schema,
    options: &ExtractOptions,
) -> Result<(CanonicalTree, ExtractionReport), CanonicalError> {
    let extraction = extract(input, schema, options)?;
    let tree = build_tree(&extraction.fields, schema)?;
    Ok((tree, extraction.report))
}
