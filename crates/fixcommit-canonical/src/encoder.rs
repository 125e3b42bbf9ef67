//! Canonical encoder: canonical tree to deterministic CBOR bytes.
//!
//! - every mapping is a definite-length map with unsigned keys in ascending order
//! - scalars are definite-length text strings, verbatim
//! - groups are definite-length arrays of maps, in entry order
//! - no tags, floats, or indefinite lengths are ever emitted

use crate::cbor;
use crate::errors::CanonicalError;
use crate::path::FieldPath;
use crate::tree::{CanonicalEntry, CanonicalNode, CanonicalTree};

/// Encodes `tree` into its canonical byte form.
///
/// # Errors
///
/// Returns [`CanonicalError::EncodingInvariantViolation`] if the tree contains
/// an empty group or an empty group entry; absence is represented by omission,
/// never by an empty container.
pub fn encode(tree: &CanonicalTree) -> Result<Vec<u8>, CanonicalError> {
    let mut out = Vec::new();
    encode_entry(&mut out, tree.root(), &FieldPath::root())?;
    Ok(out)
}

fn encode_entry(
    out: &mut Vec<u8>,
    entry: &CanonicalEntry,
    path: &FieldPath,
) -> Result<(), CanonicalError> {
    cbor::write_head(out, cbor::MAJOR_MAP, entry.len() as u64);
    let mut previous: Option<u32> = None;
    for (tag, node) in entry.iter() {
        if previous.is_some_and(|p| p >= tag) {
            return Err(CanonicalError::EncodingInvariantViolation {
                path: path.child(u64::from(tag)),
                reason: "map keys not strictly ascending".to_string(),
            });
        }
        previous = Some(tag);

        cbor::write_head(out, cbor::MAJOR_UNSIGNED, u64::from(tag));
        let node_path = path.child(u64::from(tag));
        match node {
            CanonicalNode::Scalar(value) => cbor::write_text(out, value),
            CanonicalNode::Group(entries) => {
                if entries.is_empty() {
                    return Err(CanonicalError::EncodingInvariantViolation {
                        path: node_path,
                        reason: "empty group".to_string(),
                    });
                }
                cbor::write_head(out, cbor::MAJOR_ARRAY, entries.len() as u64);
                for (index, child) in entries.iter().enumerate() {
                    let child_path = node_path.child(index as u64);
                    if child.is_empty() {
                        return Err(CanonicalError::EncodingInvariantViolation {
                            path: child_path,
                            reason: "empty group entry".to_string(),
                        });
                    }
                    encode_entry(out, child, &child_path)?;
                }
            }
        }
    }
    Ok(())
}
