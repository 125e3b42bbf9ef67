//! Strict decoder for canonical bytes.
//!
//! Accepts exactly what [`crate::encode`] produces. Anything else, including
//! valid-but-non-canonical CBOR, is rejected, so `encode(decode(b)) == b` for
//! every accepted input.

use crate::cbor::{self, Cursor, Head};
use crate::errors::{CanonicalError, DecodeError};
use crate::path::FieldPath;
use crate::tree::{CanonicalEntry, CanonicalNode, CanonicalTree};

/// Deepest group nesting [`decode`] accepts.
pub const MAX_DEPTH: usize = 64;

/// Decodes canonical bytes back into a tree.
///
/// # Errors
///
/// Returns [`DecodeError`] for malformed input, and
/// [`DecodeError::NonCanonical`] wrapping an
/// [`CanonicalError::EncodingInvariantViolation`] for well-formed CBOR that is
/// not in canonical form. Groups nested more than [`MAX_DEPTH`] levels give
/// [`DecodeError::TooDeep`].
pub fn decode(bytes: &[u8]) -> Result<CanonicalTree, DecodeError> {
    let mut cursor = Cursor::new(bytes);
    let root = decode_entry(&mut cursor, &FieldPath::root(), 0)?;
    if cursor.remaining() > 0 {
        return Err(DecodeError::TrailingBytes {
            remaining: cursor.remaining(),
        });
    }
    Ok(CanonicalTree::new(root))
}

fn violation(path: &FieldPath, reason: &str) -> DecodeError {
    DecodeError::NonCanonical(CanonicalError::EncodingInvariantViolation {
        path: path.clone(),
        reason: reason.to_string(),
    })
}

fn expect_head(
    cursor: &mut Cursor<'_>,
    major: u8,
    expected: &'static str,
    path: &FieldPath,
) -> Result<Head, DecodeError> {
    let head = cursor.read_head()?;
    if head.major != major {
        return Err(DecodeError::UnexpectedType {
            offset: head.offset,
            major: head.major,
            expected,
        });
    }
    if !head.minimal {
        return Err(violation(path, "non-minimal length or integer encoding"));
    }
    Ok(head)
}

fn decode_entry(
    cursor: &mut Cursor<'_>,
    path: &FieldPath,
    depth: usize,
) -> Result<CanonicalEntry, DecodeError> {
    let map = expect_head(cursor, cbor::MAJOR_MAP, "map", path)?;
    let mut entry = CanonicalEntry::new();
    let mut previous: Option<u32> = None;

    for _ in 0..map.argument {
        let key = expect_head(cursor, cbor::MAJOR_UNSIGNED, "unsigned tag", path)?;
        let tag = u32::try_from(key.argument)
            .map_err(|_| violation(path, "tag exceeds 32 bits"))?;
        let node_path = path.child(key.argument);
        if previous.is_some_and(|p| p >= tag) {
            return Err(violation(&node_path, "map keys not strictly ascending"));
        }
        previous = Some(tag);

        let node = decode_node(cursor, &node_path, depth)?;
        entry.insert(tag, node);
    }
    Ok(entry)
}

fn decode_node(
    cursor: &mut Cursor<'_>,
    path: &FieldPath,
    depth: usize,
) -> Result<CanonicalNode, DecodeError> {
    let head = cursor.read_head()?;
    if !head.minimal {
        return Err(violation(path, "non-minimal length encoding"));
    }
    match head.major {
        cbor::MAJOR_TEXT => {
            let offset = cursor.position();
            let len = usize::try_from(head.argument)
                .map_err(|_| DecodeError::Truncated { offset })?;
            let raw = cursor.take(len)?;
            let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { offset })?;
            Ok(CanonicalNode::Scalar(text.to_string()))
        }
        cbor::MAJOR_ARRAY => {
            if head.argument == 0 {
                return Err(violation(path, "empty group"));
            }
            if depth >= MAX_DEPTH {
                return Err(DecodeError::TooDeep {
                    offset: head.offset,
                    max: MAX_DEPTH,
                });
            }
            let mut entries = Vec::new();
            for index in 0..head.argument {
                let child_path = path.child(index);
                let child = decode_entry(cursor, &child_path, depth + 1)?;
                if child.is_empty() {
                    return Err(violation(&child_path, "empty group entry"));
                }
                entries.push(child);
            }
            Ok(CanonicalNode::Group(entries))
        }
        major => Err(DecodeError::UnexpectedType {
            offset: head.offset,
            major,
            expected: "text or array",
        }),
    }
}
