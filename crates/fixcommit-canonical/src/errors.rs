//! Error types for extraction, schema validation, and canonical decoding.

use thiserror::Error;

use crate::path::FieldPath;
use crate::schema::GroupScope;

/// Errors raised while extracting fields, building trees, or encoding them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// The same tag appeared twice within one mapping.
    #[error("duplicate field {tag} at {scope}")]
    DuplicateField {
        /// Offending tag.
        tag: u32,
        /// Group scope the duplicate was found in (`root` for top level).
        scope: GroupScope,
    },
    /// A field referenced a group that the schema does not declare at that position.
    #[error("unknown group reference {group_tag} (parent: {})", display_parent(.parent))]
    UnknownGroupReference {
        /// Referenced group count tag.
        group_tag: u32,
        /// Enclosing group, if any.
        parent: Option<u32>,
    },
    /// A group count field did not carry a non-negative integer.
    #[error("group count field {tag} has invalid value '{value}'")]
    InvalidGroupCount {
        /// Group count tag.
        tag: u32,
        /// Offending value.
        value: String,
    },
    /// The entries present did not match the count field.
    #[error("group {group_tag} at {scope} declared {declared} entries but {found} were present")]
    GroupCountMismatch {
        /// Group count tag.
        group_tag: u32,
        /// Scope enclosing the group.
        scope: GroupScope,
        /// Declared entry count.
        declared: usize,
        /// Entries actually found.
        found: usize,
    },
    /// Sorted-key or definite-length invariant was broken.
    #[error("encoding invariant violated at {path}: {reason}")]
    EncodingInvariantViolation {
        /// Location of the violation.
        path: FieldPath,
        /// What was violated.
        reason: String,
    },
}

fn display_parent(parent: &Option<u32>) -> String {
    match parent {
        Some(tag) => tag.to_string(),
        None => "root".to_string(),
    }
}

/// Errors raised when a schema definition is inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two group definitions share a count tag.
    #[error("group {0} is defined more than once")]
    DuplicateGroup(u32),
    /// A nested group names a parent that is not defined.
    #[error("group {group_tag} names undefined parent {parent}")]
    UnknownParent {
        /// Nested group.
        group_tag: u32,
        /// Missing parent.
        parent: u32,
    },
    /// A delimiter tag is itself a group count tag.
    #[error("group {group_tag} uses group tag {delimiter} as its delimiter")]
    DelimiterIsGroup {
        /// Group being defined.
        group_tag: u32,
        /// Offending delimiter.
        delimiter: u32,
    },
    /// The parent chain of a group loops back on itself.
    #[error("group {0} is nested inside itself")]
    CyclicNesting(u32),
    /// Tag zero is not addressable.
    #[error("tag 0 is not a valid {0}")]
    ZeroTag(&'static str),
}

/// Errors raised by the strict canonical decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input ended before the current item was complete.
    #[error("unexpected end of input at offset {offset}")]
    Truncated {
        /// Byte offset where more input was expected.
        offset: usize,
    },
    /// An item had a major type not allowed at this position.
    #[error("unexpected major type {major} at offset {offset}, expected {expected}")]
    UnexpectedType {
        /// Byte offset of the item head.
        offset: usize,
        /// Major type found.
        major: u8,
        /// What the decoder expected.
        expected: &'static str,
    },
    /// Indefinite lengths and reserved additional-information values are rejected.
    #[error("unsupported additional information {info} at offset {offset}")]
    UnsupportedLength {
        /// Byte offset of the item head.
        offset: usize,
        /// Additional-information bits.
        info: u8,
    },
    /// A text string was not valid UTF-8.
    #[error("invalid UTF-8 text at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset of the string payload.
        offset: usize,
    },
    /// Groups were nested deeper than [`crate::decoder::MAX_DEPTH`].
    #[error("group nesting deeper than {max} levels at offset {offset}")]
    TooDeep {
        /// Byte offset of the group that exceeded the limit.
        offset: usize,
        /// Deepest nesting accepted.
        max: usize,
    },
    /// Bytes remained after the root map.
    #[error("{remaining} trailing bytes after root map")]
    TrailingBytes {
        /// Count of unconsumed bytes.
        remaining: usize,
    },
    /// Input decoded but was not in canonical form.
    #[error(transparent)]
    NonCanonical(#[from] CanonicalError),
}
