use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cbor;

/// Integer sequence addressing one scalar location in a canonical tree.
///
/// `[tag]` addresses a top-level scalar, `[group, entry, tag]` a field inside
/// a group entry; nested groups extend the sequence in the same pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<u64>);

impl FieldPath {
    /// The empty path, addressing the root mapping itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: u64) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Path segments from the root inward.
    pub fn segments(&self) -> &[u64] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical encoding of the path as an array of unsigned integers.
    ///
    /// This is the `pathEncoding` hashed into every Merkle leaf, and is
    /// independent of the tree the path was taken from.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.0.len() * 3);
        cbor::write_head(&mut out, cbor::MAJOR_ARRAY, self.0.len() as u64);
        for segment in &self.0 {
            cbor::write_head(&mut out, cbor::MAJOR_UNSIGNED, *segment);
        }
        out
    }
}

impl From<Vec<u64>> for FieldPath {
    fn from(segments: Vec<u64>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[u64; N]> for FieldPath {
    fn from(segments: [u64; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "root");
        }
        let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Error returned when a dotted path string cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path segment '{0}'")]
pub struct ParsePathError(String);

impl FromStr for FieldPath {
    type Err = ParsePathError;

    /// Parses `453.0.448` (or `453/0/448`) into a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
        if trimmed.is_empty() {
            return Err(ParsePathError(s.to_string()));
        }
        trimmed
            .split(['.', '/', ','])
            .map(|part| {
                part.trim()
                    .parse::<u64>()
                    .map_err(|_| ParsePathError(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_short_paths_inline() {
        assert_eq!(FieldPath::from([15]).encode(), vec![0x81, 0x0f]);
    }

    #[test]
    fn encodes_tags_above_23_with_one_byte_argument() {
        // [223] -> array(1), uint(223)
        assert_eq!(FieldPath::from([223]).encode(), vec![0x81, 0x18, 0xdf]);
        // [453, 0, 448] -> array(3), uint16(453), 0, uint16(448)
        assert_eq!(
            FieldPath::from([453, 0, 448]).encode(),
            vec![0x83, 0x19, 0x01, 0xc5, 0x00, 0x19, 0x01, 0xc0]
        );
    }

    #[test]
    fn parses_dotted_and_bracketed_forms() {
        let expected = FieldPath::from([453, 0, 448]);
        assert_eq!("453.0.448".parse::<FieldPath>().unwrap(), expected);
        assert_eq!("[453,0,448]".parse::<FieldPath>().unwrap(), expected);
        assert_eq!("453/0/448".parse::<FieldPath>().unwrap(), expected);
        assert!("453.x".parse::<FieldPath>().is_err());
        assert!("".parse::<FieldPath>().is_err());
    }

    #[test]
    fn displays_dotted() {
        assert_eq!(FieldPath::from([453, 1, 452]).to_string(), "453.1.452");
        assert_eq!(FieldPath::root().to_string(), "root");
    }
}
