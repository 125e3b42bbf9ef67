//! Extraction report: dropped pairs, excluded session tags, counters, and
//! the FIX version the message declares.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Overall outcome of an extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    /// Every pair was well formed.
    Clean,
    /// Some pairs were dropped; inspect the warnings.
    Lossy,
}

/// Stable code describing why a pair was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarningCode {
    /// The pair had no `=` separator.
    MissingEquals,
    /// The tag was not a positive integer.
    InvalidTag,
    /// The value was empty.
    EmptyValue,
}

impl WarningCode {
    /// Metric key counting occurrences of this code.
    pub fn metric(self) -> &'static str {
        match self {
            WarningCode::MissingEquals => "missing_equals",
            WarningCode::InvalidTag => "invalid_tag",
            WarningCode::EmptyValue => "empty_value",
        }
    }
}

/// One dropped pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// Zero-based position of the pair in the input.
    pub index: usize,
    /// Why it was dropped.
    pub code: WarningCode,
    /// The raw text of the pair.
    pub raw: String,
}

/// Application protocol version of a message.
///
/// Read from BeginString (8), or from ApplVerID (1128) when present, since
/// a `FIXT.1.1` BeginString names only the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixVersion {
    /// Major version (`4` in `FIX.4.4`).
    pub major: u8,
    /// Minor version (`4` in `FIX.4.4`).
    pub minor: u8,
}

impl FixVersion {
    /// Parses `FIX.4.4`, `FIXT.1.1` or `FIX.5.0SP2` style strings.
    pub fn parse(begin_string: &str) -> Option<Self> {
        let mut parts = begin_string.split('.');
        let prefix = parts.next()?;
        if prefix != "FIX" && prefix != "FIXT" {
            return None;
        }
        let major = parts.next()?.parse().ok()?;
        let minor_raw = parts.next()?;
        let digits: String = minor_raw.chars().take_while(char::is_ascii_digit).collect();
        let minor = digits.parse().ok()?;
        Some(Self { major, minor })
    }
}

impl FixVersion {
    /// Maps an ApplVerID enumeration value (`6` is FIX 4.4, `9` is FIX 5.0 SP2).
    ///
    /// Service packs are not recorded, so `7`, `8` and `9` all give 5.0.
    pub fn from_appl_ver_id(value: &str) -> Option<Self> {
        let (major, minor) = match value {
            "0" => (2, 7),
            "1" => (3, 0),
            "2" => (4, 0),
            "3" => (4, 1),
            "4" => (4, 2),
            "5" => (4, 3),
            "6" => (4, 4),
            "7" | "8" | "9" => (5, 0),
            _ => return None,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for FixVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Report produced alongside extracted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Overall status.
    pub status: ExtractionStatus,
    /// Dropped pairs, in input order.
    pub warnings: Vec<ExtractionWarning>,
    /// Session/transport tags that were present and removed.
    pub excluded: Vec<u32>,
    /// Counters such as `pairs_seen` and per-warning totals.
    pub metrics: BTreeMap<String, u64>,
    /// Version from BeginString, when present and recognised.
    pub fix_version: Option<FixVersion>,
}

impl Default for ExtractionReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionReport {
    pub(crate) fn new() -> Self {
        Self {
            status: ExtractionStatus::Clean,
            warnings: Vec::new(),
            excluded: Vec::new(),
            metrics: BTreeMap::new(),
            fix_version: None,
        }
    }

    pub(crate) fn bump(&mut self, key: &str) {
        self.metrics
            .entry(key.to_string())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    pub(crate) fn warn(&mut self, index: usize, code: WarningCode, raw: &str) {
        self.status = ExtractionStatus::Lossy;
        self.bump(code.metric());
        self.warnings.push(ExtractionWarning {
            index,
            code,
            raw: raw.to_string(),
        });
    }
}
