//! Output formatting utilities.

use fixcommit_blob::BlobRef;
use fixcommit_canonical::ExtractionReport;
use fixcommit_core::Descriptor;
use fixcommit_merkle::{CommittedLeaf, Hash32, Proof};
use serde::{Deserialize, Serialize};

/// Pretty JSON, or `{}` if the value cannot be serialized.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// One committed leaf as printed by `leaves --json`.
#[derive(Debug, Serialize)]
pub struct LeafRow {
    /// Dotted path.
    pub path: String,
    /// Path encoding, hex.
    pub path_encoding: String,
    /// Value as text.
    pub value: String,
    /// Leaf digest.
    pub digest: Hash32,
}

impl From<&CommittedLeaf> for LeafRow {
    fn from(leaf: &CommittedLeaf) -> Self {
        Self {
            path: leaf.path.to_string(),
            path_encoding: hex::encode(&leaf.path_encoding),
            value: String::from_utf8_lossy(&leaf.value).into_owned(),
            digest: leaf.digest,
        }
    }
}

/// Formats a leaf as a table row.
pub fn format_leaf_row(leaf: &CommittedLeaf) -> String {
    format!(
        "{:<24} {:<24} {}",
        truncate(&leaf.path.to_string(), 24),
        truncate(&String::from_utf8_lossy(&leaf.value), 24),
        leaf.digest
    )
}

/// Prints the leaf table header.
#[allow(clippy::print_literal)]
pub fn print_leaf_header() {
    println!("{:<24} {:<24} {}", "PATH", "VALUE", "DIGEST");
    println!("{}", "-".repeat(116));
}

/// Output of `commit`.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    /// Merkle root.
    pub root: Hash32,
    /// Number of committed leaves.
    pub leaf_count: usize,
    /// Published descriptor record.
    pub descriptor: Descriptor,
    /// Where the bytes were stored, with `--store`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<BlobRef>,
}

/// A proof together with the root it was cut from.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProofDocument {
    /// Root the proof verifies against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Hash32>,
    /// The inclusion proof.
    #[serde(flatten)]
    pub proof: Proof,
}

/// One line per dropped pair, for stderr.
pub fn format_report(report: &ExtractionReport) -> String {
    let mut lines = vec![format!(
        "status: {:?}, excluded: {:?}",
        report.status, report.excluded
    )];
    for warning in &report.warnings {
        lines.push(format!(
            "  #{} {:?}: {}",
            warning.index, warning.code, warning.raw
        ));
    }
    lines.join("\n")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
