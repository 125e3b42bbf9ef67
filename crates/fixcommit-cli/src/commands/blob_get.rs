//! Blob-get command implementation.

use fixcommit_blob::{BlobReader, ReadMode};
use fixcommit_canonical::decode;
use fixcommit_core::{ContentDigest, Descriptor};

use crate::input::read_json;
use crate::output;

pub fn run(
    store: String,
    digest: String,
    descriptor: Option<String>,
    tree: bool,
    permissive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let digest: ContentDigest = digest
        .parse()
        .map_err(|e| format!("Invalid digest: {}", e))?;
    let mode = if permissive {
        ReadMode::Permissive
    } else {
        ReadMode::Strict
    };

    let mut reader = BlobReader::open(&store, mode)
        .map_err(|e| format!("Failed to open blob store {}: {}", store, e))?;
    let bytes = reader.fetch(&digest)?;

    if let Some(path) = descriptor {
        // accepts a bare descriptor or the full `commit` output
        let document: serde_json::Value = read_json(Some(&path), "descriptor")?;
        let record = document.get("descriptor").cloned().unwrap_or(document);
        let descriptor: Descriptor = serde_json::from_value(record)
            .map_err(|e| format!("Invalid descriptor in {}: {}", path, e))?;
        let commitment = descriptor.verify_blob(&bytes)?;
        eprintln!("descriptor matches: root {}", commitment.root);
    }

    if tree {
        println!("{}", output::format_json(&decode(&bytes)?));
    } else {
        println!("{}", hex::encode(&bytes));
    }
    Ok(())
}
