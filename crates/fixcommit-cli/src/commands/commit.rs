//! Commit command implementation.

use fixcommit_blob::{BlobWriter, WriteOptions};
use fixcommit_core::{commit_message, Descriptor};
use fixcommit_merkle::Hash32;
use tracing::info;

use crate::input::load_message;
use crate::output::{self, CommitOutput};
use crate::MessageArgs;

pub fn run(
    message: MessageArgs,
    store: Option<String>,
    dict_hash: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (raw, schema, options) = load_message(&message)?;
    let commitment = commit_message(&raw, &schema, &options)?;

    let dict_hash = match dict_hash {
        Some(hex) => hex
            .parse::<Hash32>()
            .map_err(|e| format!("Invalid dictionary hash: {}", e))?,
        None => Hash32::default(),
    };
    let mut descriptor = Descriptor::new(&commitment, dict_hash);

    let blob = match store {
        Some(path) => {
            let mut writer = BlobWriter::open(&path, WriteOptions::default())
                .map_err(|e| format!("Failed to open blob store {}: {}", path, e))?;
            let blob_ref = writer.append(&commitment.encoded)?;
            writer.finish()?;
            info!(store = %path, offset = blob_ref.offset, "stored canonical bytes");
            descriptor = descriptor.with_blob(blob_ref.digest.clone());
            Some(blob_ref)
        }
        None => None,
    };

    let out = CommitOutput {
        root: commitment.root,
        leaf_count: commitment.leaf_count,
        descriptor,
        blob,
    };
    println!("{}", output::format_json(&out));
    Ok(())
}
