//! Prove command implementation.

use fixcommit_canonical::FieldPath;
use fixcommit_core::commit_message;

use crate::input::load_message;
use crate::output::{self, ProofDocument};
use crate::MessageArgs;

pub fn run(message: MessageArgs, path: String) -> Result<(), Box<dyn std::error::Error>> {
    let path: FieldPath = path
        .parse()
        .map_err(|e| format!("Invalid path: {}", e))?;
    let (raw, schema, options) = load_message(&message)?;
    let commitment = commit_message(&raw, &schema, &options)?;
    let proof = commitment.prove(&path)?;

    let document = ProofDocument {
        root: Some(commitment.root),
        proof,
    };
    println!("{}", output::format_json(&document));
    Ok(())
}
