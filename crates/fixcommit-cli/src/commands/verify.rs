//! Verify command implementation.

use fixcommit_merkle::Hash32;

use crate::input::read_json;
use crate::output::ProofDocument;

pub fn run(proof: Option<String>, root: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let document: ProofDocument = read_json(proof.as_deref(), "proof")?;

    let root = match root {
        Some(hex) => hex
            .parse::<Hash32>()
            .map_err(|e| format!("Invalid root: {}", e))?,
        None => document
            .root
            .ok_or("proof document has no root; pass --root")?,
    };

    let proof = &document.proof;
    if !proof.verify(&root) {
        return Err(format!("proof for {} does not verify against {}", proof.path, root).into());
    }
    println!(
        "VALID {} = {:?}",
        proof.path,
        String::from_utf8_lossy(&proof.value)
    );
    Ok(())
}
