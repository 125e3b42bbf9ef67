//! Leaves command implementation.

use fixcommit_canonical::canonicalize;
use fixcommit_merkle::MerkleTree;

use crate::input::load_message;
use crate::output::{self, LeafRow};
use crate::MessageArgs;

pub fn run(message: MessageArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (raw, schema, options) = load_message(&message)?;
    let (tree, _) = canonicalize(&raw, &schema, &options)?;
    let merkle = MerkleTree::from_canonical(&tree)?;

    if json {
        let rows: Vec<LeafRow> = merkle.leaves().iter().map(LeafRow::from).collect();
        println!("{}", output::format_json(&rows));
    } else {
        output::print_leaf_header();
        for leaf in merkle.leaves() {
            println!("{}", output::format_leaf_row(leaf));
        }
        println!("\nRoot: {} ({} leaves)", merkle.root(), merkle.leaf_count());
    }
    Ok(())
}
