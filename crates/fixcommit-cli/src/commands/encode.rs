//! Encode command implementation.

use fixcommit_canonical::{canonicalize, encode};

use crate::input::load_message;
use crate::output;
use crate::MessageArgs;

pub fn run(message: MessageArgs, report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (raw, schema, options) = load_message(&message)?;
    let (tree, extraction) = canonicalize(&raw, &schema, &options)?;
    let bytes = encode(&tree)?;

    if report {
        eprintln!("{}", output::format_report(&extraction));
    }
    println!("{}", hex::encode(bytes));
    Ok(())
}
