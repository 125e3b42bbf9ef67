//! Tree command implementation.

use fixcommit_canonical::canonicalize;

use crate::input::load_message;
use crate::output;
use crate::MessageArgs;

pub fn run(message: MessageArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (raw, schema, options) = load_message(&message)?;
    let (tree, _) = canonicalize(&raw, &schema, &options)?;
    println!("{}", output::format_json(&tree));
    Ok(())
}
