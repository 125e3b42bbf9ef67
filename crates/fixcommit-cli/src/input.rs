//! Reading messages, schemas, and documents from files or stdin.

use std::io::{self, Read};

use fixcommit_canonical::{ExtractOptions, Schema};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::MessageArgs;

/// Input errors, reported with the offending path.
#[derive(Error, Debug)]
pub enum InputError {
    /// File or stdin could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path, or `<stdin>`.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A JSON document could not be parsed.
    #[error("invalid {what} in {path}: {source}")]
    Json {
        /// What the document was expected to be.
        what: &'static str,
        /// File path, or `<stdin>`.
        path: String,
        /// Parse error.
        source: serde_json::Error,
    },
}

/// Reads a file, or all of stdin when `path` is `None`.
pub fn read_text(path: Option<&str>) -> Result<String, InputError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| InputError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

/// Reads and parses a JSON document.
pub fn read_json<T: DeserializeOwned>(path: Option<&str>, what: &'static str) -> Result<T, InputError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| InputError::Json {
        what,
        path: path.unwrap_or("<stdin>").to_string(),
        source,
    })
}

/// The message text, schema, and extraction options named by `args`.
pub fn load_message(args: &MessageArgs) -> Result<(String, Schema, ExtractOptions), InputError> {
    let schema = match &args.schema {
        Some(path) => read_json::<Schema>(Some(path), "schema")?,
        None => Schema::instrument(),
    };
    debug!(groups = schema.groups().count(), "loaded schema");
    let raw = read_text(args.input.as_deref())?;
    Ok((raw, schema, ExtractOptions::with_delimiter(args.delimiter)))
}
