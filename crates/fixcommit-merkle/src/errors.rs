use fixcommit_canonical::FieldPath;
use thiserror::Error;

/// Errors raised while committing to leaves or producing proofs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// No leaf exists at the requested path.
    #[error("no field at path {path}")]
    PathNotFound {
        /// Requested path.
        path: FieldPath,
    },
    /// Two leaves share a path; leaf sets must address distinct fields.
    #[error("duplicate leaf at path {path}")]
    DuplicateLeaf {
        /// Repeated path.
        path: FieldPath,
    },
    /// A digest string was not 32 bytes of hex.
    #[error("invalid digest '{0}'")]
    InvalidDigest(String),
}
