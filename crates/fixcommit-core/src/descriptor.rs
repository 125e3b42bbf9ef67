//! The record an issuer publishes for a committed instrument.

use fixcommit_canonical::FixVersion;
use fixcommit_merkle::Hash32;
use serde::{Deserialize, Serialize};

use crate::commitment::{commit_encoded, Commitment};
use crate::digest::ContentDigest;
use crate::errors::CoreError;

/// Published commitment record.
///
/// `dict_hash` identifies the tag dictionary used to render the fields; it
/// is carried through untouched and never affects the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// FIX major version, `0` when the message carried none.
    ///
    /// This is the application version: ApplVerID (1128) wins over a
    /// `FIXT.1.1` BeginString, which would only name the session layer.
    pub fix_major: u8,
    /// FIX minor version, `0` when the message carried none.
    pub fix_minor: u8,
    /// Digest of the rendering dictionary.
    pub dict_hash: Hash32,
    /// Merkle root over the canonical tree.
    pub root: Hash32,
    /// Where the canonical bytes are stored, if they were stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_ref: Option<ContentDigest>,
    /// Length of the canonical bytes.
    pub blob_len: u64,
}

impl Descriptor {
    /// Describes `commitment`. The FIX version comes from its extraction report.
    pub fn new(commitment: &Commitment, dict_hash: Hash32) -> Self {
        let (fix_major, fix_minor) = commitment
            .report
            .fix_version
            .map(|FixVersion { major, minor }| (major, minor))
            .unwrap_or((0, 0));
        Self {
            fix_major,
            fix_minor,
            dict_hash,
            root: commitment.root,
            blob_ref: None,
            blob_len: commitment.encoded.len() as u64,
        }
    }

    /// Records where the canonical bytes were stored.
    pub fn with_blob(mut self, blob_ref: ContentDigest) -> Self {
        self.blob_ref = Some(blob_ref);
        self
    }

    /// Checks fetched bytes against this descriptor and recommits to them.
    ///
    /// # Errors
    ///
    /// - [`CoreError::LengthMismatch`] if the length differs from `blob_len`
    /// - [`CoreError::BlobDigestMismatch`] if `blob_ref` is set and does not match
    /// - [`CoreError::Decode`] if the bytes are not canonical
    /// - [`CoreError::RootMismatch`] if the bytes commit to another root
    pub fn verify_blob(&self, bytes: &[u8]) -> Result<Commitment, CoreError> {
        let actual = bytes.len() as u64;
        if actual != self.blob_len {
            return Err(CoreError::LengthMismatch {
                expected: self.blob_len,
                actual,
            });
        }
        if let Some(blob_ref) = &self.blob_ref {
            if !blob_ref.matches(bytes) {
                return Err(CoreError::BlobDigestMismatch(blob_ref.to_string()));
            }
        }
        let commitment = commit_encoded(bytes)?;
        if commitment.root != self.root {
            return Err(CoreError::RootMismatch {
                expected: self.root,
                actual: commitment.root,
            });
        }
        Ok(commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::commit_message;
    use fixcommit_canonical::{ExtractOptions, Schema};

    fn commitment(msg: &str) -> Commitment {
        commit_message(msg, &Schema::instrument(), &ExtractOptions::default()).unwrap()
    }

    #[test]
    fn version_defaults_to_zero_without_begin_string() {
        let d = Descriptor::new(&commitment("15=USD"), Hash32::default());
        assert_eq!((d.fix_major, d.fix_minor), (0, 0));
        let d = Descriptor::new(&commitment("8=FIXT.1.1|15=USD"), Hash32::default());
        assert_eq!((d.fix_major, d.fix_minor), (1, 1));
    }

    #[test]
    fn verify_blob_accepts_original_bytes() {
        let c = commitment("8=FIX.4.4|15=USD|223=4.250");
        let d = Descriptor::new(&c, Hash32::default()).with_blob(ContentDigest::of(&c.encoded));
        assert_eq!(d.verify_blob(&c.encoded).unwrap().root, c.root);
    }

    #[test]
    fn verify_blob_rejects_other_bytes() {
        let c = commitment("15=USD|223=4.250");
        let other = commitment("15=USD|223=4.251");
        let d = Descriptor::new(&c, Hash32::default());
        assert!(matches!(
            d.verify_blob(&other.encoded),
            Err(CoreError::RootMismatch { .. })
        ));
        let stored = d.clone().with_blob(ContentDigest::of(&c.encoded));
        assert!(matches!(
            stored.verify_blob(&other.encoded),
            Err(CoreError::BlobDigestMismatch(_))
        ));
        assert!(matches!(
            d.verify_blob(&c.encoded[..c.encoded.len() - 1]),
            Err(CoreError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn json_omits_missing_blob_ref() {
        let d = Descriptor::new(&commitment("15=USD"), Hash32::default());
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("blob_ref").is_none());
        assert_eq!(json["blob_len"], 6);
        assert!(json["root"].as_str().unwrap().starts_with("0x"));
        let back: Descriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
