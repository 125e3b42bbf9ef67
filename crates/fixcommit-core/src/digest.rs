//! Content digests used to address stored canonical bytes.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::validation::ValidationError;

/// Supported content digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256.
    #[serde(rename = "sha-256")]
    Sha256,
}

impl DigestAlg {
    /// Wire name of the algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlg::Sha256 => "sha-256",
        }
    }
}

/// Algorithm plus digest bytes, encoded as base64url without padding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest {
    /// Digest algorithm.
    pub alg: DigestAlg,
    /// Base64URL (no padding) digest bytes.
    #[serde(rename = "b64")]
    pub b64: String,
}

impl ContentDigest {
    /// Constructs a validated digest.
    pub fn new(alg: DigestAlg, b64: impl Into<String>) -> Result<Self, ValidationError> {
        let b64 = b64.into();
        let re = Regex::new(r"^[A-Za-z0-9_-]{43}$").expect("invalid regex");
        if !re.is_match(&b64) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: b64,
            });
        }
        Ok(ContentDigest { alg, b64 })
    }

    /// SHA-256 of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        let hash = Sha256::digest(bytes);
        ContentDigest {
            alg: DigestAlg::Sha256,
            b64: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash),
        }
    }

    /// Whether `bytes` hash to this digest.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        *self == Self::of(bytes)
    }

    /// Raw digest bytes.
    pub fn to_bytes(&self) -> Result<[u8; 32], ValidationError> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&self.b64)
            .map_err(|_| ValidationError::PatternMismatch {
                field: "digest",
                value: self.b64.clone(),
            })?;
        decoded
            .try_into()
            .map_err(|bytes: Vec<u8>| ValidationError::OutOfBounds {
                field: "digest length",
                value: bytes.len().to_string(),
            })
    }

    /// Rebuilds a digest from its raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        ContentDigest {
            alg: DigestAlg::Sha256,
            b64: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes),
        }
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.as_str(), self.b64)
    }
}

impl FromStr for ContentDigest {
    type Err = ValidationError;

    /// Accepts `sha-256:<b64>` or a bare base64url digest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b64 = s.strip_prefix("sha-256:").unwrap_or(s);
        ContentDigest::new(DigestAlg::Sha256, b64)
    }
}
