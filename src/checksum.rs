//! Schema fingerprints for validation reports

use sha2::{Sha256, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 fingerprint of the text a schema was loaded from.
///
/// Two reports with the same fingerprint were produced against byte-identical
/// schema sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from source text
    pub fn of_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Verify that source text matches this checksum
    pub fn verify(&self, content: &str) -> bool {
        *self == Self::of_text(content)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
