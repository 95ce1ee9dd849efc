//! Digest algorithm domain type.
//!
//! Provides the `HashAlgorithm` enumeration (SHA-256, SHA-384, SHA-512) applied
//! to the data before PKCS#1 v1.5 RSA signing. Two parsing policies exist:
//! strict `FromStr` for operator input (CLI and config files) and the lenient
//! wire selector used by the signing service, which defaults to SHA-256.

use crate::infra::error::SigningError;
use openssl::hash::MessageDigest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// Lowercase name used in configuration files and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Name carried on the wire (`DigestAlgorithm` field / `digestAlgorithm` query).
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "Sha256",
            HashAlgorithm::Sha384 => "Sha384",
            HashAlgorithm::Sha512 => "Sha512",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    #[must_use]
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            HashAlgorithm::Sha256 => MessageDigest::sha256(),
            HashAlgorithm::Sha384 => MessageDigest::sha384(),
            HashAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }

    /// Resolve a wire selector. Only the exact strings `"Sha384"` and `"Sha512"`
    /// select those digests; everything else, including `None`, is SHA-256.
    #[must_use]
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("Sha384") => HashAlgorithm::Sha384,
            Some("Sha512") => HashAlgorithm::Sha512,
            Some("Sha256") | Some("") | None => HashAlgorithm::Sha256,
            Some(other) => {
                log::warn!("Unrecognized digest algorithm selector {other:?}, using Sha256");
                HashAlgorithm::Sha256
            }
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(SigningError::InvalidInput(format!(
                "Unsupported digest algorithm: {s} (expected sha256, sha384 or sha512)"
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
