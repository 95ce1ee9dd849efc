//! Type-safe wrappers using new-type pattern

use crate::infra::error::{SigningError, SigningResult};
use std::fmt;
use std::path::{Path, PathBuf};

/// Passphrase protecting a PKCS#12 key bundle. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    #[must_use]
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }

    /// Read the passphrase from an environment variable.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the variable is unset.
    pub fn from_env(var: &str) -> SigningResult<Self> {
        std::env::var(var)
            .map(Self)
            .map_err(|_| SigningError::ConfigurationError(format!("{var} is not set")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(***)")
    }
}

/// Location of a password-protected PKCS#12 bundle holding an RSA private key.
#[derive(Debug, Clone)]
pub struct KeyBundleConfig {
    pub bundle_path: PathBuf,
    pub passphrase: Passphrase,
}

impl KeyBundleConfig {
    #[must_use]
    pub fn new(bundle_path: impl AsRef<Path>, passphrase: Passphrase) -> Self {
        Self {
            bundle_path: bundle_path.as_ref().to_path_buf(),
            passphrase,
        }
    }
}
