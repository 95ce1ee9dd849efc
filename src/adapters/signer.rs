//! Signer adapter capability contract.
//!
//! Every adapter answers two questions for the document assembler: which
//! certificate chain verifies its signatures, and what the signature over a
//! given byte range is. Where the private key lives (local bundle, cloud
//! function, HTTP endpoint) is the adapter's business.

use crate::domain::crypto::{CertificateChain, HashAlgorithm};
use crate::infra::error::SigningResult;
use async_trait::async_trait;
use std::fmt;

/// Adapter variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    Local,
    Function,
    Http,
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerKind::Local => write!(f, "local certificate"),
            SignerKind::Function => write!(f, "cloud function"),
            SignerKind::Http => write!(f, "HTTP endpoint"),
        }
    }
}

/// External signer contract.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Adapter variant, for diagnostics.
    fn kind(&self) -> SignerKind;

    /// Load the public verification chain, leaf first.
    ///
    /// Never performs network I/O.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the certificate resource is missing or
    /// malformed.
    async fn certificate_chain(&self) -> SigningResult<CertificateChain>;

    /// Produce a PKCS#1 v1.5 signature over `data` under `algorithm`.
    ///
    /// Remote adapters issue exactly one network call and do not retry.
    ///
    /// # Errors
    /// Returns `SignatureError` when the signer answers with a failure or an
    /// unusable payload, `TransportError` when it cannot be reached, and
    /// `ConfigurationError` when local key material is unusable.
    async fn sign_data(&self, data: &[u8], algorithm: HashAlgorithm) -> SigningResult<Vec<u8>>;
}
