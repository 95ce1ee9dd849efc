//! Certificate chain domain type.
//!
//! A `CertificateChain` is the leaf-first list of public certificates an
//! adapter hands to the document assembler for embedding and verification.
//! It never travels with a signing request.

use crate::infra::error::{SigningError, SigningResult};
use openssl::hash::MessageDigest;
use openssl::x509::X509;
use std::fmt;
use std::path::Path;

/// Ordered certificate chain, leaf first.
#[derive(Clone)]
pub struct CertificateChain {
    certs: Vec<X509>,
}

impl CertificateChain {
    /// Build a chain from certificates already in leaf-first order.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the list is empty.
    pub fn new(certs: Vec<X509>) -> SigningResult<Self> {
        if certs.is_empty() {
            return Err(SigningError::ConfigurationError(
                "Certificate chain is empty".to_string(),
            ));
        }
        Ok(Self { certs })
    }

    /// Parse one or more PEM certificates, or a single DER certificate.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the bytes hold no certificate.
    pub fn from_pem_or_der(bytes: &[u8]) -> SigningResult<Self> {
        let certs = if bytes.windows(11).any(|w| w == b"-----BEGIN ") {
            X509::stack_from_pem(bytes).map_err(|e| {
                SigningError::ConfigurationError(format!("Malformed PEM certificate: {e}"))
            })?
        } else {
            vec![X509::from_der(bytes).map_err(|e| {
                SigningError::ConfigurationError(format!("Malformed DER certificate: {e}"))
            })?]
        };
        Self::new(certs)
    }

    /// Load the public chain from a `.crt`/`.pem`/`.cer` file.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the file is missing or malformed.
    pub fn load(path: &Path) -> SigningResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to read certificate {}: {e}",
                path.display()
            ))
        })?;
        Self::from_pem_or_der(&bytes)
    }

    #[must_use]
    pub fn leaf(&self) -> &X509 {
        &self.certs[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Human-readable summary lines (subject, issuer, SHA-256 fingerprint).
    ///
    /// # Errors
    /// Returns `CertificateError` if a fingerprint cannot be computed or a
    /// name entry is not decodable text.
    pub fn describe(&self) -> SigningResult<Vec<CertificateSummary>> {
        self.certs.iter().map(CertificateSummary::from_x509).collect()
    }
}

impl fmt::Debug for CertificateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateChain(len={})", self.certs.len())
    }
}

/// Display-oriented facts about one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    pub sha256_fingerprint: String,
}

impl CertificateSummary {
    fn from_x509(cert: &X509) -> SigningResult<Self> {
        let fingerprint = cert
            .digest(MessageDigest::sha256())
            .map_err(|e| SigningError::CertificateError(format!("Fingerprint: {e}")))?;
        Ok(Self {
            subject: name_to_string(cert.subject_name())?,
            issuer: name_to_string(cert.issuer_name())?,
            sha256_fingerprint: hex::encode(fingerprint),
        })
    }
}

fn name_to_string(name: &openssl::x509::X509NameRef) -> SigningResult<String> {
    let parts = name
        .entries()
        .map(|entry| {
            let key = entry.object().nid().short_name().unwrap_or("?");
            let value = entry.data().to_string().map_err(|e| {
                SigningError::CertificateError(format!("Undecodable {key} name entry: {e}"))
            })?;
            Ok(format!("{key}={value}"))
        })
        .collect::<SigningResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}
