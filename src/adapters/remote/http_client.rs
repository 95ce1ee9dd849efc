//! HTTP endpoint signer.
//!
//! Posts the raw bytes to sign to a signing endpoint and takes the response
//! body verbatim as the signature.

use super::protocol::{DIGEST_ALGORITHM_QUERY, OCTET_STREAM};
use crate::adapters::signer::{ExternalSigner, SignerKind};
use crate::domain::crypto::{CertificateChain, HashAlgorithm};
use crate::infra::error::{SigningError, SigningResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Configuration for an HTTP signing endpoint.
#[derive(Debug, Clone)]
pub struct HttpSignerConfig {
    /// Full endpoint URL (e.g. `http://localhost:7062/api/ExternalSign`).
    pub url: String,
    /// Public certificate matching the endpoint's private key.
    pub public_certificate: PathBuf,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to verify TLS certificates (should be true in production).
    pub verify_tls: bool,
}

impl HttpSignerConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, public_certificate: impl AsRef<Path>) -> Self {
        Self {
            url: url.into(),
            public_certificate: public_certificate.as_ref().to_path_buf(),
            timeout_secs: 30,
            verify_tls: true,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Disable TLS verification (for testing only!).
    #[must_use]
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }
}

/// Signer that posts to an HTTP signing endpoint.
pub struct HttpEndpointSigner {
    config: HttpSignerConfig,
    client: reqwest::Client,
}

impl HttpEndpointSigner {
    /// Create a new HTTP endpoint signer.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: HttpSignerConfig) -> SigningResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(concat!("external-signer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SigningError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ExternalSigner for HttpEndpointSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Http
    }

    async fn certificate_chain(&self) -> SigningResult<CertificateChain> {
        CertificateChain::load(&self.config.public_certificate)
    }

    async fn sign_data(&self, data: &[u8], algorithm: HashAlgorithm) -> SigningResult<Vec<u8>> {
        let response = self
            .client
            .post(&self.config.url)
            .query(&[(DIGEST_ALGORITHM_QUERY, algorithm.wire_name())])
            .header("Content-Type", OCTET_STREAM)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| {
                SigningError::TransportError(format!(
                    "Failed to reach signing endpoint {}: {e}",
                    self.config.url
                ))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            SigningError::TransportError(format!("Failed to read signing response: {e}"))
        })?;

        if !status.is_success() {
            return Err(SigningError::SignatureError(format!(
                "Signing endpoint returned {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        if body.is_empty() {
            return Err(SigningError::SignatureError(
                "Signing endpoint returned an empty signature".to_string(),
            ));
        }

        log::debug!(
            "Endpoint {} returned {} byte {algorithm} signature",
            self.config.url,
            body.len()
        );
        Ok(body.to_vec())
    }
}
