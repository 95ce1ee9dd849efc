//! Local certificate signer.
//!
//! Signs in-process with the RSA key from a password-protected PKCS#12 bundle.
//! The bundle is opened per operation and dropped afterwards. File reads and
//! RSA operations run on the blocking thread pool.

use super::keystore::{load_bundle, sign_pkcs1};
use super::signer::{ExternalSigner, SignerKind};
use crate::domain::crypto::{CertificateChain, HashAlgorithm};
use crate::domain::types::KeyBundleConfig;
use crate::infra::error::{SigningError, SigningResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Signer backed by a key bundle on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalCertificateSigner {
    bundle: KeyBundleConfig,
    public_certificate: Option<PathBuf>,
}

impl LocalCertificateSigner {
    #[must_use]
    pub fn new(bundle: KeyBundleConfig) -> Self {
        Self {
            bundle,
            public_certificate: None,
        }
    }

    /// Serve the chain from a separate public certificate file instead of the bundle.
    #[must_use]
    pub fn with_public_certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.public_certificate = Some(path.as_ref().to_path_buf());
        self
    }
}

/// Run key-bundle work off the async executor.
async fn run_blocking<T, F>(job: F) -> SigningResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SigningResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| SigningError::InternalError(format!("Local signing task failed: {e}")))?
}

#[async_trait]
impl ExternalSigner for LocalCertificateSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Local
    }

    async fn certificate_chain(&self) -> SigningResult<CertificateChain> {
        let bundle = self.bundle.clone();
        let public_certificate = self.public_certificate.clone();
        run_blocking(move || {
            // A chain is only useful if this signer can actually sign for it.
            let loaded = load_bundle(&bundle)?;
            match public_certificate {
                Some(path) => CertificateChain::load(&path),
                None => CertificateChain::new(loaded.chain()),
            }
        })
        .await
    }

    async fn sign_data(&self, data: &[u8], algorithm: HashAlgorithm) -> SigningResult<Vec<u8>> {
        let bundle = self.bundle.clone();
        let owned = data.to_vec();
        let signature = run_blocking(move || {
            let loaded = load_bundle(&bundle)?;
            sign_pkcs1(loaded.key(), &owned, algorithm)
        })
        .await?;
        log::debug!(
            "Local {algorithm} signature: {} bytes over {} bytes",
            signature.len(),
            data.len()
        );
        Ok(signature)
    }
}
