//! Signing pipeline used by document assemblers.
//!
//! Fetches the verification chain before asking for a signature, so a broken
//! certificate resource never costs a remote signing call, and refuses to
//! hand back a signature that is empty or (optionally) does not verify
//! against the chain leaf.

use crate::adapters::signer::ExternalSigner;
use crate::domain::crypto::{CertificateChain, RsaSignature};
use crate::domain::request::SigningRequest;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::verification::verify_with_chain;
use std::time::{Duration, Instant};

/// Pipeline options
#[derive(Debug, Clone, Copy)]
pub struct SigningOptions {
    /// Verify the signature against the chain leaf before returning it
    pub verify_signature: bool,
}

impl Default for SigningOptions {
    fn default() -> Self {
        Self {
            verify_signature: true,
        }
    }
}

/// Everything an assembler needs to embed a signature
#[derive(Debug)]
pub struct SignedData {
    pub signature: RsaSignature,
    pub chain: CertificateChain,
    pub duration: Duration,
}

/// Drives one signer through a signing request.
pub struct SigningPipeline<'a> {
    signer: &'a dyn ExternalSigner,
    options: SigningOptions,
}

impl<'a> SigningPipeline<'a> {
    #[must_use]
    pub fn new(signer: &'a dyn ExternalSigner, options: SigningOptions) -> Self {
        Self { signer, options }
    }

    /// Run the request through the signer.
    ///
    /// # Errors
    /// Propagates adapter errors unchanged. Returns `SignatureError` for an
    /// empty signature or one that fails verification.
    pub async fn sign(&self, request: &SigningRequest) -> SigningResult<SignedData> {
        let started = Instant::now();
        let algorithm = request.digest_algorithm();

        let chain = self.signer.certificate_chain().await?;
        log::debug!(
            "{} signer chain has {} certificate(s)",
            self.signer.kind(),
            chain.len()
        );

        let bytes = self
            .signer
            .sign_data(request.data_to_sign(), algorithm)
            .await?;

        if bytes.is_empty() {
            return Err(SigningError::SignatureError(format!(
                "{} signer returned an empty signature",
                self.signer.kind()
            )));
        }

        if self.options.verify_signature
            && !verify_with_chain(&chain, request.data_to_sign(), algorithm, &bytes)?
        {
            let subject = chain
                .describe()?
                .into_iter()
                .next()
                .map(|summary| summary.subject)
                .unwrap_or_default();
            return Err(SigningError::SignatureError(format!(
                "{algorithm} signature from {} signer does not verify against {subject}",
                self.signer.kind()
            )));
        }

        let duration = started.elapsed();
        log::info!(
            "Signed {} bytes via {} signer in {:.2?}",
            request.data_to_sign().len(),
            self.signer.kind(),
            duration
        );

        Ok(SignedData {
            signature: RsaSignature::new(algorithm, bytes),
            chain,
            duration,
        })
    }
}

/// Convenience wrapper around [`SigningPipeline::sign`].
///
/// # Errors
/// See [`SigningPipeline::sign`].
pub async fn sign_request(
    signer: &dyn ExternalSigner,
    request: &SigningRequest,
    options: SigningOptions,
) -> SigningResult<SignedData> {
    SigningPipeline::new(signer, options).sign(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::LocalCertificateSigner;
    use crate::adapters::signer::SignerKind;
    use crate::domain::crypto::HashAlgorithm;
    use crate::test_support::TestIdentity;
    use async_trait::async_trait;
    use openssl::x509::X509;
    use tempfile::TempDir;

    /// Signer returning a fixed answer with a fixed chain.
    struct FixedSigner {
        certificate: X509,
        signature: Vec<u8>,
    }

    #[async_trait]
    impl ExternalSigner for FixedSigner {
        fn kind(&self) -> SignerKind {
            SignerKind::Http
        }

        async fn certificate_chain(&self) -> SigningResult<CertificateChain> {
            CertificateChain::new(vec![self.certificate.clone()])
        }

        async fn sign_data(&self, _data: &[u8], _algorithm: HashAlgorithm) -> SigningResult<Vec<u8>> {
            Ok(self.signature.clone())
        }
    }

    #[tokio::test]
    async fn test_local_pipeline_verifies() {
        let dir = TempDir::new().unwrap();
        let identity = TestIdentity::rsa("John Doe");
        let signer = LocalCertificateSigner::new(identity.write_bundle(dir.path(), "johndoe"));
        let request = SigningRequest::new(vec![0u8; 32], HashAlgorithm::Sha512);

        let signed = sign_request(&signer, &request, SigningOptions::default())
            .await
            .unwrap();
        assert_eq!(signed.signature.algorithm(), HashAlgorithm::Sha512);
        assert_eq!(signed.signature.as_slice().len(), 256);
        assert_eq!(signed.chain.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_signature_rejected() {
        let identity = TestIdentity::rsa("Empty");
        let signer = FixedSigner {
            certificate: identity.certificate.clone(),
            signature: Vec::new(),
        };
        let request = SigningRequest::new(b"data".to_vec(), HashAlgorithm::Sha256);
        let options = SigningOptions {
            verify_signature: false,
        };

        let err = sign_request(&signer, &request, options).await.unwrap_err();
        assert!(matches!(err, SigningError::SignatureError(_)));
    }

    #[tokio::test]
    async fn test_non_verifying_signature_rejected() {
        let identity = TestIdentity::rsa("Mismatch");
        let signer = FixedSigner {
            certificate: identity.certificate.clone(),
            signature: vec![0x42; 256],
        };
        let request = SigningRequest::new(b"data".to_vec(), HashAlgorithm::Sha256);

        let err = sign_request(&signer, &request, SigningOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::SignatureError(_)));

        // Without verification the bytes pass through untouched.
        let signed = sign_request(
            &signer,
            &request,
            SigningOptions {
                verify_signature: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(signed.signature.as_slice(), &[0x42; 256][..]);
    }
}
