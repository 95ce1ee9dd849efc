//! Verification service: checks a PKCS#1 v1.5 signature against a certificate.
//!
//! Used by the signing pipeline to refuse signatures that would not verify
//! once embedded, and by the CLI `verify` command.

use crate::domain::crypto::{CertificateChain, HashAlgorithm};
use crate::infra::error::{SigningError, SigningResult};
use openssl::rsa::Padding;
use openssl::sign::Verifier;
use openssl::x509::X509Ref;

/// Verify `signature` over `data` with the public key of `certificate`.
///
/// Returns `Ok(false)` for a well-formed but non-matching signature.
///
/// # Errors
/// Returns `CertificateError` if the certificate has no usable public key.
pub fn verify_signature(
    certificate: &X509Ref,
    data: &[u8],
    algorithm: HashAlgorithm,
    signature: &[u8],
) -> SigningResult<bool> {
    let public_key = certificate
        .public_key()
        .map_err(|e| SigningError::CertificateError(format!("Certificate public key: {e}")))?;
    let map = |e: openssl::error::ErrorStack| {
        SigningError::CertificateError(format!("Verifier setup failed: {e}"))
    };
    let mut verifier = Verifier::new(algorithm.message_digest(), &public_key).map_err(map)?;
    verifier.set_rsa_padding(Padding::PKCS1).map_err(map)?;
    verifier.update(data).map_err(map)?;
    // OpenSSL reports malformed signatures (wrong length etc.) as errors; both
    // mean "does not verify" to callers.
    Ok(verifier.verify(signature).unwrap_or(false))
}

/// Verify against the leaf of a chain.
///
/// # Errors
/// See [`verify_signature`].
pub fn verify_with_chain(
    chain: &CertificateChain,
    data: &[u8],
    algorithm: HashAlgorithm,
    signature: &[u8],
) -> SigningResult<bool> {
    verify_signature(chain.leaf(), data, algorithm, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::keystore::sign_pkcs1;
    use crate::test_support::TestIdentity;

    #[test]
    fn test_verify_rejects_wrong_digest() {
        let identity = TestIdentity::rsa("Verifier");
        let signature = sign_pkcs1(&identity.key, b"data", HashAlgorithm::Sha384).unwrap();

        assert!(verify_signature(&identity.certificate, b"data", HashAlgorithm::Sha384, &signature).unwrap());
        assert!(!verify_signature(&identity.certificate, b"data", HashAlgorithm::Sha256, &signature).unwrap());
        assert!(!verify_signature(&identity.certificate, b"other", HashAlgorithm::Sha384, &signature).unwrap());
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let signer = TestIdentity::rsa("Signer");
        let stranger = TestIdentity::rsa("Stranger");
        let signature = sign_pkcs1(&signer.key, b"data", HashAlgorithm::Sha256).unwrap();

        let chain = CertificateChain::new(vec![stranger.certificate.clone()]).unwrap();
        assert!(!verify_with_chain(&chain, b"data", HashAlgorithm::Sha256, &signature).unwrap());
    }

    #[test]
    fn test_truncated_signature_does_not_verify() {
        let identity = TestIdentity::rsa("Truncated");
        let signature = sign_pkcs1(&identity.key, b"data", HashAlgorithm::Sha256).unwrap();
        assert!(!verify_signature(
            &identity.certificate,
            b"data",
            HashAlgorithm::Sha256,
            &signature[..10]
        )
        .unwrap());
    }
}
