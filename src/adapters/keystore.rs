//! PKCS#12 key bundle access and the RSA PKCS#1 v1.5 signing primitive.
//!
//! Bundles are read from disk on every call; nothing here caches key
//! material, so callers can share a `KeyBundleConfig` freely across threads.

use crate::domain::crypto::HashAlgorithm;
use crate::domain::types::KeyBundleConfig;
use crate::infra::error::{SigningError, SigningResult};
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{Id, PKey, Private};
use openssl::rsa::Padding;
use openssl::sign::Signer;
use openssl::x509::X509;

/// Decrypted contents of a key bundle.
pub struct LoadedBundle {
    key: PKey<Private>,
    certificate: Option<X509>,
    ca: Vec<X509>,
}

impl LoadedBundle {
    #[must_use]
    pub fn key(&self) -> &PKey<Private> {
        &self.key
    }

    /// Leaf certificate followed by any bundled CA certificates.
    #[must_use]
    pub fn chain(&self) -> Vec<X509> {
        self.certificate
            .iter()
            .chain(self.ca.iter())
            .cloned()
            .collect()
    }
}

/// Read and decrypt a bundle, requiring an RSA private key.
///
/// # Errors
/// Returns `ConfigurationError` if the file is missing or unreadable, the
/// passphrase is wrong, or the bundle has no RSA private key.
pub fn load_bundle(config: &KeyBundleConfig) -> SigningResult<LoadedBundle> {
    let path = &config.bundle_path;
    let raw = std::fs::read(path).map_err(|e| {
        SigningError::ConfigurationError(format!(
            "Failed to read key bundle {}: {e}",
            path.display()
        ))
    })?;

    let parsed = Pkcs12::from_der(&raw)
        .and_then(|p12| p12.parse2(config.passphrase.as_str()))
        .map_err(|e| {
            SigningError::ConfigurationError(format!(
                "Failed to open key bundle {} (wrong passphrase or malformed): {e}",
                path.display()
            ))
        })?;

    let key = parsed.pkey.ok_or_else(|| {
        SigningError::ConfigurationError(format!(
            "Key bundle {} does not contain a private key",
            path.display()
        ))
    })?;

    if key.id() != Id::RSA {
        return Err(SigningError::ConfigurationError(format!(
            "Key bundle {} does not contain an RSA private key (found {:?})",
            path.display(),
            key.id()
        )));
    }

    let ca = parsed
        .ca
        .map(|stack| stack.into_iter().collect())
        .unwrap_or_default();

    log::debug!(
        "Loaded key bundle {} ({} bit RSA key)",
        path.display(),
        key.bits()
    );

    Ok(LoadedBundle {
        key,
        certificate: parsed.cert,
        ca,
    })
}

/// Hash `data` with `algorithm` and sign it with PKCS#1 v1.5 padding.
///
/// # Errors
/// Returns `SignatureError` if OpenSSL rejects the key or input.
pub fn sign_pkcs1(
    key: &PKey<Private>,
    data: &[u8],
    algorithm: HashAlgorithm,
) -> SigningResult<Vec<u8>> {
    let map = |e: openssl::error::ErrorStack| {
        SigningError::SignatureError(format!("RSA {algorithm} signing failed: {e}"))
    };
    let mut signer = Signer::new(algorithm.message_digest(), key).map_err(map)?;
    signer.set_rsa_padding(Padding::PKCS1).map_err(map)?;
    signer.update(data).map_err(map)?;
    signer.sign_to_vec().map_err(map)
}
