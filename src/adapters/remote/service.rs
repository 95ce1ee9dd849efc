//! Remote signing service request handling.
//!
//! The service holds only the location of a key bundle and its passphrase.
//! Each request opens the bundle, signs, and drops the key again, so one
//! `SigningService` can be shared by any number of concurrent callers.

use super::protocol::{encode_signature_payload, FunctionSignRequest, DEFAULT_FUNCTION_NAME};
use crate::adapters::keystore::{load_bundle, sign_pkcs1};
use crate::domain::crypto::HashAlgorithm;
use crate::domain::types::KeyBundleConfig;
use crate::infra::error::{SigningError, SigningResult};
use std::time::Instant;

/// Stateless signing request handler.
#[derive(Debug)]
pub struct SigningService {
    bundle: KeyBundleConfig,
    function_name: String,
    start_time: Instant,
}

impl SigningService {
    #[must_use]
    pub fn new(bundle: KeyBundleConfig) -> Self {
        Self {
            bundle,
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            start_time: Instant::now(),
        }
    }

    /// Name under which the function transport answers invocations.
    #[must_use]
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Open the bundle once to fail fast on startup misconfiguration.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the bundle is unusable.
    pub fn check_ready(&self) -> SigningResult<()> {
        load_bundle(&self.bundle).map(|_| ())
    }

    /// Sign `data` with the digest named by `selector` (SHA-256 unless
    /// `"Sha384"` or `"Sha512"`).
    ///
    /// # Errors
    /// Returns `InternalError` if the key cannot be extracted or signing fails.
    pub fn sign(&self, data: &[u8], selector: Option<&str>) -> SigningResult<Vec<u8>> {
        self.sign_with(data, HashAlgorithm::from_selector(selector))
    }

    fn sign_with(&self, data: &[u8], algorithm: HashAlgorithm) -> SigningResult<Vec<u8>> {
        let bundle = load_bundle(&self.bundle).map_err(into_internal)?;
        let signature = sign_pkcs1(bundle.key(), data, algorithm).map_err(into_internal)?;
        log::info!(
            "Signed {} bytes with {algorithm}: {} byte signature",
            data.len(),
            signature.len()
        );
        Ok(signature)
    }

    /// Handle a function invocation payload and produce the response payload.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an undecodable payload and `InternalError`
    /// when signing fails.
    pub fn handle_function_invocation(&self, payload: &[u8]) -> SigningResult<String> {
        let request: FunctionSignRequest = serde_json::from_slice(payload)
            .map_err(|e| SigningError::InvalidInput(format!("Invalid invocation payload: {e}")))?;
        let data = request.decode_data()?;
        let signature = self.sign_with(&data, request.algorithm())?;
        encode_signature_payload(&signature)
    }

    /// Handle an HTTP signing request.
    ///
    /// # Errors
    /// Returns `InternalError` when signing fails.
    pub fn handle_http_sign(&self, body: &[u8], selector: Option<&str>) -> SigningResult<Vec<u8>> {
        self.sign(body, selector)
    }
}

fn into_internal(error: SigningError) -> SigningError {
    match error {
        SigningError::InternalError(_) => error,
        other => SigningError::InternalError(other.to_string()),
    }
}

/// Stable name of an error variant, reported as a function error type.
#[must_use]
pub fn error_type(error: &SigningError) -> &'static str {
    match error {
        SigningError::ConfigurationError(_) => "ConfigurationError",
        SigningError::SignatureError(_) => "SignatureError",
        SigningError::TransportError(_) => "TransportError",
        SigningError::InternalError(_) => "InternalError",
        SigningError::CertificateError(_) => "CertificateError",
        SigningError::InvalidInput(_) => "InvalidInput",
    }
}
