//! Error types for external signing operations.
//! Error handling types and result definitions shared by adapters and the service.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Error taxonomy of the external signing protocol
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SigningError {
    /// Certificate resource missing, unreadable, wrong passphrase, or no usable private key.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The signer could not produce a signature: remote non-success, function error,
    /// empty or undecodable payload, or a rejected cryptographic operation.
    #[error("Signature creation error: {0}")]
    SignatureError(String),

    /// The remote signer could not be reached at all.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Failure inside the remote signing service itself.
    #[error("Internal signing service error: {0}")]
    InternalError(String),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SigningError {
    /// Whether a caller may reasonably retry the same request.
    ///
    /// Only transport failures qualify; a remote signing failure will not
    /// change by sending the same bytes again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SigningError::TransportError(_))
    }
}

impl From<reqwest::Error> for SigningError {
    fn from(error: reqwest::Error) -> Self {
        SigningError::TransportError(error.to_string())
    }
}

impl From<openssl::error::ErrorStack> for SigningError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        SigningError::SignatureError(error.to_string())
    }
}

impl From<serde_json::Error> for SigningError {
    fn from(error: serde_json::Error) -> Self {
        SigningError::InvalidInput(error.to_string())
    }
}

impl From<base64::DecodeError> for SigningError {
    fn from(error: base64::DecodeError) -> Self {
        SigningError::InvalidInput(format!("base64: {error}"))
    }
}
