//! Wire formats for remote signing.
//!
//! Two transports carry the same exchange:
//! - Function invocation: JSON `{"DataToSign": <base64>, "DigestAlgorithm": "Sha512"}`
//!   in, a bare JSON string holding the base64 signature out.
//! - HTTP endpoint: raw bytes in (`application/octet-stream`) with the digest as
//!   the `digestAlgorithm` query parameter, raw signature bytes out.

use crate::domain::crypto::HashAlgorithm;
use crate::infra::error::{SigningError, SigningResult};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Query parameter naming the digest on the HTTP transport.
pub const DIGEST_ALGORITHM_QUERY: &str = "digestAlgorithm";

/// Content type of both request and response bodies on the HTTP transport.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Invoke API version segment of the function invocation path.
pub const INVOKE_API_VERSION: &str = "2015-03-31";

/// Response header set when the function itself failed.
pub const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";

/// Request header selecting synchronous invocation.
pub const INVOCATION_TYPE_HEADER: &str = "X-Amz-Invocation-Type";

pub const REQUEST_RESPONSE: &str = "RequestResponse";

/// Function name used when none is configured.
pub const DEFAULT_FUNCTION_NAME: &str = "ExternalSign";

/// Path of the HTTP signing endpoint.
pub const HTTP_SIGN_PATH: &str = "/api/ExternalSign";

/// Input document of the signing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionSignRequest {
    /// Base64-encoded bytes to sign.
    #[serde(alias = "dataToSign")]
    pub data_to_sign: String,
    /// `Sha256`, `Sha384` or `Sha512`; anything else means SHA-256.
    #[serde(default, alias = "digestAlgorithm")]
    pub digest_algorithm: Option<String>,
}

impl FunctionSignRequest {
    #[must_use]
    pub fn new(data: &[u8], algorithm: HashAlgorithm) -> Self {
        Self {
            data_to_sign: base64::engine::general_purpose::STANDARD.encode(data),
            digest_algorithm: Some(algorithm.wire_name().to_string()),
        }
    }

    /// Decode the payload bytes.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `DataToSign` is not valid base64.
    pub fn decode_data(&self) -> SigningResult<Vec<u8>> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.data_to_sign)?)
    }

    /// Digest selected by this request, with the SHA-256 fallback applied.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::from_selector(self.digest_algorithm.as_deref())
    }
}

/// Error document returned alongside a function error header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionErrorPayload {
    pub error_type: String,
    pub error_message: String,
}

impl FunctionErrorPayload {
    #[must_use]
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }
}

/// Encode a signature as the function's response payload.
///
/// # Errors
/// Returns `InternalError` if JSON serialization fails.
pub fn encode_signature_payload(signature: &[u8]) -> SigningResult<String> {
    let b64 = base64::engine::general_purpose::STANDARD.encode(signature);
    serde_json::to_string(&b64)
        .map_err(|e| SigningError::InternalError(format!("Failed to encode response: {e}")))
}

/// Decode the function's response payload into signature bytes.
///
/// # Errors
/// Returns `SignatureError` if the payload is not a non-empty JSON string of base64.
pub fn decode_signature_payload(payload: &[u8]) -> SigningResult<Vec<u8>> {
    let b64: Option<String> = serde_json::from_slice(payload).map_err(|e| {
        SigningError::SignatureError(format!(
            "Invalid response from function ({e}): {}",
            String::from_utf8_lossy(payload)
        ))
    })?;

    let b64 = b64
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SigningError::SignatureError("Empty response from function".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| SigningError::SignatureError(format!("Failed to decode signature: {e}")))
}

/// Path of the synchronous invocation endpoint for `function_name`.
#[must_use]
pub fn invocation_path(function_name: &str) -> String {
    format!("/{INVOKE_API_VERSION}/functions/{function_name}/invocations")
}
