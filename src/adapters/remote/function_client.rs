//! Cloud-function signer.
//!
//! Delegates signing to a named function invoked synchronously
//! (request/response). The invocation transport sits behind
//! [`FunctionInvoker`]; the shipped implementation speaks the Lambda Invoke
//! HTTP API shape, which the bundled signing service also serves.

use super::protocol::{
    decode_signature_payload, invocation_path, FunctionSignRequest, FUNCTION_ERROR_HEADER,
    INVOCATION_TYPE_HEADER, REQUEST_RESPONSE,
};
use crate::adapters::signer::{ExternalSigner, SignerKind};
use crate::domain::crypto::{CertificateChain, HashAlgorithm};
use crate::infra::error::{SigningError, SigningResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Raw outcome of one synchronous function invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutput {
    pub status_code: u16,
    /// Populated when the function ran but failed (e.g. `Unhandled`).
    pub function_error: Option<String>,
    pub payload: Vec<u8>,
}

/// Transport that runs a named function once and returns its raw result.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invoke `function_name` with `payload` and wait for its response.
    ///
    /// # Errors
    /// Returns `TransportError` if the invocation service cannot be reached.
    async fn invoke(&self, function_name: &str, payload: Vec<u8>)
        -> SigningResult<InvocationOutput>;
}

/// Configuration for the cloud-function signer.
#[derive(Debug, Clone)]
pub struct FunctionSignerConfig {
    /// Base URL of the invoke API (e.g. `http://localhost:9001`).
    pub endpoint: String,
    /// Function name or ARN.
    pub function_name: String,
    /// Public certificate matching the function's private key.
    pub public_certificate: PathBuf,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl FunctionSignerConfig {
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        function_name: impl Into<String>,
        public_certificate: impl AsRef<Path>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            function_name: function_name.into(),
            public_certificate: public_certificate.as_ref().to_path_buf(),
            timeout_secs: 30,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// [`FunctionInvoker`] over the Invoke HTTP API.
pub struct HttpFunctionInvoker {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpFunctionInvoker {
    /// # Errors
    /// Returns `ConfigurationError` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SigningResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("external-signer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SigningError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl FunctionInvoker for HttpFunctionInvoker {
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
    ) -> SigningResult<InvocationOutput> {
        let url = format!("{}{}", self.endpoint, invocation_path(function_name));
        log::debug!("Invoking function {function_name} at {url}");

        let response = self
            .client
            .post(&url)
            .header(INVOCATION_TYPE_HEADER, REQUEST_RESPONSE)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                SigningError::TransportError(format!("Failed to invoke function {function_name}: {e}"))
            })?;

        let status_code = response.status().as_u16();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let payload = response
            .bytes()
            .await
            .map_err(|e| SigningError::TransportError(format!("Failed to read function response: {e}")))?
            .to_vec();

        Ok(InvocationOutput {
            status_code,
            function_error,
            payload,
        })
    }
}

/// Signer that delegates to a remote signing function.
pub struct FunctionSigner {
    function_name: String,
    public_certificate: PathBuf,
    invoker: Box<dyn FunctionInvoker>,
}

impl FunctionSigner {
    /// Create a signer using the HTTP invoke transport.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: FunctionSignerConfig) -> SigningResult<Self> {
        let invoker = HttpFunctionInvoker::new(
            config.endpoint,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self::with_invoker(
            config.function_name,
            config.public_certificate,
            Box::new(invoker),
        ))
    }

    /// Create a signer over any invocation transport.
    #[must_use]
    pub fn with_invoker(
        function_name: impl Into<String>,
        public_certificate: impl AsRef<Path>,
        invoker: Box<dyn FunctionInvoker>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            public_certificate: public_certificate.as_ref().to_path_buf(),
            invoker,
        }
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }
}

#[async_trait]
impl ExternalSigner for FunctionSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Function
    }

    async fn certificate_chain(&self) -> SigningResult<CertificateChain> {
        CertificateChain::load(&self.public_certificate)
    }

    async fn sign_data(&self, data: &[u8], algorithm: HashAlgorithm) -> SigningResult<Vec<u8>> {
        let request = FunctionSignRequest::new(data, algorithm);
        let payload = serde_json::to_vec(&request)
            .map_err(|e| SigningError::SignatureError(format!("Failed to encode request: {e}")))?;

        let output = self.invoker.invoke(&self.function_name, payload).await?;
        let details = String::from_utf8_lossy(&output.payload);

        if output.status_code != 200 {
            return Err(SigningError::SignatureError(format!(
                "Function invocation failed with status code {}: {details}",
                output.status_code
            )));
        }

        if let Some(kind) = output.function_error.as_deref().filter(|k| !k.is_empty()) {
            return Err(SigningError::SignatureError(format!(
                "Function error: {kind}. Details: {details}"
            )));
        }

        let signature = decode_signature_payload(&output.payload)?;
        log::debug!(
            "Function {} returned {} byte {algorithm} signature",
            self.function_name,
            signature.len()
        );
        Ok(signature)
    }
}
