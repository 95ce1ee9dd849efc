//! HTTP hosting for the remote signing service.
//!
//! Serves both transports from one process:
//! - `POST|GET /api/ExternalSign?digestAlgorithm=...` (raw bytes in, raw signature out)
//! - `POST /2015-03-31/functions/{name}/invocations` (Invoke API shape)
//! - `GET /health`

use super::protocol::{
    FunctionErrorPayload, DIGEST_ALGORITHM_QUERY, FUNCTION_ERROR_HEADER, OCTET_STREAM,
};
use super::service::{error_type, SigningService};
use crate::domain::types::KeyBundleConfig;
use crate::infra::error::{SigningError, SigningResult};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{Filter, Reply};

/// Configuration for the signing server.
#[derive(Debug, Clone)]
pub struct SigningServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:7062").
    pub bind_address: String,
    /// Key bundle used for every request.
    pub bundle: KeyBundleConfig,
    /// Name answered on the function invocation route.
    pub function_name: String,
    /// TLS certificate path (PEM format).
    pub tls_cert_path: Option<String>,
    /// TLS private key path (PEM format).
    pub tls_key_path: Option<String>,
}

impl SigningServerConfig {
    #[must_use]
    pub fn new(bind_address: impl Into<String>, bundle: KeyBundleConfig) -> Self {
        Self {
            bind_address: bind_address.into(),
            bundle,
            function_name: super::protocol::DEFAULT_FUNCTION_NAME.to_string(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }

    #[must_use]
    pub fn with_function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = name.into();
        self
    }

    /// Configure TLS with certificate and key paths.
    #[must_use]
    pub fn with_tls(mut self, cert_path: impl Into<String>, key_path: impl Into<String>) -> Self {
        self.tls_cert_path = Some(cert_path.into());
        self.tls_key_path = Some(key_path.into());
        self
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub function_name: String,
    pub uptime_seconds: u64,
}

/// Digest selector from the query pairs. Repeated parameters are joined with
/// `,` and therefore never match a known digest.
fn digest_selector(pairs: &[(String, String)]) -> Option<String> {
    let values: Vec<&str> = pairs
        .iter()
        .filter(|(key, _)| key == DIGEST_ALGORITHM_QUERY)
        .map(|(_, value)| value.as_str())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

/// Build the service and check its key bundle opens.
///
/// # Errors
/// Returns `ConfigurationError` if the key bundle is unusable.
pub fn initialize_service(config: &SigningServerConfig) -> SigningResult<Arc<SigningService>> {
    log::info!(
        "Opening key bundle {} ...",
        config.bundle.bundle_path.display()
    );
    let service =
        SigningService::new(config.bundle.clone()).with_function_name(&config.function_name);
    service.check_ready()?;
    log::info!("Signing service ready (function name: {})", config.function_name);
    Ok(Arc::new(service))
}

/// Build all routes.
pub fn routes(
    state: Arc<SigningService>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    http_sign_route(state.clone())
        .or(invocation_route(state.clone()))
        .unify()
        .or(health_route(state))
        .unify()
}

/// HTTP endpoint route.
fn http_sign_route(
    state: Arc<SigningService>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    warp::path!("api" / "ExternalSign")
        .and(warp::post().or(warp::get()).unify())
        .and(
            warp::query::<Vec<(String, String)>>()
                .or(warp::any().map(Vec::<(String, String)>::new))
                .unify(),
        )
        .and(warp::body::bytes())
        .and(with_state(state))
        .and_then(handle_http_sign_request)
}

/// Function invocation route.
fn invocation_route(
    state: Arc<SigningService>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    warp::path!("2015-03-31" / "functions" / String / "invocations")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(with_state(state))
        .and_then(handle_invocation_request)
}

/// Health endpoint route.
fn health_route(
    state: Arc<SigningService>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .and(with_state(state))
        .map(|state: Arc<SigningService>| {
            warp::reply::json(&HealthResponse {
                status: "ok".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                function_name: state.function_name().to_string(),
                uptime_seconds: state.uptime_seconds(),
            })
            .into_response()
        })
}

/// Inject state into handlers.
fn with_state(
    state: Arc<SigningService>,
) -> impl Filter<Extract = (Arc<SigningService>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Run a blocking signing job off the async executor.
async fn run_blocking<T, F>(job: F) -> SigningResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SigningResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| SigningError::InternalError(format!("Signing task failed: {e}")))?
}

async fn handle_http_sign_request(
    query: Vec<(String, String)>,
    body: Bytes,
    state: Arc<SigningService>,
) -> Result<Response, Infallible> {
    let selector = digest_selector(&query);
    log::debug!(
        "HTTP sign request: {} bytes, digestAlgorithm={selector:?}",
        body.len()
    );

    let result = run_blocking(move || state.handle_http_sign(&body, selector.as_deref())).await;

    Ok(match result {
        Ok(signature) => {
            let reply = warp::reply::with_header(signature, "Content-Type", OCTET_STREAM);
            warp::reply::with_header(
                reply,
                "Content-Disposition",
                "attachment; filename=signed-data.bin",
            )
            .into_response()
        }
        Err(error) => {
            log::warn!("HTTP signing failed: {error}");
            warp::reply::with_status("Signing operation failed", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    })
}

async fn handle_invocation_request(
    function_name: String,
    body: Bytes,
    state: Arc<SigningService>,
) -> Result<Response, Infallible> {
    if function_name != state.function_name() {
        log::warn!("Invocation of unknown function {function_name}");
        let error = FunctionErrorPayload::new(
            "ResourceNotFoundException",
            format!("Function not found: {function_name}"),
        );
        return Ok(
            warp::reply::with_status(warp::reply::json(&error), StatusCode::NOT_FOUND)
                .into_response(),
        );
    }

    let result = run_blocking(move || state.handle_function_invocation(&body)).await;

    Ok(match result {
        Ok(payload) => {
            warp::reply::with_header(payload, "Content-Type", "application/json").into_response()
        }
        Err(error) => {
            log::warn!("Function {function_name} failed: {error}");
            let payload = FunctionErrorPayload::new(error_type(&error), error.to_string());
            warp::reply::with_header(
                warp::reply::json(&payload),
                FUNCTION_ERROR_HEADER,
                "Unhandled",
            )
            .into_response()
        }
    })
}
