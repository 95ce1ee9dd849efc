//! Remote Signing Integration Tests
//!
//! Runs the signing service on an ephemeral local port and drives it through
//! the cloud-function and HTTP signer adapters, plus in-test warp stubs that
//! play a misbehaving or canned remote.

#![cfg(feature = "service")]

use external_signer::adapters::remote::protocol::{encode_signature_payload, FUNCTION_ERROR_HEADER};
use external_signer::adapters::remote::server::{initialize_service, routes, SigningServerConfig};
use external_signer::services::verification::verify_signature;
use external_signer::{
    ExternalSigner, FunctionSigner, FunctionSignerConfig, HashAlgorithm, HttpEndpointSigner,
    HttpSignerConfig, LocalCertificateSigner, SigningError, SigningService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

mod common;

use common::SigningFixture;

/// Start the real signing service for `fixture` and return its address.
fn spawn_service(fixture: &SigningFixture) -> SocketAddr {
    let config = SigningServerConfig::new("127.0.0.1:0", fixture.bundle());
    let state = initialize_service(&config).unwrap();
    spawn_state(state)
}

fn spawn_state(state: Arc<SigningService>) -> SocketAddr {
    let (addr, server) = warp::serve(routes(state)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn function_signer(addr: SocketAddr, fixture: &SigningFixture) -> FunctionSigner {
    FunctionSigner::new(
        FunctionSignerConfig::new(
            format!("http://{addr}"),
            "ExternalSign",
            &fixture.certificate_path,
        )
        .with_timeout(10),
    )
    .unwrap()
}

fn http_signer(addr: SocketAddr, fixture: &SigningFixture) -> HttpEndpointSigner {
    HttpEndpointSigner::new(
        HttpSignerConfig::new(
            format!("http://{addr}/api/ExternalSign"),
            &fixture.certificate_path,
        )
        .with_timeout(10),
    )
    .unwrap()
}

#[tokio::test]
async fn test_all_variants_agree_on_zero_bytes_sha512() {
    let fixture = SigningFixture::new("John Doe");
    let addr = spawn_service(&fixture);
    let data = [0u8; 32];

    let local = LocalCertificateSigner::new(fixture.bundle())
        .sign_data(&data, HashAlgorithm::Sha512)
        .await
        .unwrap();
    assert!(verify_signature(&fixture.certificate, &data, HashAlgorithm::Sha512, &local).unwrap());

    let function = function_signer(addr, &fixture)
        .sign_data(&data, HashAlgorithm::Sha512)
        .await
        .unwrap();
    let http = http_signer(addr, &fixture)
        .sign_data(&data, HashAlgorithm::Sha512)
        .await
        .unwrap();

    assert_eq!(function, local);
    assert_eq!(http, local);
}

#[tokio::test]
async fn test_remote_chain_comes_from_public_certificate() {
    let fixture = SigningFixture::new("John Doe");
    // Unreachable endpoint: fetching the chain must not touch the network.
    let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();

    for signer in [
        Box::new(function_signer(addr, &fixture)) as Box<dyn ExternalSigner>,
        Box::new(http_signer(addr, &fixture)) as Box<dyn ExternalSigner>,
    ] {
        let chain = signer.certificate_chain().await.unwrap();
        assert_eq!(
            chain.leaf().to_der().unwrap(),
            fixture.certificate.to_der().unwrap()
        );
    }
}

#[tokio::test]
async fn test_remote_signing_is_deterministic() {
    let fixture = SigningFixture::new("John Doe");
    let addr = spawn_service(&fixture);
    let signer = http_signer(addr, &fixture);

    let first = signer.sign_data(b"range", HashAlgorithm::Sha256).await.unwrap();
    let second = signer.sign_data(b"range", HashAlgorithm::Sha256).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_selector_signs_with_sha256() {
    let fixture = SigningFixture::new("John Doe");
    let addr = spawn_service(&fixture);
    let client = reqwest::Client::new();

    for url in [
        format!("http://{addr}/api/ExternalSign?digestAlgorithm=Sha1"),
        format!("http://{addr}/api/ExternalSign"),
    ] {
        let response = client.post(&url).body(b"range".to_vec()).send().await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=signed-data.bin"
        );
        let signature = response.bytes().await.unwrap();
        assert!(
            verify_signature(&fixture.certificate, b"range", HashAlgorithm::Sha256, &signature)
                .unwrap(),
            "{url} should sign with SHA-256"
        );
    }
}

#[tokio::test]
async fn test_service_without_private_key_fails_both_transports() {
    let fixture = SigningFixture::new("No Key");
    let addr = spawn_state(Arc::new(SigningService::new(fixture.keyless_bundle())));

    let err = http_signer(addr, &fixture)
        .sign_data(b"data", HashAlgorithm::Sha256)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::SignatureError(_)), "{err}");
    assert!(err.to_string().contains("Signing operation failed"));

    let err = function_signer(addr, &fixture)
        .sign_data(b"data", HashAlgorithm::Sha256)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::SignatureError(_)), "{err}");
    assert!(err.to_string().contains("Unhandled"));
    assert!(err.to_string().contains("InternalError"));
}

#[tokio::test]
async fn test_stub_500_surfaces_remote_text() {
    let fixture = SigningFixture::new("John Doe");
    let stub = warp::path!("api" / "ExternalSign").and(warp::post()).map(|| {
        warp::reply::with_status(
            "Signing operation failed",
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        )
    });
    let (addr, server) = warp::serve(stub).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let err = http_signer(addr, &fixture)
        .sign_data(&[0u8; 32], HashAlgorithm::Sha512)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::SignatureError(_)));
    assert!(err.to_string().contains("Signing operation failed"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_stub_function_error_surfaces_details() {
    let fixture = SigningFixture::new("John Doe");
    let stub = warp::path!("2015-03-31" / "functions" / String / "invocations")
        .and(warp::post())
        .map(|_name: String| {
            warp::reply::with_header(
                r#"{"errorMessage":"Key vault unavailable","errorType":"KeyVaultError"}"#,
                FUNCTION_ERROR_HEADER,
                "Handled",
            )
        });
    let (addr, server) = warp::serve(stub).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let err = function_signer(addr, &fixture)
        .sign_data(&[0u8; 32], HashAlgorithm::Sha512)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::SignatureError(_)));
    assert!(err.to_string().contains("Key vault unavailable"));
}

#[tokio::test]
async fn test_canned_stubs_return_identical_bytes() {
    let fixture = SigningFixture::new("John Doe");
    let expected = LocalCertificateSigner::new(fixture.bundle())
        .sign_data(&[0u8; 32], HashAlgorithm::Sha512)
        .await
        .unwrap();

    let raw = expected.clone();
    let http_stub = warp::path!("api" / "ExternalSign")
        .and(warp::post())
        .map(move || raw.clone());
    let encoded = encode_signature_payload(&expected).unwrap();
    let function_stub = warp::path!("2015-03-31" / "functions" / String / "invocations")
        .and(warp::post())
        .map(move |_name: String| encoded.clone());
    let (addr, server) =
        warp::serve(http_stub.or(function_stub)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let http = http_signer(addr, &fixture)
        .sign_data(&[0u8; 32], HashAlgorithm::Sha512)
        .await
        .unwrap();
    let function = function_signer(addr, &fixture)
        .sign_data(&[0u8; 32], HashAlgorithm::Sha512)
        .await
        .unwrap();

    assert_eq!(http, expected);
    assert_eq!(function, expected);
}

#[tokio::test]
async fn test_unreachable_remote_is_retryable() {
    let fixture = SigningFixture::new("John Doe");
    let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();

    let err = function_signer(addr, &fixture)
        .sign_data(b"data", HashAlgorithm::Sha256)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::TransportError(_)));
    assert!(err.is_retryable());
}
