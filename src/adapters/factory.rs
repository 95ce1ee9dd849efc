//! Construction of the configured signer adapter.

use super::local::LocalCertificateSigner;
use super::remote::function_client::{FunctionSigner, FunctionSignerConfig};
use super::remote::http_client::{HttpEndpointSigner, HttpSignerConfig};
use super::signer::ExternalSigner;
use crate::domain::types::{KeyBundleConfig, Passphrase};
use crate::infra::config::{AdapterKind, SignerConfiguration};
use crate::infra::error::SigningResult;

/// Build the adapter named in the configuration.
///
/// # Errors
/// Returns `ConfigurationError` if the configuration is invalid, the
/// passphrase variable is unset (local adapter), or an HTTP client cannot be
/// created.
pub fn build_signer(config: &SignerConfiguration) -> SigningResult<Box<dyn ExternalSigner>> {
    build_signer_of_kind(config, config.adapter)
}

/// Build a specific adapter variant using the rest of the configuration.
///
/// # Errors
/// See [`build_signer`].
pub fn build_signer_of_kind(
    config: &SignerConfiguration,
    kind: AdapterKind,
) -> SigningResult<Box<dyn ExternalSigner>> {
    config.validate()?;
    log::debug!("Building {kind} signer");

    let signer: Box<dyn ExternalSigner> = match kind {
        AdapterKind::Local => {
            let passphrase = Passphrase::from_env(&config.local.passphrase_env)?;
            let bundle = KeyBundleConfig::new(&config.local.key_bundle, passphrase);
            let signer = LocalCertificateSigner::new(bundle);
            if config.local.use_public_certificate {
                Box::new(signer.with_public_certificate(&config.public_certificate))
            } else {
                Box::new(signer)
            }
        }
        AdapterKind::Function => {
            let function_config = FunctionSignerConfig::new(
                &config.function.endpoint,
                &config.function.function_name,
                &config.public_certificate,
            )
            .with_timeout(config.network_timeout_seconds);
            Box::new(FunctionSigner::new(function_config)?)
        }
        AdapterKind::Http => {
            let mut http_config = HttpSignerConfig::new(&config.http.url, &config.public_certificate)
                .with_timeout(config.network_timeout_seconds);
            if !config.http.verify_tls {
                log::warn!("TLS verification disabled for {}", config.http.url);
                http_config = http_config.with_insecure_tls();
            }
            Box::new(HttpEndpointSigner::new(http_config)?)
        }
    };

    Ok(signer)
}
