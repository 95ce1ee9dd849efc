//! External Signer Library
//!
//! Produces PKCS#1 v1.5 RSA signatures over document byte ranges through a
//! pluggable signer: a local PKCS#12 bundle, a cloud function, or an HTTP
//! endpoint. Also hosts the stateless remote signing service those remote
//! adapters talk to.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

#[cfg(test)]
mod test_support;

pub use adapters::factory::{build_signer, build_signer_of_kind};
pub use adapters::local::LocalCertificateSigner;
pub use adapters::remote::function_client::{FunctionSigner, FunctionSignerConfig};
pub use adapters::remote::http_client::{HttpEndpointSigner, HttpSignerConfig};
pub use adapters::remote::service::SigningService;
pub use adapters::signer::{ExternalSigner, SignerKind};
pub use domain::crypto::{CertificateChain, CertificateSummary, HashAlgorithm, RsaSignature};
pub use domain::request::SigningRequest;
pub use domain::types::{KeyBundleConfig, Passphrase};
pub use infra::config::{AdapterKind, ConfigManager, SignerConfiguration};
pub use infra::error::{SigningError, SigningResult};
pub use services::signing::{sign_request, SignedData, SigningOptions};
