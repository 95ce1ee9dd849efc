//! Adapter layer modules for external system integration.
//!
//! Provides adapters for:
//! - The signer capability contract shared by every variant
//! - Local PKCS#12 key bundles and the RSA PKCS#1 v1.5 primitive
//! - Remote signing over a cloud-function invocation or an HTTP endpoint
//! - Construction of the configured adapter

pub mod factory;
pub mod keystore;
pub mod local;
pub mod remote;
pub mod signer;
