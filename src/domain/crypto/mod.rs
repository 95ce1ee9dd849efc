//! Foundational cryptographic domain types.
//!
//! Provides strongly-typed wrappers for:
//! - Digest algorithm selection with strict and wire-lenient parsing
//! - Leaf-first public certificate chains
//! - RSA signature values tagged with their digest algorithm

mod cert;
mod hash;
mod signature;

pub use cert::{CertificateChain, CertificateSummary};
pub use hash::HashAlgorithm;
pub use signature::RsaSignature;
