//! Service layer module root.
//! Orchestrates adapters into signing and verification workflows.

pub mod signing;
pub mod verification;

pub use signing::{sign_request, SignedData, SigningOptions, SigningPipeline};
pub use verification::{verify_signature, verify_with_chain};
