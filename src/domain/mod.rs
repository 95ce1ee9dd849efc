//! Domain types shared by every signer adapter.

pub mod crypto;
pub mod request;
pub mod types;
