//! Remote signing: the cloud-function and HTTP signer adapters, the wire
//! protocol they share, and the stateless service that answers them.

pub mod function_client;
pub mod http_client;
pub mod protocol;
pub mod service;

#[cfg(feature = "service")]
pub mod server;
