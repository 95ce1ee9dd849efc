use super::HashAlgorithm;
use std::fmt;

/// Raw PKCS#1 v1.5 RSA signature value together with the digest it was made under.
#[derive(Clone, Eq, PartialEq)]
pub struct RsaSignature {
    algo: HashAlgorithm,
    bytes: Box<[u8]>,
}

impl RsaSignature {
    #[must_use]
    pub fn new(algo: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            algo,
            bytes: bytes.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RsaSignature(algo={:?}, len={})",
            self.algo,
            self.bytes.len()
        )
    }
}
