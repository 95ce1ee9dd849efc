//! The unit of work handed from a document assembler to a signer.

use super::crypto::HashAlgorithm;
use std::fmt;

/// Bytes to sign plus the digest to sign them under.
///
/// `data_to_sign` is the placeholder-excluded byte range of the document, not
/// the whole document. It cannot be mutated after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningRequest {
    data_to_sign: Box<[u8]>,
    digest_algorithm: HashAlgorithm,
}

impl SigningRequest {
    #[must_use]
    pub fn new(data_to_sign: impl Into<Vec<u8>>, digest_algorithm: HashAlgorithm) -> Self {
        Self {
            data_to_sign: data_to_sign.into().into_boxed_slice(),
            digest_algorithm,
        }
    }

    /// Build a request from a wire selector, applying the SHA-256 default.
    #[must_use]
    pub fn from_selector(data_to_sign: impl Into<Vec<u8>>, selector: Option<&str>) -> Self {
        Self::new(data_to_sign, HashAlgorithm::from_selector(selector))
    }

    #[must_use]
    pub fn data_to_sign(&self) -> &[u8] {
        &self.data_to_sign
    }

    #[must_use]
    pub fn digest_algorithm(&self) -> HashAlgorithm {
        self.digest_algorithm
    }
}

impl fmt::Debug for SigningRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SigningRequest(algo={:?}, len={})",
            self.digest_algorithm,
            self.data_to_sign.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_unknown_selector() {
        let request = SigningRequest::from_selector(vec![0u8; 32], Some("Md5"));
        assert_eq!(request.digest_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(request.data_to_sign(), &[0u8; 32]);
    }

    #[test]
    fn test_debug_hides_payload() {
        let request = SigningRequest::new(b"secret range".to_vec(), HashAlgorithm::Sha512);
        assert_eq!(format!("{request:?}"), "SigningRequest(algo=Sha512, len=12)");
    }
}
