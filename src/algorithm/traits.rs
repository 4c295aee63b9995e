use super::AlgorithmId;
use crate::error::Result;
use crate::keys::Key;

/// Core algorithm trait that all JWT signature algorithms implement
///
/// Implementations produce and check the third token segment. They never look
/// at claims, and they assume the key has already been matched to the
/// algorithm.
pub trait Algorithm {
    /// The algorithm identifier (e.g., "HS256", "RS256")
    fn name(&self) -> &'static str;

    /// Sign `signing_input` (header.payload) and return the Base64URL signature
    fn sign(&self, signing_input: &str, key: &Key) -> Result<String>;

    /// Check a Base64URL-encoded signature
    ///
    /// Returns `Ok(false)` for a signature that does not match and an error
    /// for key material the backend cannot use at all.
    fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<bool>;
}

/// Type alias for boxed algorithm trait objects
pub type SignatureBackend = Box<dyn Algorithm + Send + Sync>;

/// Get the signature backend for an algorithm
///
/// Returns `None` when the backend is not compiled in (`rsa`/`ecdsa` features)
/// or not available at all (ES512).
pub fn get_backend(algorithm: &AlgorithmId) -> Option<SignatureBackend> {
    let backend: SignatureBackend = match algorithm {
        AlgorithmId::HS256 => Box::new(super::hmac::HS256),
        AlgorithmId::HS384 => Box::new(super::hmac::HS384),
        AlgorithmId::HS512 => Box::new(super::hmac::HS512),

        #[cfg(feature = "rsa")]
        AlgorithmId::RS256 => Box::new(super::rsa::RS256),
        #[cfg(feature = "rsa")]
        AlgorithmId::RS384 => Box::new(super::rsa::RS384),
        #[cfg(feature = "rsa")]
        AlgorithmId::RS512 => Box::new(super::rsa::RS512),
        #[cfg(feature = "rsa")]
        AlgorithmId::PS256 => Box::new(super::rsa::PS256),
        #[cfg(feature = "rsa")]
        AlgorithmId::PS384 => Box::new(super::rsa::PS384),
        #[cfg(feature = "rsa")]
        AlgorithmId::PS512 => Box::new(super::rsa::PS512),

        #[cfg(feature = "ecdsa")]
        AlgorithmId::ES256 => Box::new(super::ecdsa::ES256),
        #[cfg(feature = "ecdsa")]
        AlgorithmId::ES384 => Box::new(super::ecdsa::ES384),

        AlgorithmId::None => Box::new(super::none::Unsigned),

        #[allow(unreachable_patterns)]
        _ => return None,
    };

    Some(backend)
}
