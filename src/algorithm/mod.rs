mod traits;

pub mod hmac;
pub mod none;

#[cfg(feature = "rsa")]
pub mod rsa;

#[cfg(feature = "ecdsa")]
pub mod ecdsa;

pub use traits::{get_backend, Algorithm, SignatureBackend};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Algorithm identifier from the JWT header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// HMAC with SHA-256
    HS256,

    /// HMAC with SHA-384
    HS384,

    /// HMAC with SHA-512
    HS512,

    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,

    /// RSASSA-PKCS1-v1_5 with SHA-384
    RS384,

    /// RSASSA-PKCS1-v1_5 with SHA-512
    RS512,

    /// RSASSA-PSS with SHA-256
    PS256,

    /// RSASSA-PSS with SHA-384
    PS384,

    /// RSASSA-PSS with SHA-512
    PS512,

    /// ECDSA with P-256 and SHA-256
    ES256,

    /// ECDSA with P-384 and SHA-384
    ES384,

    /// ECDSA with P-521 and SHA-512
    ES512,

    /// Unsigned token
    None,
}

/// Key family an algorithm belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmFamily {
    Hmac,
    Rsa,
    RsaPss,
    Ecdsa,
    None,
}

impl AlgorithmId {
    /// Every identifier this crate understands
    pub const ALL: [AlgorithmId; 13] = [
        AlgorithmId::HS256,
        AlgorithmId::HS384,
        AlgorithmId::HS512,
        AlgorithmId::RS256,
        AlgorithmId::RS384,
        AlgorithmId::RS512,
        AlgorithmId::PS256,
        AlgorithmId::PS384,
        AlgorithmId::PS512,
        AlgorithmId::ES256,
        AlgorithmId::ES384,
        AlgorithmId::ES512,
        AlgorithmId::None,
    ];

    /// Parse an algorithm string from a JWT header
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.as_str() == s)
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::HS512 => "HS512",
            AlgorithmId::RS256 => "RS256",
            AlgorithmId::RS384 => "RS384",
            AlgorithmId::RS512 => "RS512",
            AlgorithmId::PS256 => "PS256",
            AlgorithmId::PS384 => "PS384",
            AlgorithmId::PS512 => "PS512",
            AlgorithmId::ES256 => "ES256",
            AlgorithmId::ES384 => "ES384",
            AlgorithmId::ES512 => "ES512",
            AlgorithmId::None => "none",
        }
    }

    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            AlgorithmId::HS256 | AlgorithmId::HS384 | AlgorithmId::HS512 => AlgorithmFamily::Hmac,
            AlgorithmId::RS256 | AlgorithmId::RS384 | AlgorithmId::RS512 => AlgorithmFamily::Rsa,
            AlgorithmId::PS256 | AlgorithmId::PS384 | AlgorithmId::PS512 => {
                AlgorithmFamily::RsaPss
            }
            AlgorithmId::ES256 | AlgorithmId::ES384 | AlgorithmId::ES512 => {
                AlgorithmFamily::Ecdsa
            }
            AlgorithmId::None => AlgorithmFamily::None,
        }
    }

    /// Digest size in bits (the numeric suffix), `None` for `none`
    pub const fn hash_bits(&self) -> Option<u32> {
        match self {
            AlgorithmId::HS256 | AlgorithmId::RS256 | AlgorithmId::PS256 | AlgorithmId::ES256 => {
                Some(256)
            }
            AlgorithmId::HS384 | AlgorithmId::RS384 | AlgorithmId::PS384 | AlgorithmId::ES384 => {
                Some(384)
            }
            AlgorithmId::HS512 | AlgorithmId::RS512 | AlgorithmId::PS512 | AlgorithmId::ES512 => {
                Some(512)
            }
            AlgorithmId::None => None,
        }
    }

    /// Check if algorithm is HMAC-based (symmetric)
    pub fn is_symmetric(&self) -> bool {
        self.family() == AlgorithmFamily::Hmac
    }

    /// Check if algorithm is asymmetric (RSA/RSA-PSS/ECDSA)
    pub fn is_asymmetric(&self) -> bool {
        matches!(
            self.family(),
            AlgorithmFamily::Rsa | AlgorithmFamily::RsaPss | AlgorithmFamily::Ecdsa
        )
    }
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AlgorithmId::from_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown algorithm \"{s}\"")))
    }
}

/// Ordered allow-list of algorithms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmId>,
}

impl AlgorithmPolicy {
    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmId>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Policy that allows any HMAC algorithm (HS256, HS384, HS512)
    pub fn hmac_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::HS256,
            AlgorithmId::HS384,
            AlgorithmId::HS512,
        ])
    }

    /// Policy that allows RS256/384/512 followed by PS256/384/512
    pub fn rsa_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::RS256,
            AlgorithmId::RS384,
            AlgorithmId::RS512,
            AlgorithmId::PS256,
            AlgorithmId::PS384,
            AlgorithmId::PS512,
        ])
    }

    /// Policy that allows any ECDSA algorithm (ES256, ES384, ES512)
    pub fn ecdsa_any() -> Self {
        Self::allow_only(vec![
            AlgorithmId::ES256,
            AlgorithmId::ES384,
            AlgorithmId::ES512,
        ])
    }

    /// Check if an algorithm is allowed
    pub fn is_allowed(&self, algorithm: &AlgorithmId) -> bool {
        self.allowed.contains(algorithm)
    }

    /// Check a raw header `alg` value against the list
    pub fn contains(&self, alg: &str) -> bool {
        self.allowed.iter().any(|a| a.as_str() == alg)
    }

    /// Get list of allowed algorithms
    pub fn allowed_algorithms(&self) -> &[AlgorithmId] {
        &self.allowed
    }
}

impl From<Vec<AlgorithmId>> for AlgorithmPolicy {
    fn from(algorithms: Vec<AlgorithmId>) -> Self {
        Self::allow_only(algorithms)
    }
}
