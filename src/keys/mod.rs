//! Typed key descriptors
//!
//! A key is classified once, when it is loaded, instead of being sniffed on
//! every call:
//! - Secret keys (HMAC algorithms)
//! - Public keys (verification with RSA, RSA-PSS and ECDSA algorithms)
//! - Private keys (signing with RSA, RSA-PSS and ECDSA algorithms)

mod matcher;

pub use matcher::{KeyAlgorithmMatcher, KeyMismatch, KeyUse, MatchOptions};

use crate::error::{Error, Result};

/// A key descriptor handed to signing or verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Symmetric key for HMAC algorithms
    Secret(SymmetricKey),

    /// Asymmetric public key
    Public(AsymmetricKey),

    /// Asymmetric private key
    Private(AsymmetricKey),
}

impl Key {
    /// Create a symmetric key from bytes
    pub fn secret(secret: impl Into<SymmetricKey>) -> Self {
        Key::Secret(secret.into())
    }

    /// Wrap an asymmetric descriptor as a public key
    pub fn public(key: AsymmetricKey) -> Self {
        Key::Public(key)
    }

    /// Wrap an asymmetric descriptor as a private key
    pub fn private(key: AsymmetricKey) -> Self {
        Key::Private(key)
    }

    /// RSA public key from a DER-encoded PKCS#1 `RSAPublicKey`
    pub fn rsa_public(der: impl Into<Vec<u8>>, modulus_length: u32) -> Self {
        Key::Public(AsymmetricKey::rsa(der.into(), modulus_length))
    }

    /// RSA private key from a DER-encoded PKCS#8 document
    pub fn rsa_private(der: impl Into<Vec<u8>>, modulus_length: u32) -> Self {
        Key::Private(AsymmetricKey::rsa(der.into(), modulus_length))
    }

    /// RSA-PSS public key, optionally restricted to embedded parameters
    pub fn rsa_pss_public(
        der: impl Into<Vec<u8>>,
        modulus_length: u32,
        parameters: Option<PssParameters>,
    ) -> Self {
        Key::Public(AsymmetricKey::rsa_pss(der.into(), modulus_length, parameters))
    }

    /// RSA-PSS private key, optionally restricted to embedded parameters
    pub fn rsa_pss_private(
        der: impl Into<Vec<u8>>,
        modulus_length: u32,
        parameters: Option<PssParameters>,
    ) -> Self {
        Key::Private(AsymmetricKey::rsa_pss(der.into(), modulus_length, parameters))
    }

    /// EC public key from an uncompressed SEC1 point
    pub fn ec_public(point: impl Into<Vec<u8>>, curve: EcCurve) -> Self {
        Key::Public(AsymmetricKey::ec(point.into(), curve))
    }

    /// EC private key from a DER-encoded PKCS#8 document
    pub fn ec_private(der: impl Into<Vec<u8>>, curve: EcCurve) -> Self {
        Key::Private(AsymmetricKey::ec(der.into(), curve))
    }

    /// Load an RSA private key from PKCS#8, reading its modulus length
    #[cfg(feature = "rsa")]
    pub fn rsa_private_from_pkcs8(der: &[u8]) -> Result<Self> {
        let keypair = ring::signature::RsaKeyPair::from_pkcs8(der)
            .map_err(|e| Error::key(format!("RSA private key rejected: {e}")))?;
        let modulus_length = (keypair.public().modulus_len() * 8) as u32;
        Ok(Key::rsa_private(der.to_vec(), modulus_length))
    }

    /// Load an EC private key from PKCS#8, checking it lies on `curve`
    #[cfg(feature = "ecdsa")]
    pub fn ec_private_from_pkcs8(der: &[u8], curve: EcCurve) -> Result<Self> {
        ec_public_point(der, curve)?;
        Ok(Key::ec_private(der.to_vec(), curve))
    }

    /// Derive the public descriptor of a private key
    ///
    /// Public and secret keys are returned unchanged.
    pub fn to_public(&self) -> Result<Self> {
        let private = match self {
            Key::Private(key) => key,
            other => return Ok(other.clone()),
        };

        let der = match private.key_type() {
            #[cfg(feature = "rsa")]
            AsymmetricKeyType::Rsa | AsymmetricKeyType::RsaPss => {
                let keypair = ring::signature::RsaKeyPair::from_pkcs8(private.as_der())
                    .map_err(|e| Error::key(format!("RSA private key rejected: {e}")))?;
                keypair.public().as_ref().to_vec()
            }
            #[cfg(feature = "ecdsa")]
            AsymmetricKeyType::Ec => {
                let curve = private
                    .details()
                    .named_curve
                    .ok_or_else(|| Error::key("EC key without a named curve"))?;
                ec_public_point(private.as_der(), curve)?
            }
            other => {
                return Err(Error::key(format!(
                    "cannot derive a public key for key type \"{other}\""
                )))
            }
        };

        Ok(Key::Public(AsymmetricKey {
            key_type: private.key_type.clone(),
            details: private.details.clone(),
            der,
        }))
    }

    /// Key object type (`secret`, `public` or `private`)
    pub fn kind(&self) -> &'static str {
        match self {
            Key::Secret(_) => "secret",
            Key::Public(_) => "public",
            Key::Private(_) => "private",
        }
    }

    /// An empty secret counts as no key at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Key::Secret(secret) if secret.as_bytes().is_empty())
    }

    /// Get as symmetric key
    pub fn as_symmetric(&self) -> Option<&SymmetricKey> {
        match self {
            Key::Secret(key) => Some(key),
            _ => None,
        }
    }

    /// Get the asymmetric descriptor of a public or private key
    pub fn as_asymmetric(&self) -> Option<&AsymmetricKey> {
        match self {
            Key::Public(key) | Key::Private(key) => Some(key),
            Key::Secret(_) => None,
        }
    }

    /// Get as public key or return error
    pub fn as_public(&self) -> Result<&AsymmetricKey> {
        match self {
            Key::Public(key) => Ok(key),
            other => Err(Error::key(format!(
                "expected a public key, found a {} key",
                other.kind()
            ))),
        }
    }

    /// Get as private key or return error
    pub fn as_private(&self) -> Result<&AsymmetricKey> {
        match self {
            Key::Private(key) => Ok(key),
            other => Err(Error::key(format!(
                "expected a private key, found a {} key",
                other.kind()
            ))),
        }
    }
}

#[cfg(feature = "ecdsa")]
fn ec_public_point(der: &[u8], curve: EcCurve) -> Result<Vec<u8>> {
    use ring::signature::{
        EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
    };

    let algorithm = match curve {
        EcCurve::P256 => &ECDSA_P256_SHA256_FIXED_SIGNING,
        EcCurve::P384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
        EcCurve::P521 => return Err(Error::key("P-521 keys are not supported")),
    };

    let rng = ring::rand::SystemRandom::new();
    let keypair = EcdsaKeyPair::from_pkcs8(algorithm, der, &rng)
        .map_err(|e| Error::key(format!("EC private key rejected: {e}")))?;
    Ok(keypair.public_key().as_ref().to_vec())
}

impl From<SymmetricKey> for Key {
    fn from(secret: SymmetricKey) -> Self {
        Key::Secret(secret)
    }
}

/// Symmetric key for HMAC algorithms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    secret: Vec<u8>,
}

impl SymmetricKey {
    /// Create a new symmetric key
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Get the secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl From<Vec<u8>> for SymmetricKey {
    fn from(secret: Vec<u8>) -> Self {
        Self::new(secret)
    }
}

impl From<&[u8]> for SymmetricKey {
    fn from(secret: &[u8]) -> Self {
        Self::new(secret.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for SymmetricKey {
    fn from(secret: &[u8; N]) -> Self {
        Self::new(secret.to_vec())
    }
}

impl From<String> for SymmetricKey {
    fn from(secret: String) -> Self {
        Self::new(secret.into_bytes())
    }
}

impl From<&str> for SymmetricKey {
    fn from(secret: &str) -> Self {
        Self::new(secret.as_bytes().to_vec())
    }
}

/// Asymmetric key subtype
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsymmetricKeyType {
    Rsa,
    RsaPss,
    Ec,
    /// Any other subtype (`dsa`, `ed25519`, ...), never usable here
    Other(String),
}

impl AsymmetricKeyType {
    pub fn as_str(&self) -> &str {
        match self {
            AsymmetricKeyType::Rsa => "rsa",
            AsymmetricKeyType::RsaPss => "rsa-pss",
            AsymmetricKeyType::Ec => "ec",
            AsymmetricKeyType::Other(name) => name,
        }
    }
}

impl std::fmt::Display for AsymmetricKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named elliptic curves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    /// P-256 (prime256v1)
    P256,
    /// P-384 (secp384r1)
    P384,
    /// P-521 (secp521r1)
    P521,
}

impl EcCurve {
    /// Curve name as reported by the key loader
    pub const fn name(&self) -> &'static str {
        match self {
            EcCurve::P256 => "prime256v1",
            EcCurve::P384 => "secp384r1",
            EcCurve::P521 => "secp521r1",
        }
    }
}

/// Parameters embedded in an RSA-PSS key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PssParameters {
    /// Message digest, e.g. `sha256`
    pub hash_algorithm: String,
    /// MGF1 digest, e.g. `sha256`
    pub mgf1_hash_algorithm: String,
    /// Minimum salt length in bytes
    pub salt_length: u32,
}

impl PssParameters {
    pub fn new(hash_algorithm: impl Into<String>, salt_length: u32) -> Self {
        let hash_algorithm = hash_algorithm.into();
        Self {
            mgf1_hash_algorithm: hash_algorithm.clone(),
            hash_algorithm,
            salt_length,
        }
    }
}

/// Subtype-specific key parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDetails {
    /// RSA modulus length in bits
    pub modulus_length: Option<u32>,
    /// EC curve
    pub named_curve: Option<EcCurve>,
    /// RSA-PSS restrictions
    pub pss: Option<PssParameters>,
}

/// Classified asymmetric key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricKey {
    key_type: AsymmetricKeyType,
    details: KeyDetails,
    der: Vec<u8>,
}

impl AsymmetricKey {
    /// Create a descriptor from its parts
    pub fn new(key_type: AsymmetricKeyType, details: KeyDetails, der: Vec<u8>) -> Self {
        Self {
            key_type,
            details,
            der,
        }
    }

    fn rsa(der: Vec<u8>, modulus_length: u32) -> Self {
        let details = KeyDetails {
            modulus_length: Some(modulus_length),
            ..Default::default()
        };
        Self::new(AsymmetricKeyType::Rsa, details, der)
    }

    fn rsa_pss(der: Vec<u8>, modulus_length: u32, pss: Option<PssParameters>) -> Self {
        let details = KeyDetails {
            modulus_length: Some(modulus_length),
            pss,
            ..Default::default()
        };
        Self::new(AsymmetricKeyType::RsaPss, details, der)
    }

    fn ec(der: Vec<u8>, curve: EcCurve) -> Self {
        let details = KeyDetails {
            named_curve: Some(curve),
            ..Default::default()
        };
        Self::new(AsymmetricKeyType::Ec, details, der)
    }

    pub fn key_type(&self) -> &AsymmetricKeyType {
        &self.key_type
    }

    pub fn details(&self) -> &KeyDetails {
        &self.details
    }

    /// Get the encoded key bytes
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}
