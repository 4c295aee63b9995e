//! Algorithm and key compatibility rules
//!
//! Every algorithm family needs a particular kind of key. Beyond the family,
//! asymmetric keys are checked structurally: the key subtype must be one the
//! algorithm accepts, EC keys must lie on the curve the algorithm names, and
//! RSA-PSS keys with embedded parameters must agree with the algorithm's
//! digest.

use thiserror::Error;

use super::{AsymmetricKeyType, Key};
use crate::algorithm::{AlgorithmFamily, AlgorithmId, AlgorithmPolicy};

/// Smallest RSA modulus accepted for signing unless explicitly waived
pub const MIN_RSA_MODULUS_LENGTH: u32 = 2048;

/// Which pipeline is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUse {
    Sign,
    Verify,
}

impl KeyUse {
    /// Name of the key argument as it appears in messages
    pub const fn role(&self) -> &'static str {
        match self {
            KeyUse::Sign => "secretOrPrivateKey",
            KeyUse::Verify => "secretOrPublicKey",
        }
    }
}

/// Caller opt-outs for the structural checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Accept RSA keys below [`MIN_RSA_MODULUS_LENGTH`] when signing
    pub allow_insecure_key_sizes: bool,
    /// Skip the subtype, curve and RSA-PSS parameter checks
    pub allow_invalid_asymmetric_key_types: bool,
}

/// Why a key cannot be used with an algorithm
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMismatch {
    #[error("{role} must have a value")]
    MissingKey { role: &'static str },

    #[error("{role} must be a symmetric key when using {algorithm}")]
    SymmetricKeyRequired {
        role: &'static str,
        algorithm: AlgorithmId,
    },

    #[error("{role} must be an asymmetric key when using {algorithm}")]
    AsymmetricKeyRequired {
        role: &'static str,
        algorithm: AlgorithmId,
    },

    #[error("{role} has a minimum key size of {minimum} bits for {algorithm}")]
    KeyTooSmall {
        role: &'static str,
        minimum: u32,
        algorithm: AlgorithmId,
    },

    #[error("Unknown key type \"{0}\".")]
    UnknownKeyType(String),

    #[error("\"alg\" parameter for \"{key_type}\" key type must be one of: {allowed}.")]
    KeyTypeMismatch { key_type: String, allowed: String },

    #[error("\"alg\" parameter \"{algorithm}\" requires curve \"{curve}\".")]
    CurveMismatch {
        algorithm: AlgorithmId,
        curve: &'static str,
    },

    #[error("Invalid key for this operation, its RSA-PSS parameters do not meet the requirements of \"alg\" {algorithm}.")]
    PssParameters { algorithm: AlgorithmId },

    #[error("Invalid key for this operation, its RSA-PSS parameter saltLength does not meet the requirements of \"alg\" {algorithm}.")]
    PssSaltLength { algorithm: AlgorithmId },
}

/// Classifies keys and decides which algorithms they may be used with
pub struct KeyAlgorithmMatcher;

impl KeyAlgorithmMatcher {
    /// Allow-list derived from the key alone, used when the caller gives none
    pub fn default_algorithms(key: &Key) -> AlgorithmPolicy {
        match key.as_asymmetric().map(|k| k.key_type()) {
            None => AlgorithmPolicy::hmac_any(),
            Some(AsymmetricKeyType::Ec) => AlgorithmPolicy::ecdsa_any(),
            Some(_) => AlgorithmPolicy::rsa_any(),
        }
    }

    /// Algorithms a key subtype may be used with, in report order
    pub fn allowed_for_key_type(key_type: &AsymmetricKeyType) -> Option<&'static [AlgorithmId]> {
        match key_type {
            AsymmetricKeyType::Ec => {
                Some(&[AlgorithmId::ES256, AlgorithmId::ES384, AlgorithmId::ES512])
            }
            AsymmetricKeyType::Rsa => Some(&[
                AlgorithmId::RS256,
                AlgorithmId::PS256,
                AlgorithmId::RS384,
                AlgorithmId::PS384,
                AlgorithmId::RS512,
                AlgorithmId::PS512,
            ]),
            AsymmetricKeyType::RsaPss => {
                Some(&[AlgorithmId::PS256, AlgorithmId::PS384, AlgorithmId::PS512])
            }
            AsymmetricKeyType::Other(_) => None,
        }
    }

    /// Check that `key` may be used with `algorithm`
    ///
    /// The family check always runs. The minimum RSA size applies to signing
    /// only. Subtype, curve and RSA-PSS checks can be waived through
    /// [`MatchOptions::allow_invalid_asymmetric_key_types`].
    pub fn check(
        algorithm: AlgorithmId,
        key: Option<&Key>,
        usage: KeyUse,
        options: &MatchOptions,
    ) -> Result<(), KeyMismatch> {
        if algorithm == AlgorithmId::None {
            return Ok(());
        }

        let role = usage.role();
        let key = match key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(KeyMismatch::MissingKey { role }),
        };

        Self::check_family(algorithm, key, usage)?;

        let asymmetric = match key.as_asymmetric() {
            Some(asymmetric) => asymmetric,
            None => return Ok(()),
        };

        if usage == KeyUse::Sign
            && !options.allow_insecure_key_sizes
            && matches!(
                algorithm.family(),
                AlgorithmFamily::Rsa | AlgorithmFamily::RsaPss
            )
        {
            if let Some(bits) = asymmetric.details().modulus_length {
                if bits < MIN_RSA_MODULUS_LENGTH {
                    return Err(KeyMismatch::KeyTooSmall {
                        role,
                        minimum: MIN_RSA_MODULUS_LENGTH,
                        algorithm,
                    });
                }
            }
        }

        if options.allow_invalid_asymmetric_key_types {
            return Ok(());
        }

        Self::check_structure(algorithm, key)
    }

    fn check_family(algorithm: AlgorithmId, key: &Key, usage: KeyUse) -> Result<(), KeyMismatch> {
        let role = usage.role();
        match (algorithm.family(), key, usage) {
            (AlgorithmFamily::Hmac, Key::Secret(_), _) => Ok(()),
            (AlgorithmFamily::Hmac, _, _) => {
                Err(KeyMismatch::SymmetricKeyRequired { role, algorithm })
            }
            (_, Key::Private(_), KeyUse::Sign) | (_, Key::Public(_), KeyUse::Verify) => Ok(()),
            _ => Err(KeyMismatch::AsymmetricKeyRequired { role, algorithm }),
        }
    }

    /// Subtype, curve and RSA-PSS parameter checks for asymmetric keys
    pub fn check_structure(algorithm: AlgorithmId, key: &Key) -> Result<(), KeyMismatch> {
        let asymmetric = match key.as_asymmetric() {
            Some(asymmetric) if algorithm.is_asymmetric() => asymmetric,
            _ => return Ok(()),
        };

        let key_type = asymmetric.key_type();
        let allowed = Self::allowed_for_key_type(key_type)
            .ok_or_else(|| KeyMismatch::UnknownKeyType(key_type.to_string()))?;

        if !allowed.contains(&algorithm) {
            return Err(KeyMismatch::KeyTypeMismatch {
                key_type: key_type.to_string(),
                allowed: allowed
                    .iter()
                    .map(AlgorithmId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let details = asymmetric.details();
        match key_type {
            AsymmetricKeyType::Ec => {
                let required = match algorithm {
                    AlgorithmId::ES256 => super::EcCurve::P256,
                    AlgorithmId::ES384 => super::EcCurve::P384,
                    _ => super::EcCurve::P521,
                };
                if details.named_curve != Some(required) {
                    return Err(KeyMismatch::CurveMismatch {
                        algorithm,
                        curve: required.name(),
                    });
                }
            }
            AsymmetricKeyType::RsaPss => {
                if let (Some(pss), Some(bits)) = (&details.pss, algorithm.hash_bits()) {
                    let hash = format!("sha{bits}");
                    if pss.hash_algorithm != hash || pss.mgf1_hash_algorithm != hash {
                        return Err(KeyMismatch::PssParameters { algorithm });
                    }
                    if pss.salt_length > bits / 8 {
                        return Err(KeyMismatch::PssSaltLength { algorithm });
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}
