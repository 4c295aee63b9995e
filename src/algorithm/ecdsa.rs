use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::keys::{AsymmetricKey, EcCurve, Key};
use crate::utils::base64url;

use ring::rand::SystemRandom;
use ring::signature::{self, EcdsaKeyPair, EcdsaSigningAlgorithm, UnparsedPublicKey};

/// ES256 algorithm (ECDSA with P-256 and SHA-256)
pub struct ES256;

/// ES384 algorithm (ECDSA with P-384 and SHA-384)
pub struct ES384;

impl Algorithm for ES256 {
    fn name(&self) -> &'static str {
        "ES256"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<String> {
        let private = curve_checked(key.as_private()?, EcCurve::P256, "ES256")?;
        sign_ecdsa(
            signing_input,
            private.as_der(),
            &signature::ECDSA_P256_SHA256_FIXED_SIGNING,
        )
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<bool> {
        let public = curve_checked(key.as_public()?, EcCurve::P256, "ES256")?;
        verify_ecdsa(
            signing_input,
            signature,
            public.as_der(),
            &signature::ECDSA_P256_SHA256_FIXED,
        )
    }
}

impl Algorithm for ES384 {
    fn name(&self) -> &'static str {
        "ES384"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<String> {
        let private = curve_checked(key.as_private()?, EcCurve::P384, "ES384")?;
        sign_ecdsa(
            signing_input,
            private.as_der(),
            &signature::ECDSA_P384_SHA384_FIXED_SIGNING,
        )
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<bool> {
        let public = curve_checked(key.as_public()?, EcCurve::P384, "ES384")?;
        verify_ecdsa(
            signing_input,
            signature,
            public.as_der(),
            &signature::ECDSA_P384_SHA384_FIXED,
        )
    }
}

// The curve is part of the algorithm, so the backend refuses other curves
// even when structural checks were waived by the caller.
fn curve_checked<'a>(
    key: &'a AsymmetricKey,
    curve: EcCurve,
    algorithm: &str,
) -> Result<&'a AsymmetricKey> {
    match key.details().named_curve {
        Some(found) if found == curve => Ok(key),
        found => Err(Error::key(format!(
            "{algorithm} needs a {} key, found {}",
            curve.name(),
            found.map(|c| c.name()).unwrap_or("no curve")
        ))),
    }
}

/// Sign with a PKCS#8 EC private key, producing a fixed-width R||S signature
fn sign_ecdsa(
    signing_input: &str,
    private_key_der: &[u8],
    algorithm: &'static EcdsaSigningAlgorithm,
) -> Result<String> {
    let rng = SystemRandom::new();
    let keypair = EcdsaKeyPair::from_pkcs8(algorithm, private_key_der, &rng)
        .map_err(|e| Error::sign(format!("EC private key rejected: {e}")))?;
    let signature = keypair
        .sign(&rng, signing_input.as_bytes())
        .map_err(|_| Error::sign("ECDSA signing failed"))?;

    Ok(base64url::encode_bytes(signature.as_ref()))
}

/// JWT ECDSA signatures use the fixed-width (IEEE P1363) format, not ASN.1
fn verify_ecdsa(
    signing_input: &str,
    signature: &str,
    public_key: &[u8],
    algorithm: &'static dyn signature::VerificationAlgorithm,
) -> Result<bool> {
    let signature_bytes = match base64url::decode_bytes(signature) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };

    let public_key = UnparsedPublicKey::new(algorithm, public_key);
    Ok(public_key
        .verify(signing_input.as_bytes(), &signature_bytes)
        .is_ok())
}
