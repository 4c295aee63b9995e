use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::utils::base64url;

use ring::rand::SystemRandom;
use ring::signature::{self, RsaEncoding, RsaKeyPair, UnparsedPublicKey};

macro_rules! rsa_algorithm {
    ($name:ident, $padding:expr, $verification:expr, $doc:literal) => {
        #[doc = $doc]
        pub struct $name;

        impl Algorithm for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn sign(&self, signing_input: &str, key: &Key) -> Result<String> {
                sign_rsa(signing_input, key, &$padding)
            }

            fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<bool> {
                verify_rsa(signing_input, signature, key, &$verification)
            }
        }
    };
}

// Verification floors: 1024 bits for RS256/RS512, 2048 bits for RS384 and
// the PS family (ring has no smaller variants). Signing keys must be at least
// 2048 bits whatever the caller allows.
rsa_algorithm!(
    RS256,
    signature::RSA_PKCS1_SHA256,
    signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
    "RS256 algorithm (RSASSA-PKCS1-v1_5 with SHA-256)"
);
rsa_algorithm!(
    RS384,
    signature::RSA_PKCS1_SHA384,
    signature::RSA_PKCS1_2048_8192_SHA384,
    "RS384 algorithm (RSASSA-PKCS1-v1_5 with SHA-384)"
);
rsa_algorithm!(
    RS512,
    signature::RSA_PKCS1_SHA512,
    signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
    "RS512 algorithm (RSASSA-PKCS1-v1_5 with SHA-512)"
);
rsa_algorithm!(
    PS256,
    signature::RSA_PSS_SHA256,
    signature::RSA_PSS_2048_8192_SHA256,
    "PS256 algorithm (RSASSA-PSS with SHA-256)"
);
rsa_algorithm!(
    PS384,
    signature::RSA_PSS_SHA384,
    signature::RSA_PSS_2048_8192_SHA384,
    "PS384 algorithm (RSASSA-PSS with SHA-384)"
);
rsa_algorithm!(
    PS512,
    signature::RSA_PSS_SHA512,
    signature::RSA_PSS_2048_8192_SHA512,
    "PS512 algorithm (RSASSA-PSS with SHA-512)"
);

/// Sign with a PKCS#8 RSA private key
fn sign_rsa(signing_input: &str, key: &Key, padding: &'static dyn RsaEncoding) -> Result<String> {
    let private = key.as_private()?;
    let keypair = RsaKeyPair::from_pkcs8(private.as_der())
        .map_err(|e| Error::sign(format!("RSA private key rejected: {e}")))?;

    let rng = SystemRandom::new();
    let mut signature = vec![0u8; keypair.public().modulus_len()];
    keypair
        .sign(padding, &rng, signing_input.as_bytes(), &mut signature)
        .map_err(|_| Error::sign("RSA signing failed"))?;

    Ok(base64url::encode_bytes(&signature))
}

/// Verify against a PKCS#1 RSA public key
fn verify_rsa(
    signing_input: &str,
    signature: &str,
    key: &Key,
    algorithm: &'static dyn signature::VerificationAlgorithm,
) -> Result<bool> {
    let public = key.as_public()?;
    let signature_bytes = match base64url::decode_bytes(signature) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };

    let public_key = UnparsedPublicKey::new(algorithm, public.as_der());
    Ok(public_key
        .verify(signing_input.as_bytes(), &signature_bytes)
        .is_ok())
}
