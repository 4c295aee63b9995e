use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::keys::{Key, SymmetricKey};
use crate::utils::base64url;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

macro_rules! hmac_algorithm {
    ($name:ident, $digest:ty, $doc:literal) => {
        #[doc = $doc]
        pub struct $name;

        impl Algorithm for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn sign(&self, signing_input: &str, key: &Key) -> Result<String> {
                let mac = compute_mac::<Hmac<$digest>>(signing_input, symmetric(key)?)?;
                Ok(base64url::encode_bytes(&mac))
            }

            fn verify(&self, signing_input: &str, signature: &str, key: &Key) -> Result<bool> {
                let expected = compute_mac::<Hmac<$digest>>(signing_input, symmetric(key)?)?;
                Ok(matches_signature(signature, &expected))
            }
        }
    };
}

hmac_algorithm!(HS256, Sha256, "HS256 algorithm (HMAC with SHA-256)");
hmac_algorithm!(HS384, Sha384, "HS384 algorithm (HMAC with SHA-384)");
hmac_algorithm!(HS512, Sha512, "HS512 algorithm (HMAC with SHA-512)");

fn symmetric(key: &Key) -> Result<&SymmetricKey> {
    key.as_symmetric()
        .ok_or_else(|| Error::key(format!("HMAC needs a secret key, found a {} key", key.kind())))
}

fn compute_mac<M: Mac + hmac::digest::KeyInit>(
    signing_input: &str,
    secret: &SymmetricKey,
) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::key(format!("HMAC key rejected: {e}")))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compare a Base64URL signature against the expected MAC in constant time
fn matches_signature(signature: &str, expected: &[u8]) -> bool {
    let provided = match base64url::decode_bytes(signature) {
        Ok(provided) => provided,
        Err(_) => return false,
    };

    provided.len() == expected.len() && constant_time_eq(&provided, expected)
}
