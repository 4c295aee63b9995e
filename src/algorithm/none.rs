use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::keys::Key;

/// The `none` algorithm: an empty signature segment
pub struct Unsigned;

impl Algorithm for Unsigned {
    fn name(&self) -> &'static str {
        "none"
    }

    fn sign(&self, _signing_input: &str, _key: &Key) -> Result<String> {
        Ok(String::new())
    }

    fn verify(&self, _signing_input: &str, signature: &str, _key: &Key) -> Result<bool> {
        Ok(signature.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_signature_verifies() {
        let key = Key::secret("ignored");
        assert_eq!(Unsigned.sign("a.b", &key).unwrap(), "");
        assert!(Unsigned.verify("a.b", "", &key).unwrap());
        assert!(!Unsigned.verify("a.b", "c2ln", &key).unwrap());
    }
}
