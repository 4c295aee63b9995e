//! Tests verifying protection against known JWT attack vectors
//!
//! Algorithm confusion, unsigned tokens, header tampering and key material
//! smuggled through header parameters.

use hmac::{Hmac, Mac};
use jwtclaims::utils::base64url;
use jwtclaims::*;
use sha2::Sha256;

const NOW: f64 = 1_700_000_000.0;

/// Helper: hand-build an HS256-signed token with an arbitrary header
fn forge(header: &str, payload: &str, secret: &[u8]) -> String {
    let signing_input = format!(
        "{}.{}",
        base64url::encode(header),
        base64url::encode(payload)
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).unwrap();
    mac.update(signing_input.as_bytes());
    let signature = base64url::encode_bytes(&mac.finalize().into_bytes());
    format!("{signing_input}.{signature}")
}

fn unsigned(header: &str) -> String {
    format!(
        "{}.{}.",
        base64url::encode(header),
        base64url::encode(r#"{"sub":"admin"}"#)
    )
}

fn at_now() -> VerifyOptions {
    VerifyOptions::new().clock_timestamp(NOW)
}

// ============================================================================
// "none" Algorithm Attack
// ============================================================================

#[test]
fn test_none_algorithm_case_variants_are_unknown() {
    for alg in ["None", "nOnE", "NONE"] {
        let token = unsigned(&format!(r#"{{"alg":"{alg}"}}"#));
        let err = verify(&token, None, &at_now().algorithms(vec![AlgorithmId::None])).unwrap_err();
        assert_eq!(err.message(), "invalid algorithm", "alg {alg}");
    }
}

#[test]
fn test_none_algorithm_requires_opt_in() {
    let token = unsigned(r#"{"alg":"none"}"#);

    assert_eq!(
        verify(&token, None, &at_now()).unwrap_err().message(),
        "please specify \"none\" in \"algorithms\" to verify unsigned tokens"
    );

    // an HMAC-only allow list does not admit it either
    assert_eq!(
        verify(&token, None, &at_now().algorithms(AlgorithmPolicy::hmac_any()))
            .unwrap_err()
            .message(),
        "invalid algorithm"
    );
}

#[test]
fn test_stripped_signature_with_key_is_rejected() {
    let key = Key::secret("secret");
    let token = sign(
        &Payload::from_value(serde_json::json!({ "sub": "user" })).unwrap(),
        Some(&key),
        &SignOptions::new(),
    )
    .unwrap();
    let (signing_input, _) = token.rsplit_once('.').unwrap();
    let stripped = format!("{signing_input}.");

    let err = verify(&stripped, Some(&key), &at_now()).unwrap_err();
    assert_eq!(err.message(), "jwt signature is required");

    let err = verify(
        &stripped,
        Some(&key),
        &at_now().algorithms(vec![AlgorithmId::None, AlgorithmId::HS256]),
    )
    .unwrap_err();
    assert_eq!(err.message(), "jwt signature is required");
}

#[test]
fn test_none_with_signature_is_rejected() {
    let token = forge(r#"{"alg":"none"}"#, r#"{"sub":"admin"}"#, b"anything");
    let err = verify(&token, None, &at_now().algorithms(vec![AlgorithmId::None])).unwrap_err();
    assert_eq!(err.message(), "secret or public key must be provided");
}

// ============================================================================
// Algorithm Confusion (RS256 → HS256)
// ============================================================================

#[cfg(feature = "rsa")]
#[test]
fn test_algorithm_confusion_rsa_to_hmac() {
    let public = Key::rsa_private_from_pkcs8(include_bytes!("fixtures/rsa-2048-private.pk8"))
        .unwrap()
        .to_public()
        .unwrap();
    let public_der = public.as_asymmetric().unwrap().as_der().to_vec();

    // Attack: sign with the public key bytes as an HMAC secret
    let token = forge(
        r#"{"alg":"HS256","typ":"JWT"}"#,
        r#"{"sub":"admin"}"#,
        &public_der,
    );

    // Allow list derived from the RSA key excludes HS256
    let err = verify(&token, Some(&public), &at_now()).unwrap_err();
    assert_eq!(err.message(), "invalid algorithm");

    // Even with HS256 allowed, an RSA key never becomes an HMAC secret
    let err = verify(
        &token,
        Some(&public),
        &at_now().algorithms(vec![AlgorithmId::HS256, AlgorithmId::RS256]),
    )
    .unwrap_err();
    assert_eq!(
        err.message(),
        "secretOrPublicKey must be a symmetric key when using HS256"
    );
}

#[test]
fn test_algorithm_confusion_hmac_to_rsa() {
    let key = Key::secret("secret");
    let token = forge(r#"{"alg":"HS256"}"#, r#"{"sub":"admin"}"#, b"secret");

    let err = verify(&token, Some(&key), &at_now().algorithms(AlgorithmPolicy::rsa_any()))
        .unwrap_err();
    assert_eq!(err.message(), "invalid algorithm");
}

#[cfg(feature = "ecdsa")]
#[test]
fn test_algorithm_confusion_ecdsa_to_hmac() {
    let public = Key::ec_private_from_pkcs8(
        include_bytes!("fixtures/ec-p256-private.pk8"),
        EcCurve::P256,
    )
    .unwrap()
    .to_public()
    .unwrap();
    let point = public.as_asymmetric().unwrap().as_der().to_vec();

    let token = forge(r#"{"alg":"HS256"}"#, r#"{"sub":"admin"}"#, &point);
    let err = verify(&token, Some(&public), &at_now()).unwrap_err();
    assert_eq!(err.message(), "invalid algorithm");
}

// ============================================================================
// Header and Payload Tampering
// ============================================================================

#[test]
fn test_algorithm_downgrade_in_header() {
    let key = Key::secret("secret");
    let token = Signer::new(SignOptions::new().algorithm(AlgorithmId::HS512))
        .issued_at(NOW)
        .sign(&Payload::from("data"), Some(&key))
        .unwrap();

    let downgraded = base64url::encode(r#"{"alg":"HS256"}"#);
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[0] = &downgraded;
    let tampered = parts.join(".");

    let err = verify(&tampered, Some(&key), &at_now()).unwrap_err();
    assert_eq!(err.message(), "invalid signature");
}

#[test]
fn test_payload_tampering() {
    let key = Key::secret("secret");
    let token = forge(r#"{"alg":"HS256"}"#, r#"{"sub":"user"}"#, b"secret");
    assert!(verify(&token, Some(&key), &at_now()).is_ok());

    let elevated = base64url::encode(r#"{"sub":"admin"}"#);
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[1] = &elevated;

    let err = verify(&parts.join("."), Some(&key), &at_now()).unwrap_err();
    assert_eq!(err.message(), "invalid signature");
}

// ============================================================================
// Key Material in Header Parameters
// ============================================================================

#[test]
fn test_embedded_jwk_is_ignored() {
    // The attacker signs with their own secret and ships it as a "jwk"
    let token = forge(
        r#"{"alg":"HS256","jwk":{"kty":"oct","k":"YXR0YWNrZXI"},"jku":"https://attacker.example/jwks"}"#,
        r#"{"sub":"admin"}"#,
        b"attacker",
    );

    let err = verify(&token, Some(&Key::secret("secret")), &at_now()).unwrap_err();
    assert_eq!(err.message(), "invalid signature");

    // The parameters are still visible to callers, untouched
    let decoded = decode(&token).unwrap();
    assert!(decoded.header.extra.contains_key("jwk"));
    assert!(decoded.header.extra.contains_key("jku"));
}

#[test]
fn test_kid_is_opaque() {
    for kid in ["../../dev/null", "' OR '1'='1", "key; rm -rf /"] {
        let header = format!(r#"{{"alg":"HS256","kid":"{kid}"}}"#);
        let token = forge(&header, r#"{"sub":"user"}"#, b"secret");

        let verified = verify(&token, Some(&Key::secret("secret")), &at_now().complete()).unwrap();
        assert_eq!(verified.header().unwrap().key_id(), Some(kid));

        let err = verify(&token, Some(&Key::secret("other")), &at_now()).unwrap_err();
        assert_eq!(err.message(), "invalid signature");
    }
}

// ============================================================================
// Empty Secrets
// ============================================================================

#[test]
fn test_empty_secret_is_no_key() {
    let token = forge(r#"{"alg":"HS256"}"#, r#"{"sub":"admin"}"#, b"");

    let err = verify(&token, Some(&Key::secret("")), &at_now()).unwrap_err();
    assert_eq!(err.message(), "secret or public key must be provided");

    let err = sign(&Payload::from("data"), Some(&Key::secret("")), &SignOptions::new())
        .unwrap_err();
    assert_eq!(err.message(), "secretOrPrivateKey must have a value");
}
