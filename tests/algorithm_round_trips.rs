use jwtclaims::*;
use serde_json::json;

const NOW: f64 = 1_700_000_000.0;

fn payload() -> Payload {
    Payload::from_value(json!({ "sub": "user-1", "admin": true })).unwrap()
}

fn sign_at(key: &Key, algorithm: AlgorithmId) -> Result<String> {
    Signer::new(SignOptions::new().algorithm(algorithm).expires_in("1h"))
        .issued_at(NOW)
        .sign(&payload(), Some(key))
}

fn verify_at(token: &str, key: &Key) -> Result<Verified> {
    verify(token, Some(key), &VerifyOptions::new().clock_timestamp(NOW))
}

fn assert_round_trip(private: &Key, public: &Key, algorithm: AlgorithmId) {
    let token = sign_at(private, algorithm).unwrap();
    let verified = verify_at(&token, public).unwrap();

    let claims = verified.claims().unwrap();
    assert_eq!(claims.subject(), Some("user-1"));
    assert_eq!(claims.get("admin"), Some(&json!(true)));
    assert_eq!(claims.issued_at(), Some(NOW));
    assert_eq!(claims.expiration(), Some(NOW + 3600.0));
    assert_eq!(decode(&token).unwrap().header.alg, algorithm.as_str());
}

#[cfg(feature = "rsa")]
fn rsa_keys() -> (Key, Key) {
    let private =
        Key::rsa_private_from_pkcs8(include_bytes!("fixtures/rsa-2048-private.pk8")).unwrap();
    let public = private.to_public().unwrap();
    (private, public)
}

#[test]
fn hmac_round_trips() {
    let key = Key::secret("a-shared-secret");
    for algorithm in [AlgorithmId::HS256, AlgorithmId::HS384, AlgorithmId::HS512] {
        assert_round_trip(&key, &key, algorithm);
    }
}

#[test]
fn hmac_default_algorithm_is_hs256() {
    let key = Key::secret("a-shared-secret");
    let token = sign(&payload(), Some(&key), &SignOptions::new()).unwrap();
    assert_eq!(decode(&token).unwrap().header.alg, "HS256");
}

#[cfg(feature = "rsa")]
#[test]
fn rsa_round_trips() {
    let (private, public) = rsa_keys();
    for algorithm in [
        AlgorithmId::RS256,
        AlgorithmId::RS384,
        AlgorithmId::RS512,
        AlgorithmId::PS256,
        AlgorithmId::PS384,
        AlgorithmId::PS512,
    ] {
        assert_round_trip(&private, &public, algorithm);
    }
}

#[cfg(feature = "rsa")]
#[test]
fn rsa_wrong_public_key_is_invalid_signature() {
    let (private, _) = rsa_keys();
    let other = Key::rsa_private_from_pkcs8(include_bytes!("fixtures/rsa-2048-other-private.pk8"))
        .unwrap()
        .to_public()
        .unwrap();

    let token = sign_at(&private, AlgorithmId::RS256).unwrap();
    assert_eq!(
        verify_at(&token, &other).unwrap_err().message(),
        "invalid signature"
    );
}

#[cfg(feature = "ecdsa")]
#[test]
fn ecdsa_round_trips() {
    let p256 = Key::ec_private_from_pkcs8(
        include_bytes!("fixtures/ec-p256-private.pk8"),
        EcCurve::P256,
    )
    .unwrap();
    assert_round_trip(&p256, &p256.to_public().unwrap(), AlgorithmId::ES256);

    let p384 = Key::ec_private_from_pkcs8(
        include_bytes!("fixtures/ec-p384-private.pk8"),
        EcCurve::P384,
    )
    .unwrap();
    assert_round_trip(&p384, &p384.to_public().unwrap(), AlgorithmId::ES384);
}

#[cfg(feature = "ecdsa")]
#[test]
fn ecdsa_curve_must_match_algorithm() {
    let p256 = Key::ec_private_from_pkcs8(
        include_bytes!("fixtures/ec-p256-private.pk8"),
        EcCurve::P256,
    )
    .unwrap();

    let err = sign_at(&p256, AlgorithmId::ES384).unwrap_err();
    assert_eq!(
        err,
        Error::Sign("\"alg\" parameter \"ES384\" requires curve \"secp384r1\".".to_string())
    );
}

// Signing with an RSA private key and an HMAC algorithm fails before signing
#[cfg(feature = "rsa")]
#[test]
fn rsa_key_with_hmac_algorithm_is_rejected_on_sign() {
    let (private, _) = rsa_keys();
    let err = sign_at(&private, AlgorithmId::HS256).unwrap_err();
    assert_eq!(err.name(), "SignError");
    assert_eq!(
        err.message(),
        "secretOrPrivateKey must be a symmetric key when using HS256"
    );
}

// An RSA-signed token checked against a secret fails on the key type, not the signature
#[cfg(feature = "rsa")]
#[test]
fn rsa_token_with_secret_is_a_key_type_error() {
    let (private, _) = rsa_keys();
    let token = sign_at(&private, AlgorithmId::RS256).unwrap();

    let err = verify(
        &token,
        Some(&Key::secret("secret")),
        &VerifyOptions::new()
            .clock_timestamp(NOW)
            .algorithms(vec![AlgorithmId::RS256]),
    )
    .unwrap_err();
    assert_eq!(
        err.message(),
        "secretOrPublicKey must be an asymmetric key when using RS256"
    );
}

#[cfg(feature = "rsa")]
#[test]
fn rsa_private_key_cannot_verify() {
    let (private, _) = rsa_keys();
    let token = sign_at(&private, AlgorithmId::RS256).unwrap();
    assert_eq!(
        verify_at(&token, &private).unwrap_err().message(),
        "secretOrPublicKey must be an asymmetric key when using RS256"
    );
}

#[cfg(feature = "rsa")]
fn rsa_1024_public() -> Key {
    Key::rsa_public(include_bytes!("fixtures/rsa-1024-public.der").to_vec(), 1024)
}

// Tokens signed elsewhere with a 1024-bit key verify with RS256 and RS512
#[cfg(feature = "rsa")]
#[test]
fn legacy_1024_bit_rsa_tokens_verify() {
    let public = rsa_1024_public();

    for (token, algorithm) in [
        (include_str!("fixtures/rsa-1024-rs256.jwt"), AlgorithmId::RS256),
        (include_str!("fixtures/rsa-1024-rs512.jwt"), AlgorithmId::RS512),
    ] {
        let verified = verify(
            token.trim(),
            Some(&public),
            &VerifyOptions::new()
                .clock_timestamp(NOW)
                .algorithms(vec![algorithm]),
        )
        .unwrap();
        assert_eq!(verified.claims().unwrap().subject(), Some("legacy"));
    }
}

// PSS verification needs at least 2048 bits
#[cfg(feature = "rsa")]
#[test]
fn legacy_1024_bit_pss_tokens_do_not_verify() {
    let err = verify(
        include_str!("fixtures/rsa-1024-ps256.jwt").trim(),
        Some(&rsa_1024_public()),
        &VerifyOptions::new().clock_timestamp(NOW),
    )
    .unwrap_err();
    assert_eq!(err.message(), "invalid signature");
}

#[cfg(feature = "rsa")]
#[test]
fn small_rsa_keys_cannot_sign() {
    let small = Key::rsa_private(include_bytes!("fixtures/rsa-1024-private.pk8").to_vec(), 1024);

    let err = sign_at(&small, AlgorithmId::RS256).unwrap_err();
    assert_eq!(
        err.message(),
        "secretOrPrivateKey has a minimum key size of 2048 bits for RS256"
    );

    // Waiving the size check still leaves the backend's own 2048-bit floor
    let err = Signer::new(
        SignOptions::new()
            .algorithm(AlgorithmId::RS256)
            .allow_insecure_key_sizes(),
    )
    .issued_at(NOW)
    .sign(&payload(), Some(&small))
    .unwrap_err();
    assert_eq!(err.name(), "SignError");
    assert!(err.message().starts_with("RSA private key rejected"));
}

// The size check trusts the declared modulus length
#[cfg(feature = "rsa")]
#[test]
fn declared_rsa_size_is_checked_on_sign_only() {
    let (private, public) = rsa_keys();
    let der = private.as_asymmetric().unwrap().as_der().to_vec();
    let mislabelled = Key::rsa_private(der, 1024);

    assert!(sign_at(&mislabelled, AlgorithmId::RS256).is_err());

    let token = Signer::new(
        SignOptions::new()
            .algorithm(AlgorithmId::RS256)
            .allow_insecure_key_sizes(),
    )
    .issued_at(NOW)
    .sign(&payload(), Some(&mislabelled))
    .unwrap();
    assert!(verify_at(&token, &public).is_ok());
}

#[cfg(feature = "rsa")]
#[test]
fn rsa_pss_key_only_signs_ps_algorithms() {
    let (private, _) = rsa_keys();
    let der = private.as_asymmetric().unwrap().as_der().to_vec();
    let pss = Key::rsa_pss_private(der, 2048, Some(PssParameters::new("sha256", 32)));

    let err = sign_at(&pss, AlgorithmId::RS256).unwrap_err();
    assert_eq!(
        err.message(),
        "\"alg\" parameter for \"rsa-pss\" key type must be one of: PS256, PS384, PS512."
    );

    let err = sign_at(&pss, AlgorithmId::PS384).unwrap_err();
    assert_eq!(
        err.message(),
        "Invalid key for this operation, its RSA-PSS parameters do not meet the requirements of \"alg\" PS384."
    );

    assert!(sign_at(&pss, AlgorithmId::PS256).is_ok());
}

#[cfg(feature = "ecdsa")]
#[test]
fn es512_has_no_backend() {
    let p256 = Key::ec_private_from_pkcs8(
        include_bytes!("fixtures/ec-p256-private.pk8"),
        EcCurve::P256,
    )
    .unwrap();
    let der = p256.as_asymmetric().unwrap().as_der().to_vec();
    let p521 = Key::ec_private(der, EcCurve::P521);

    let err = sign_at(&p521, AlgorithmId::ES512).unwrap_err();
    assert_eq!(err.name(), "SignError");
}
