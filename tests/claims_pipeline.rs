use jwtclaims::algorithm::Algorithm;
use jwtclaims::*;
use regex::Regex;
use serde_json::{json, Value};

const NOW: f64 = 1_000_000.0;

fn key() -> Key {
    Key::secret("shhhhh")
}

fn issue(claims: Value, options: SignOptions) -> String {
    Signer::new(options)
        .issued_at(NOW)
        .sign(&Payload::from_value(claims).unwrap(), Some(&key()))
        .unwrap()
}

fn check(token: &str, options: VerifyOptions) -> Result<Verified> {
    verify(token, Some(&key()), &options)
}

#[test]
fn round_trip_adds_only_iat() {
    let claims = json!({ "foo": "bar", "nested": { "n": [1, 2, 3] } });
    let token = issue(claims.clone(), SignOptions::new());
    let verified = check(&token, VerifyOptions::new().clock_timestamp(NOW)).unwrap();

    let mut expected = claims.as_object().unwrap().clone();
    expected.insert("iat".to_string(), json!(NOW as i64));
    assert_eq!(verified.claims().unwrap().as_map(), &expected);
}

#[test]
fn expiry_boundary() {
    let token = issue(json!({ "exp": NOW as i64 }), SignOptions::new());

    let at = |now: f64| check(&token, VerifyOptions::new().clock_timestamp(now));

    let err = at(NOW).unwrap_err();
    assert_eq!(err.name(), "TokenExpiredError");
    assert_eq!(err.message(), "jwt expired");
    assert_eq!(err.expired_at().unwrap().timestamp(), NOW as i64);

    assert!(at(NOW + 1.0).is_err());
    assert!(at(NOW - 1.0).is_ok());
}

#[test]
fn clock_tolerance_is_symmetric() {
    let tolerance = 5.0;
    let token = issue(json!({ "exp": (NOW - tolerance) as i64 }), SignOptions::new());

    let options = VerifyOptions::new().clock_timestamp(NOW);
    assert!(check(&token, options.clone().clock_tolerance(tolerance)).is_err());
    assert!(check(&token, options.clone().clock_tolerance(tolerance + 1.0)).is_ok());
    assert!(check(&token, options.clock_tolerance(tolerance - 1.0)).is_err());

    let token = issue(json!({ "nbf": (NOW + tolerance) as i64 }), SignOptions::new());
    let options = VerifyOptions::new().clock_timestamp(NOW);
    assert!(check(&token, options.clone().clock_tolerance(tolerance)).is_ok());

    let err = check(&token, options.clock_tolerance(tolerance - 1.0)).unwrap_err();
    assert_eq!(err.name(), "NotBeforeError");
    assert_eq!(err.date().unwrap().timestamp(), (NOW + tolerance) as i64);
}

#[test]
fn expires_in_and_not_before_use_the_issue_time() {
    let token = issue(json!({}), SignOptions::new().expires_in("10 s").not_before("2s"));
    let claims = decode(&token).unwrap().payload.into_claims().unwrap();
    assert_eq!(claims.get("exp"), Some(&json!(NOW as i64 + 10)));
    assert_eq!(claims.get("nbf"), Some(&json!(NOW as i64 + 2)));

    let options = VerifyOptions::new();
    assert!(check(&token, options.clone().clock_timestamp(NOW + 1.0)).is_err());
    assert!(check(&token, options.clone().clock_timestamp(NOW + 2.0)).is_ok());
    assert!(check(&token, options.clock_timestamp(NOW + 10.0)).is_err());
}

#[test]
fn audience_matching() {
    let token = issue(json!({}), SignOptions::new().audience(vec!["urn:foo", "urn:bar"]));
    let options = VerifyOptions::new().clock_timestamp(NOW);

    assert!(check(&token, options.clone().audience("urn:bar")).is_ok());
    assert!(check(&token, options.clone().audience(vec!["urn:x", "urn:bar"])).is_ok());
    assert!(check(
        &token,
        options
            .clone()
            .audience(Regex::new("^urn:b[ar]{2}$").unwrap())
    )
    .is_ok());

    let err = check(&token, options.clone().audience("urn:none")).unwrap_err();
    assert_eq!(err.message(), "jwt audience invalid. expected: urn:none");

    let err = check(&token, options.audience(vec!["urn:x", "urn:y"])).unwrap_err();
    assert_eq!(err.message(), "jwt audience invalid. expected: urn:x or urn:y");
}

#[test]
fn audience_predicate_sees_the_whole_claim() {
    let token = issue(json!({ "aud": ["a", "b"] }), SignOptions::new());
    let options = VerifyOptions::new().clock_timestamp(NOW);

    let whole = AudienceConstraint::new().predicate(|aud| aud == &json!(["a", "b"]));
    assert!(check(&token, options.clone().audience(whole)).is_ok());

    let element = AudienceConstraint::new().predicate(|aud| aud == &json!("a"));
    let err = check(&token, options.audience(element)).unwrap_err();
    assert_eq!(err.message(), "jwt audience invalid. expected: [predicate]");
}

#[test]
fn option_claim_collision_is_an_error() {
    let err = Signer::new(SignOptions::new().issuer("b"))
        .sign(
            &Payload::from_value(json!({ "iss": "a" })).unwrap(),
            Some(&key()),
        )
        .unwrap_err();
    assert_eq!(
        err.message(),
        "Bad \"options.issuer\" option. The payload already has an \"iss\" property."
    );
}

#[test]
fn issuer_subject_jwtid() {
    let token = issue(
        json!({}),
        SignOptions::new().issuer("auth").subject("user").jwtid("id-1"),
    );
    let options = VerifyOptions::new().clock_timestamp(NOW);

    assert!(check(
        &token,
        options
            .clone()
            .issuer(vec!["other", "auth"])
            .subject("user")
            .jwtid("id-1")
    )
    .is_ok());

    assert_eq!(
        check(&token, options.clone().issuer("other")).unwrap_err().message(),
        "jwt issuer invalid. expected: other"
    );
    assert_eq!(
        check(&token, options.clone().subject("admin")).unwrap_err().message(),
        "jwt subject invalid. expected: admin"
    );
    assert_eq!(
        check(&token, options.jwtid("id-2")).unwrap_err().message(),
        "jwt jwtid invalid. expected: id-2"
    );
}

#[test]
fn nonce() {
    let token = issue(json!({ "nonce": "abc" }), SignOptions::new());
    let options = VerifyOptions::new().clock_timestamp(NOW);

    assert!(check(&token, options.clone().nonce("abc")).is_ok());
    assert_eq!(
        check(&token, options.clone().nonce("xyz")).unwrap_err().message(),
        "jwt nonce invalid. expected: xyz"
    );
    assert_eq!(
        check(&token, options.nonce("")).unwrap_err().message(),
        "nonce must be a non-empty string"
    );
}

#[test]
fn max_age_requires_iat() {
    let token = issue(json!({}), SignOptions::new().no_timestamp());
    let err = check(&token, VerifyOptions::new().clock_timestamp(NOW).max_age("1m")).unwrap_err();
    assert_eq!(err.message(), "iat required when maxAge is specified");
}

#[test]
fn max_age_with_tolerance() {
    let token = issue(json!({}), SignOptions::new());
    let options = VerifyOptions::new().max_age("2d");
    let two_days = 2.0 * 86_400.0;

    assert!(check(&token, options.clone().clock_timestamp(NOW + two_days - 1.0)).is_ok());

    let err = check(&token, options.clone().clock_timestamp(NOW + two_days)).unwrap_err();
    assert_eq!(err.message(), "maxAge exceeded");
    assert_eq!(err.expired_at().unwrap().timestamp(), (NOW + two_days) as i64);

    assert!(check(
        &token,
        options.clock_timestamp(NOW + two_days).clock_tolerance(1.0)
    )
    .is_ok());
}

#[test]
fn max_expiration() {
    let token = Signer::new(SignOptions::new())
        .issued_at(70.0)
        .sign(
            &Payload::from_value(json!({ "exp": 72 })).unwrap(),
            Some(&key()),
        )
        .unwrap();
    let options = VerifyOptions::new().clock_timestamp(70.0);

    assert!(check(&token, options.clone().max_expiration("3s")).is_ok());
    assert!(check(&token, options.clone().max_expiration(3)).is_ok());

    for (expression, rendered) in [
        (Timespan::from("1s"), "1s"),
        (Timespan::from(-3), "-3"),
        (Timespan::from("-3s"), "-3s"),
    ] {
        let err = check(&token, options.clone().max_expiration(expression)).unwrap_err();
        assert_eq!(
            err.message(),
            format!("jwt expiration is longer then the specified maxExpiration: {rendered}")
        );
    }
}

#[test]
fn iat_reference_for_relative_expiry() {
    let token = Signer::new(SignOptions::new().expires_in(-10))
        .issued_at(NOW)
        .sign(
            &Payload::from_value(json!({ "iat": 80 })).unwrap(),
            Some(&key()),
        )
        .unwrap();
    let claims = decode(&token).unwrap().payload.into_claims().unwrap();
    assert_eq!(claims.get("iat"), Some(&json!(80)));
    assert_eq!(claims.get("exp"), Some(&json!(70)));
}

#[test]
fn options_are_unchanged_after_calls() {
    let sign_options = SignOptions::new()
        .expires_in("1h")
        .audience("api")
        .header("foo", "bar");
    let before = sign_options.clone();
    let token = sign(
        &Payload::from_value(json!({})).unwrap(),
        Some(&key()),
        &sign_options,
    )
    .unwrap();
    assert_eq!(sign_options, before);

    let verify_options = VerifyOptions::new().audience("api").max_age("2h");
    let before = format!("{verify_options:?}");
    check(&token, verify_options.clone()).unwrap();
    verify(&token, Some(&key()), &verify_options).unwrap();
    assert_eq!(format!("{verify_options:?}"), before);
}

#[test]
fn non_numeric_time_claims_are_rejected() {
    let header = jwtclaims::utils::base64url::encode(r#"{"alg":"HS256","typ":"JWT"}"#);

    for (payload, message) in [
        (r#"{"exp":"soon"}"#, "invalid exp value"),
        (r#"{"nbf":{}}"#, "invalid nbf value"),
    ] {
        let body = jwtclaims::utils::base64url::encode(payload);
        let signing_input = format!("{header}.{body}");
        let signature = jwtclaims::algorithm::get_backend(&AlgorithmId::HS256)
            .unwrap()
            .sign(&signing_input, &key())
            .unwrap();
        let token = format!("{signing_input}.{signature}");

        let err = check(&token, VerifyOptions::new().clock_timestamp(NOW)).unwrap_err();
        assert_eq!(err.message(), message);
    }
}
