//! # jwtclaims - Claims-Aware JWT Signing and Verification
//!
//! > Issue and verify JSON Web Tokens with a deterministic claims pipeline.
//!
//! **jwtclaims** builds claim sets at issuance time (`iat`, `exp`, `nbf`,
//! audience, issuer, subject and token id injection with conflict detection)
//! and runs a fixed, fail-fast sequence of checks at verification time.
//!
//! ## Overview
//!
//! Most JWT bugs live in the claim handling rather than the cryptography:
//! clock tolerance interacting with expiry and max-age, scalar vs. array vs.
//! pattern audiences, keys used with the wrong algorithm family, and
//! timestamp unit mix-ups. **jwtclaims** pins each of these down:
//!
//! - Relative times (`"10s"`, `"2d"`, `3600`) resolve against one frozen
//!   reference instant per call.
//! - Keys are typed descriptors. Every algorithm is matched against the key
//!   family, RSA size, EC curve and RSA-PSS parameters before any signature
//!   work happens.
//! - Verification errors come in three kinds: [`Error::Token`],
//!   [`Error::NotBefore`] and [`Error::Expired`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use jwtclaims::*;
//! use serde_json::json;
//!
//! let key = Key::secret("my-secret");
//! let payload = Payload::from_value(json!({ "sub": "user-123" }))?;
//!
//! let token = sign(
//!     &payload,
//!     Some(&key),
//!     &SignOptions::new().expires_in("1h").audience("my-api"),
//! )?;
//!
//! let verified = verify(
//!     &token,
//!     Some(&key),
//!     &VerifyOptions::new().audience("my-api"),
//! )?;
//! assert_eq!(verified.claims().and_then(|c| c.subject()), Some("user-123"));
//! ```
//!
//! ## Verification Flow
//!
//! ```text
//! options ─▶ shape ─▶ decode ─▶ key ─▶ signature presence
//!        ─▶ algorithm allow-list ─▶ key/algorithm match ─▶ signature
//!        ─▶ nbf ─▶ exp ─▶ aud ─▶ iss ─▶ sub ─▶ jti ─▶ nonce ─▶ maxAge
//!        ─▶ maxExpiration ─▶ payload (or complete token)
//! ```
//!
//! Each step stops at the first failure. [`TokenVerifier::verify`] and
//! [`TokenVerifier::verify_async`] share the pipeline; the async form can
//! resolve the key from the token header through a [`KeyLookup`].
//!
//! ## Algorithm Support
//!
//! - **HMAC** (always enabled): HS256, HS384, HS512
//! - **RSA** (with `rsa` feature): RS256, RS384, RS512, PS256, PS384, PS512
//! - **ECDSA** (with `ecdsa` feature): ES256, ES384
//! - **none**: only when listed in `algorithms` on verify
//!
//! ES512 keys are recognised by the key matcher, but no backend signs or
//! verifies P-521.
//!
//! ## Security
//!
//! ### Algorithm Confusion Prevention
//!
//! Without an explicit `algorithms` list the verifier derives one from the
//! key: HMAC for secrets, RS/PS for RSA keys, ES for EC keys. A token
//! declaring `HS256` is never checked against an RSA public key.
//!
//! ### Unsigned Tokens
//!
//! Tokens with an empty signature are rejected unless the caller lists
//! `none` in `algorithms`.
//!
//! ### Timing Attack Protection
//!
//! HMAC signature verification uses constant-time comparison via the
//! [`constant_time_eq`](https://crates.io/crates/constant_time_eq) crate.
//!
//! ## References
//!
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515): JSON Web Signature (JWS)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519): JSON Web Token (JWT)
//! - [RFC 8725](https://datatracker.ietf.org/doc/html/rfc8725): JSON Web Signature Best Practices

// Core modules
pub mod error;
pub mod timespan;
pub mod utils;

// Algorithm system
pub mod algorithm;
pub mod keys;

// Claims
pub mod claims;

// Compact encoding
pub mod token;

// Issuance and verification
pub mod refresh;
pub mod signer;
pub mod validator;

pub use algorithm::{AlgorithmId, AlgorithmPolicy};
pub use claims::{
    AudienceConstraint, AudienceMatcher, Claims, OneOrMany, Payload, PayloadEncoding,
    SignOptions, VerifyOptions,
};
pub use error::{Error, ExpiredReason, Result};
pub use keys::{AsymmetricKey, AsymmetricKeyType, EcCurve, Key, KeyDetails, PssParameters};
pub use refresh::refresh;
pub use signer::Signer;
pub use timespan::Timespan;
pub use token::{decode, DecodedToken, Header};
pub use validator::{KeyLookup, TokenVerifier, Verified};

/// Sign `payload` with `key`
///
/// `key` may be `None` only with `algorithm: none`.
pub fn sign(payload: &Payload, key: Option<&Key>, options: &SignOptions) -> Result<String> {
    Signer::new(options.clone()).sign(payload, key)
}

/// Verify `token` with `key`
///
/// `key` may be `None` only for unsigned tokens with `none` allowed.
pub fn verify(token: &str, key: Option<&Key>, options: &VerifyOptions) -> Result<Verified> {
    TokenVerifier::new(options.clone())
        .optional_key(key.cloned())
        .verify(token)
}
