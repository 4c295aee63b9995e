//! Token verification
//!
//! [`TokenVerifier`] holds the verification options and a key source, then
//! runs the verification pipeline for each token. The sync and async entry
//! points share one pipeline; the only difference is how the key is obtained.
//!
//! Pipeline order:
//!
//! 1. Option sanity (`nonce`, `clockTimestamp`)
//! 2. Input shape and structural decode
//! 3. Key resolution (static key or async lookup)
//! 4. Signature presence against key presence
//! 5. Algorithm allow-list (explicit or derived from the key)
//! 6. Key/algorithm compatibility
//! 7. Signature
//! 8. Claims (see [`ClaimsValidator`])

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::algorithm::{get_backend, AlgorithmId, AlgorithmPolicy};
use crate::claims::{Claims, ClaimsValidator, Payload, VerifyOptions};
use crate::error::{Error, Result};
use crate::keys::{Key, KeyAlgorithmMatcher, KeyUse, MatchOptions};
use crate::token::{decode, DecodedToken, Header};
use crate::utils::time;

/// Future returned by a [`KeyLookup`]
pub type KeyLookupFuture = Pin<Box<dyn Future<Output = Result<Option<Key>>> + Send>>;

/// Async key resolution from the token header
///
/// Resolves to the key to verify with, or `None` for no key.
pub type KeyLookup = Arc<dyn Fn(Header) -> KeyLookupFuture + Send + Sync>;

#[derive(Clone)]
enum KeySource {
    Static(Option<Key>),
    Lookup(KeyLookup),
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Static(key) => f
                .debug_tuple("Static")
                .field(&key.as_ref().map(Key::kind))
                .finish(),
            KeySource::Lookup(_) => f.write_str("Lookup(..)"),
        }
    }
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq)]
pub enum Verified {
    /// The payload only
    Payload(Payload),

    /// Header, payload and signature (`complete` option)
    Complete(DecodedToken),
}

impl Verified {
    pub fn payload(&self) -> &Payload {
        match self {
            Verified::Payload(payload) => payload,
            Verified::Complete(decoded) => &decoded.payload,
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.payload().as_claims()
    }

    /// Header, when verified with `complete`
    pub fn header(&self) -> Option<&Header> {
        match self {
            Verified::Payload(_) => None,
            Verified::Complete(decoded) => Some(&decoded.header),
        }
    }

    pub fn into_payload(self) -> Payload {
        match self {
            Verified::Payload(payload) => payload,
            Verified::Complete(decoded) => decoded.payload,
        }
    }
}

/// Verifies compact tokens against a key and a set of options
///
/// # Example
///
/// ```ignore
/// let verified = TokenVerifier::new(
///     VerifyOptions::new()
///         .algorithms(vec![AlgorithmId::HS256])
///         .audience("my-api"),
/// )
/// .key(Key::secret("secret"))
/// .verify(token)?;
///
/// println!("sub: {:?}", verified.claims().and_then(|c| c.subject()));
/// ```
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    options: VerifyOptions,
    key: KeySource,
}

impl TokenVerifier {
    pub fn new(options: VerifyOptions) -> Self {
        Self {
            options,
            key: KeySource::Static(None),
        }
    }

    /// Verify with a fixed key
    pub fn key(mut self, key: Key) -> Self {
        self.key = KeySource::Static(Some(key));
        self
    }

    /// Verify with an optional fixed key
    pub fn optional_key(mut self, key: Option<Key>) -> Self {
        self.key = KeySource::Static(key);
        self
    }

    /// Verify without any key (unsigned tokens only)
    pub fn without_key(mut self) -> Self {
        self.key = KeySource::Static(None);
        self
    }

    /// Resolve the key from the token header
    ///
    /// Only [`TokenVerifier::verify_async`] can use a lookup.
    pub fn key_lookup<F, Fut>(mut self, lookup: F) -> Self
    where
        F: Fn(Header) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Key>>> + Send + 'static,
    {
        let lookup: KeyLookup =
            Arc::new(move |header| -> KeyLookupFuture { Box::pin(lookup(header)) });
        self.key = KeySource::Lookup(lookup);
        self
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify synchronously
    pub fn verify(&self, token: &str) -> Result<Verified> {
        let result = self.prepare(token).and_then(|(decoded, now)| {
            let key = match &self.key {
                KeySource::Static(key) => key.as_ref(),
                KeySource::Lookup(_) => {
                    return Err(Error::token(
                        "verify must be called asynchronous if secret or public key is provided as a callback",
                    ))
                }
            };
            finish(token, decoded, key, &self.options, now)
        });
        log_outcome(&result);
        result
    }

    /// Verify, awaiting the key lookup when one is configured
    pub async fn verify_async(&self, token: &str) -> Result<Verified> {
        let result = self.verify_with_lookup(token).await;
        log_outcome(&result);
        result
    }

    async fn verify_with_lookup(&self, token: &str) -> Result<Verified> {
        let (decoded, now) = self.prepare(token)?;

        let key = match &self.key {
            KeySource::Static(key) => key.clone(),
            KeySource::Lookup(lookup) => lookup(decoded.header.clone()).await.map_err(|err| {
                Error::token(format!(
                    "error in secret or public key callback: {}",
                    err.message()
                ))
            })?,
        };

        finish(token, decoded, key.as_ref(), &self.options, now)
    }

    /// Option checks, clock freeze and decode
    fn prepare(&self, token: &str) -> Result<(DecodedToken, f64)> {
        check_options(&self.options)?;
        let now = self.options.clock_timestamp.unwrap_or_else(time::now);

        if token.is_empty() {
            return Err(Error::token("jwt must be provided"));
        }
        if token.split('.').count() != 3 {
            return Err(Error::token("jwt malformed"));
        }

        let decoded = decode(token).ok_or_else(|| Error::token("invalid token"))?;
        tracing::debug!(alg = %decoded.header.alg, kid = ?decoded.header.kid, "verifying token");
        Ok((decoded, now))
    }
}

fn check_options(options: &VerifyOptions) -> Result<()> {
    if let Some(nonce) = &options.nonce {
        if nonce.trim().is_empty() {
            return Err(Error::token("nonce must be a non-empty string"));
        }
    }
    if let Some(timestamp) = options.clock_timestamp {
        if !timestamp.is_finite() {
            return Err(Error::token("clockTimestamp must be a number"));
        }
    }
    Ok(())
}

/// Steps shared by the sync and async paths, from signature presence on
fn finish(
    token: &str,
    decoded: DecodedToken,
    key: Option<&Key>,
    options: &VerifyOptions,
    now: f64,
) -> Result<Verified> {
    let key = key.filter(|key| !key.is_empty());
    let has_signature = !decoded.signature.trim().is_empty();

    if !has_signature && key.is_some() {
        return Err(Error::token("jwt signature is required"));
    }
    if has_signature && key.is_none() {
        return Err(Error::token("secret or public key must be provided"));
    }
    if !has_signature && options.algorithms.is_none() {
        return Err(Error::token(
            "please specify \"none\" in \"algorithms\" to verify unsigned tokens",
        ));
    }

    let policy: Cow<'_, AlgorithmPolicy> = match (&options.algorithms, key) {
        (Some(policy), _) => Cow::Borrowed(policy),
        (None, Some(key)) => Cow::Owned(KeyAlgorithmMatcher::default_algorithms(key)),
        (None, None) => return Err(Error::token("secret or public key must be provided")),
    };
    let algorithm = match decoded.header.algorithm() {
        Some(algorithm) if policy.is_allowed(&algorithm) => algorithm,
        _ => return Err(Error::token("invalid algorithm")),
    };

    let match_options = MatchOptions {
        allow_insecure_key_sizes: true,
        allow_invalid_asymmetric_key_types: options.allow_invalid_asymmetric_key_types,
    };
    KeyAlgorithmMatcher::check(algorithm, key, KeyUse::Verify, &match_options)
        .map_err(|e| Error::token(e.to_string()))?;

    if !signature_matches(token, &decoded.signature, algorithm, key) {
        return Err(Error::token("invalid signature"));
    }

    ClaimsValidator::validate(&decoded.payload, options, now)?;

    Ok(if options.complete {
        Verified::Complete(decoded)
    } else {
        Verified::Payload(decoded.payload)
    })
}

fn signature_matches(
    token: &str,
    signature: &str,
    algorithm: AlgorithmId,
    key: Option<&Key>,
) -> bool {
    if algorithm == AlgorithmId::None {
        return signature.is_empty();
    }

    let (Some(key), Some(backend)) = (key, get_backend(&algorithm)) else {
        return false;
    };
    let Some((signing_input, _)) = token.rsplit_once('.') else {
        return false;
    };

    match backend.verify(signing_input, signature, key) {
        Ok(valid) => valid,
        Err(err) => {
            tracing::debug!(error = %err, "signature backend error");
            false
        }
    }
}

fn log_outcome(result: &Result<Verified>) {
    match result {
        Ok(_) => tracing::debug!("token verified"),
        Err(err) => tracing::debug!(kind = err.name(), error = %err, "token rejected"),
    }
}
