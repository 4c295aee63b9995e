use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algorithm::{AlgorithmId, AlgorithmPolicy};
use crate::timespan::Timespan;

/// A single value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

impl OneOrMany<String> {
    /// JSON form written into a claim set
    pub fn to_value(&self) -> Value {
        match self {
            OneOrMany::One(value) => Value::String(value.clone()),
            OneOrMany::Many(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// Character encoding applied to string payloads before base64url
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    #[serde(alias = "binary")]
    Latin1,
    Ascii,
}

impl PayloadEncoding {
    /// Encode text into payload bytes
    ///
    /// `latin1` and `ascii` keep the low byte of every code point.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            PayloadEncoding::Utf8 => text.as_bytes().to_vec(),
            PayloadEncoding::Latin1 | PayloadEncoding::Ascii => {
                text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect()
            }
        }
    }
}

/// Options for issuing a token
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SignOptions {
    /// Signing algorithm (default: HS256)
    pub algorithm: Option<AlgorithmId>,

    /// Relative expiry, written into `exp`
    pub expires_in: Option<Timespan>,

    /// Relative activation time, written into `nbf`
    pub not_before: Option<Timespan>,

    pub audience: Option<OneOrMany<String>>,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub jwtid: Option<String>,

    /// Skip the `iat` claim (presence alone counts for string payloads)
    pub no_timestamp: Option<bool>,

    /// Header parameters merged over the generated header
    pub header: Option<Map<String, Value>>,

    pub encoding: Option<PayloadEncoding>,

    /// Written into the `kid` header parameter
    pub keyid: Option<String>,

    /// Write the final claims back into the caller's payload
    pub mutate_payload: bool,

    /// Accept RSA keys below 2048 bits
    pub allow_insecure_key_sizes: bool,

    /// Skip key type, curve and RSA-PSS parameter checks
    pub allow_invalid_asymmetric_key_types: bool,
}

impl SignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: AlgorithmId) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn expires_in(mut self, expires_in: impl Into<Timespan>) -> Self {
        self.expires_in = Some(expires_in.into());
        self
    }

    pub fn not_before(mut self, not_before: impl Into<Timespan>) -> Self {
        self.not_before = Some(not_before.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<OneOrMany<String>>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn jwtid(mut self, jwtid: impl Into<String>) -> Self {
        self.jwtid = Some(jwtid.into());
        self
    }

    pub fn no_timestamp(mut self) -> Self {
        self.no_timestamp = Some(true);
        self
    }

    /// Set one header parameter override
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn encoding(mut self, encoding: PayloadEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn keyid(mut self, keyid: impl Into<String>) -> Self {
        self.keyid = Some(keyid.into());
        self
    }

    pub fn mutate_payload(mut self) -> Self {
        self.mutate_payload = true;
        self
    }

    pub fn allow_insecure_key_sizes(mut self) -> Self {
        self.allow_insecure_key_sizes = true;
        self
    }

    pub fn allow_invalid_asymmetric_key_types(mut self) -> Self {
        self.allow_invalid_asymmetric_key_types = true;
        self
    }

    /// Names of set options that only apply to claim set payloads
    pub(crate) fn object_only_options(&self) -> Vec<&'static str> {
        [
            ("expiresIn", self.expires_in.is_some()),
            ("notBefore", self.not_before.is_some()),
            ("noTimestamp", self.no_timestamp.is_some()),
            ("audience", self.audience.is_some()),
            ("issuer", self.issuer.is_some()),
            ("subject", self.subject.is_some()),
            ("jwtid", self.jwtid.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// Predicate over the whole `aud` claim (`Null` when absent)
pub type AudiencePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// One accepted audience
#[derive(Clone)]
pub enum AudienceMatcher {
    /// String equality against any `aud` entry
    Exact(String),

    /// Regex test against any `aud` entry
    Pattern(Regex),

    /// Called once with the whole `aud` value
    Predicate(AudiencePredicate),
}

impl AudienceMatcher {
    fn matches(&self, audience: Option<&Value>) -> bool {
        let entries: &[Value] = match audience {
            Some(Value::Array(values)) => values,
            Some(value) => std::slice::from_ref(value),
            None => &[],
        };

        match self {
            AudienceMatcher::Exact(expected) => entries
                .iter()
                .any(|entry| entry.as_str() == Some(expected.as_str())),
            AudienceMatcher::Pattern(pattern) => entries
                .iter()
                .filter_map(Value::as_str)
                .any(|entry| pattern.is_match(entry)),
            AudienceMatcher::Predicate(predicate) => predicate(audience.unwrap_or(&Value::Null)),
        }
    }
}

impl fmt::Debug for AudienceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudienceMatcher::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            AudienceMatcher::Pattern(pattern) => {
                f.debug_tuple("Pattern").field(&pattern.as_str()).finish()
            }
            AudienceMatcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for AudienceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudienceMatcher::Exact(value) => f.write_str(value),
            AudienceMatcher::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
            AudienceMatcher::Predicate(_) => f.write_str("[predicate]"),
        }
    }
}

/// Accepted audiences; the constraint holds when any entry matches
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "OneOrMany<String>")]
pub struct AudienceConstraint(Vec<AudienceMatcher>);

impl AudienceConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, audience: impl Into<String>) -> Self {
        self.0.push(AudienceMatcher::Exact(audience.into()));
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.0.push(AudienceMatcher::Pattern(pattern));
        self
    }

    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.0.push(AudienceMatcher::Predicate(Arc::new(predicate)));
        self
    }

    pub fn matchers(&self) -> &[AudienceMatcher] {
        &self.0
    }

    pub fn matches(&self, audience: Option<&Value>) -> bool {
        self.0.iter().any(|matcher| matcher.matches(audience))
    }

    /// Expected audiences as listed in failure messages
    pub fn expected(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl From<&str> for AudienceConstraint {
    fn from(audience: &str) -> Self {
        Self::new().exact(audience)
    }
}

impl From<String> for AudienceConstraint {
    fn from(audience: String) -> Self {
        Self::new().exact(audience)
    }
}

impl From<Regex> for AudienceConstraint {
    fn from(pattern: Regex) -> Self {
        Self::new().pattern(pattern)
    }
}

impl From<Vec<&str>> for AudienceConstraint {
    fn from(audiences: Vec<&str>) -> Self {
        audiences
            .into_iter()
            .fold(Self::new(), |constraint, audience| constraint.exact(audience))
    }
}

impl From<Vec<AudienceMatcher>> for AudienceConstraint {
    fn from(matchers: Vec<AudienceMatcher>) -> Self {
        Self(matchers)
    }
}

impl From<OneOrMany<String>> for AudienceConstraint {
    fn from(audiences: OneOrMany<String>) -> Self {
        match audiences {
            OneOrMany::One(audience) => Self::new().exact(audience),
            OneOrMany::Many(audiences) => audiences
                .into_iter()
                .fold(Self::new(), |constraint, audience| constraint.exact(audience)),
        }
    }
}

/// Options for verifying a token
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VerifyOptions {
    /// Accepted algorithms; derived from the key when unset
    pub algorithms: Option<AlgorithmPolicy>,

    pub audience: Option<AudienceConstraint>,
    pub issuer: Option<OneOrMany<String>>,
    pub subject: Option<String>,
    pub jwtid: Option<String>,
    pub nonce: Option<String>,

    pub ignore_expiration: bool,
    pub ignore_not_before: bool,

    /// Seconds of skew accepted on every time comparison
    pub clock_tolerance: f64,

    /// Reference time in epoch seconds instead of the wall clock
    pub clock_timestamp: Option<f64>,

    /// Maximum allowed age, anchored at `iat`
    pub max_age: Option<Timespan>,

    /// Latest acceptable `exp`, anchored at `iat` (or now)
    pub max_expiration: Option<Timespan>,

    /// Return header, payload and signature instead of the payload only
    pub complete: bool,

    /// Skip key type, curve and RSA-PSS parameter checks
    pub allow_invalid_asymmetric_key_types: bool,
}

impl VerifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithms(mut self, algorithms: impl Into<AlgorithmPolicy>) -> Self {
        self.algorithms = Some(algorithms.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<AudienceConstraint>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<OneOrMany<String>>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn jwtid(mut self, jwtid: impl Into<String>) -> Self {
        self.jwtid = Some(jwtid.into());
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn ignore_expiration(mut self) -> Self {
        self.ignore_expiration = true;
        self
    }

    pub fn ignore_not_before(mut self) -> Self {
        self.ignore_not_before = true;
        self
    }

    pub fn clock_tolerance(mut self, seconds: f64) -> Self {
        self.clock_tolerance = seconds;
        self
    }

    pub fn clock_timestamp(mut self, seconds: f64) -> Self {
        self.clock_timestamp = Some(seconds);
        self
    }

    pub fn max_age(mut self, max_age: impl Into<Timespan>) -> Self {
        self.max_age = Some(max_age.into());
        self
    }

    pub fn max_expiration(mut self, max_expiration: impl Into<Timespan>) -> Self {
        self.max_expiration = Some(max_expiration.into());
        self
    }

    pub fn complete(mut self) -> Self {
        self.complete = true;
        self
    }

    pub fn allow_invalid_asymmetric_key_types(mut self) -> Self {
        self.allow_invalid_asymmetric_key_types = true;
        self
    }
}
