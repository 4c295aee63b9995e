mod builder;
mod options;
mod validator;

pub use builder::{ClaimsBuilder, UnsignedToken};
pub use options::{
    AudienceConstraint, AudienceMatcher, OneOrMany, PayloadEncoding, SignOptions, VerifyOptions,
};
pub use validator::ClaimsValidator;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Registered claim names
pub mod registered {
    pub const ISSUED_AT: &str = "iat";
    pub const EXPIRATION: &str = "exp";
    pub const NOT_BEFORE: &str = "nbf";
    pub const AUDIENCE: &str = "aud";
    pub const ISSUER: &str = "iss";
    pub const SUBJECT: &str = "sub";
    pub const JWT_ID: &str = "jti";
    pub const NONCE: &str = "nonce";
    pub const SCOPE: &str = "scope";
}

/// A claim set: an insertion-ordered JSON object
///
/// Registered claims (RFC 7519 Section 4.1) are read through the typed
/// accessors; anything else is a private claim and is carried untouched.
///
/// ```ignore
/// let mut claims = Claims::new();
/// claims.insert("sub", "user-123");
/// claims.insert("admin", true);
/// assert_eq!(claims.subject(), Some("user-123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Insert a claim, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Issued At (iat) in epoch seconds
    pub fn issued_at(&self) -> Option<f64> {
        self.number(registered::ISSUED_AT)
    }

    /// Expiration Time (exp) in epoch seconds
    pub fn expiration(&self) -> Option<f64> {
        self.number(registered::EXPIRATION)
    }

    /// Not Before (nbf) in epoch seconds
    pub fn not_before(&self) -> Option<f64> {
        self.number(registered::NOT_BEFORE)
    }

    /// Audience (aud), either a string or an array
    pub fn audience(&self) -> Option<&Value> {
        self.get(registered::AUDIENCE)
    }

    /// Issuer (iss)
    pub fn issuer(&self) -> Option<&str> {
        self.string(registered::ISSUER)
    }

    /// Subject (sub)
    pub fn subject(&self) -> Option<&str> {
        self.string(registered::SUBJECT)
    }

    /// JWT ID (jti)
    pub fn jwt_id(&self) -> Option<&str> {
        self.string(registered::JWT_ID)
    }

    pub fn nonce(&self) -> Option<&str> {
        self.string(registered::NONCE)
    }

    pub fn scope(&self) -> Option<&str> {
        self.string(registered::SCOPE)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Token payload
///
/// JSON objects get claim semantics. Arrays, strings and raw bytes are
/// signed as-is and bypass every claim step.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Claims(Claims),

    /// A JSON array, kept structured
    Array(Vec<Value>),

    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// Build a payload from an arbitrary JSON value
    ///
    /// `null` stands for a missing payload.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(Error::sign("payload is required")),
            Value::Object(map) => Ok(Payload::Claims(map.into())),
            Value::Array(values) => Ok(Payload::Array(values)),
            Value::String(text) => Ok(Payload::Text(text)),
            other => Ok(Payload::Text(other.to_string())),
        }
    }

    /// Payload type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Claims(_) => "object",
            Payload::Array(_) => "array",
            Payload::Text(_) => "string",
            Payload::Binary(_) => "buffer",
        }
    }

    pub fn as_claims(&self) -> Option<&Claims> {
        match self {
            Payload::Claims(claims) => Some(claims),
            _ => None,
        }
    }

    pub fn into_claims(self) -> Option<Claims> {
        match self {
            Payload::Claims(claims) => Some(claims),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Payload::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Claims> for Payload {
    fn from(claims: Claims) -> Self {
        Payload::Claims(claims)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Claims(map.into())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}
