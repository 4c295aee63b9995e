//! Errors for jwtclaims

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reason attached to an [`Error::Expired`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiredReason {
    /// The `exp` claim has passed
    JwtExpired,

    /// `iat + maxAge` has passed
    MaxAgeExceeded,
}

impl ExpiredReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpiredReason::JwtExpired => "jwt expired",
            ExpiredReason::MaxAgeExceeded => "maxAge exceeded",
        }
    }
}

impl std::fmt::Display for ExpiredReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// jwtclaims Errors
///
/// Every failure on the verification path is one of `Token`, `NotBefore` or
/// `Expired`. Issuance failures are reported as `Sign`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Structural or claim failure (malformed input, bad option or claim
    /// types, algorithm/key mismatch, invalid signature)
    #[error("{0}")]
    Token(String),

    /// The token's `nbf` lies in the future
    #[error("jwt not active")]
    NotBefore { date: DateTime<Utc> },

    /// The token expired, either through `exp` or through `maxAge`
    #[error("{reason}")]
    Expired {
        reason: ExpiredReason,
        expired_at: DateTime<Utc>,
    },

    /// Failure while building or signing a token
    #[error("{0}")]
    Sign(String),

    /// Key material could not be loaded
    #[error("invalid key material: {0}")]
    Key(String),
}

impl Error {
    pub(crate) fn token(message: impl Into<String>) -> Self {
        Error::Token(message.into())
    }

    pub(crate) fn sign(message: impl Into<String>) -> Self {
        Error::Sign(message.into())
    }

    pub(crate) fn key(message: impl Into<String>) -> Self {
        Error::Key(message.into())
    }

    /// Historical kind name of the error
    pub fn name(&self) -> &'static str {
        match self {
            Error::Token(_) => "JsonWebTokenError",
            Error::NotBefore { .. } => "NotBeforeError",
            Error::Expired { .. } => "TokenExpiredError",
            Error::Sign(_) => "SignError",
            Error::Key(_) => "KeyError",
        }
    }

    /// Human readable message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Activation instant of a [`Error::NotBefore`]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            Error::NotBefore { date } => Some(*date),
            _ => None,
        }
    }

    /// Expiry instant of a [`Error::Expired`]
    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Error::Expired { expired_at, .. } => Some(*expired_at),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
