use crate::claims::{registered, Claims, OneOrMany, Payload, VerifyOptions};
use crate::error::{Error, ExpiredReason, Result};
use crate::timespan::timespan_error;
use crate::utils::time;

/// Claim checks run after the signature is verified
///
/// Steps run in a fixed order and stop at the first failure:
/// `nbf`, `exp`, audience, issuer, subject, jwtid, nonce, maxAge and
/// maxExpiration. Payloads that are not claim sets are checked as an empty
/// claim set.
pub struct ClaimsValidator;

impl ClaimsValidator {
    /// Validate claims against `options` at the instant `now`
    pub fn validate(payload: &Payload, options: &VerifyOptions, now: f64) -> Result<()> {
        let empty = Claims::new();
        let claims = payload.as_claims().unwrap_or(&empty);
        let tolerance = options.clock_tolerance;

        if !options.ignore_not_before {
            if let Some(value) = claims.get(registered::NOT_BEFORE) {
                let nbf = value
                    .as_f64()
                    .ok_or_else(|| Error::token("invalid nbf value"))?;
                if nbf > now + tolerance {
                    return Err(Error::NotBefore {
                        date: time::to_datetime(nbf),
                    });
                }
            }
        }

        if !options.ignore_expiration {
            if let Some(value) = claims.get(registered::EXPIRATION) {
                let exp = value
                    .as_f64()
                    .ok_or_else(|| Error::token("invalid exp value"))?;
                if now >= exp + tolerance {
                    return Err(Error::Expired {
                        reason: ExpiredReason::JwtExpired,
                        expired_at: time::to_datetime(exp),
                    });
                }
            }
        }

        if let Some(audience) = &options.audience {
            if !audience.matches(claims.audience()) {
                return Err(Error::token(format!(
                    "jwt audience invalid. expected: {}",
                    audience.expected()
                )));
            }
        }

        if let Some(issuer) = &options.issuer {
            Self::check_issuer(claims, issuer)?;
        }

        Self::check_equal(claims.subject(), options.subject.as_deref(), "subject")?;
        Self::check_equal(claims.jwt_id(), options.jwtid.as_deref(), "jwtid")?;
        Self::check_equal(claims.nonce(), options.nonce.as_deref(), "nonce")?;

        if let Some(max_age) = &options.max_age {
            let iat = claims
                .issued_at()
                .ok_or_else(|| Error::token("iat required when maxAge is specified"))?;
            let max_age_at = max_age
                .resolve(iat)
                .ok_or_else(|| Error::token(timespan_error("maxAge")))?;
            if now >= max_age_at + tolerance {
                return Err(Error::Expired {
                    reason: ExpiredReason::MaxAgeExceeded,
                    expired_at: time::to_datetime(max_age_at),
                });
            }
        }

        if let Some(max_expiration) = &options.max_expiration {
            let reference = claims.issued_at().unwrap_or(now);
            let latest = max_expiration
                .resolve(reference)
                .ok_or_else(|| Error::token(timespan_error("maxExpiration")))?;
            let within = claims.expiration().is_some_and(|exp| exp <= latest);
            if !within {
                return Err(Error::token(format!(
                    "jwt expiration is longer then the specified maxExpiration: {max_expiration}"
                )));
            }
        }

        Ok(())
    }

    fn check_issuer(claims: &Claims, issuer: &OneOrMany<String>) -> Result<()> {
        if matches!(issuer, OneOrMany::One(expected) if expected.is_empty()) {
            return Ok(());
        }

        let expected = issuer.as_slice();
        let actual = claims.issuer();
        if expected.iter().any(|candidate| Some(candidate.as_str()) == actual) {
            return Ok(());
        }

        Err(Error::token(format!(
            "jwt issuer invalid. expected: {}",
            expected.join(",")
        )))
    }

    /// Equality check for subject, jwtid and nonce; empty expectations are skipped
    fn check_equal(actual: Option<&str>, expected: Option<&str>, field: &str) -> Result<()> {
        match expected {
            Some(expected) if !expected.is_empty() && actual != Some(expected) => Err(
                Error::token(format!("jwt {field} invalid. expected: {expected}")),
            ),
            _ => Ok(()),
        }
    }
}
