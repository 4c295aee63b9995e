use serde_json::Value;

use crate::algorithm::AlgorithmId;
use crate::claims::{registered, Claims, Payload, SignOptions};
use crate::error::{Error, Result};
use crate::keys::{Key, KeyAlgorithmMatcher, KeyUse, MatchOptions};
use crate::timespan::timespan_error;
use crate::token::Header;
use crate::utils::time;

const NUMERIC_CLAIMS: [&str; 3] = [
    registered::ISSUED_AT,
    registered::EXPIRATION,
    registered::NOT_BEFORE,
];

const STRING_CLAIMS: [&str; 5] = [
    registered::ISSUER,
    registered::SUBJECT,
    registered::JWT_ID,
    registered::NONCE,
    registered::SCOPE,
];

/// Header and payload ready to be encoded and signed
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedToken {
    pub header: Header,
    pub payload: Payload,
}

impl UnsignedToken {
    /// Algorithm the header asks for
    pub fn algorithm(&self) -> Option<AlgorithmId> {
        self.header.algorithm()
    }
}

/// Issuance pipeline: validates the payload against the options and
/// produces the final header and claim set
pub struct ClaimsBuilder<'a> {
    options: &'a SignOptions,
}

impl<'a> ClaimsBuilder<'a> {
    pub fn new(options: &'a SignOptions) -> Self {
        Self { options }
    }

    /// Build header and claims with `now` as the reference instant
    ///
    /// The caller's payload is never modified.
    pub fn build(&self, payload: &Payload, key: Option<&Key>, now: f64) -> Result<UnsignedToken> {
        let options = self.options;

        let payload = match payload {
            Payload::Claims(claims) => {
                let mut claims = claims.clone();
                validate_claim_types(&claims)?;
                check_collisions(&claims, options)?;
                self.apply_time_claims(&mut claims, now)?;
                self.apply_option_claims(&mut claims);
                Payload::Claims(claims)
            }
            other => {
                let invalid = options.object_only_options();
                if !invalid.is_empty() {
                    return Err(Error::sign(format!(
                        "invalid {} option for {} payload",
                        invalid.join(","),
                        other.kind()
                    )));
                }
                other.clone()
            }
        };

        let header = self.build_header(&payload)?;

        if let Some(algorithm) = header.algorithm() {
            let match_options = MatchOptions {
                allow_insecure_key_sizes: options.allow_insecure_key_sizes,
                allow_invalid_asymmetric_key_types: options.allow_invalid_asymmetric_key_types,
            };
            KeyAlgorithmMatcher::check(algorithm, key, KeyUse::Sign, &match_options)
                .map_err(|e| Error::sign(e.to_string()))?;
        }

        Ok(UnsignedToken { header, payload })
    }

    fn build_header(&self, payload: &Payload) -> Result<Header> {
        let mut header = Header::new(self.options.algorithm.unwrap_or(AlgorithmId::HS256));
        if matches!(payload, Payload::Claims(_) | Payload::Array(_)) {
            header.typ = Some("JWT".to_string());
        }

        if let Some(overrides) = &self.options.header {
            for (name, value) in overrides {
                header.set(name, value.clone())?;
            }
        }

        if let Some(keyid) = &self.options.keyid {
            header.kid = Some(keyid.clone());
        }

        Ok(header)
    }

    fn apply_time_claims(&self, claims: &mut Claims, now: f64) -> Result<()> {
        let options = self.options;

        let reference = if options.no_timestamp.unwrap_or(false) {
            claims.remove(registered::ISSUED_AT);
            now
        } else {
            match claims.issued_at() {
                Some(iat) => iat,
                None => {
                    claims.insert(registered::ISSUED_AT, now_value(now)?);
                    now
                }
            }
        };

        if let Some(not_before) = &options.not_before {
            let nbf = not_before
                .resolve(reference)
                .and_then(time::to_json_number)
                .ok_or_else(|| Error::sign(timespan_error("notBefore")))?;
            claims.insert(registered::NOT_BEFORE, nbf);
        }

        if let Some(expires_in) = &options.expires_in {
            let exp = expires_in
                .resolve(reference)
                .and_then(time::to_json_number)
                .ok_or_else(|| Error::sign(timespan_error("expiresIn")))?;
            claims.insert(registered::EXPIRATION, exp);
        }

        Ok(())
    }

    fn apply_option_claims(&self, claims: &mut Claims) {
        let options = self.options;

        if let Some(audience) = &options.audience {
            claims.insert(registered::AUDIENCE, audience.to_value());
        }
        if let Some(issuer) = &options.issuer {
            claims.insert(registered::ISSUER, issuer.as_str());
        }
        if let Some(subject) = &options.subject {
            claims.insert(registered::SUBJECT, subject.as_str());
        }
        if let Some(jwtid) = &options.jwtid {
            claims.insert(registered::JWT_ID, jwtid.as_str());
        }
    }
}

fn now_value(now: f64) -> Result<Value> {
    time::to_json_number(now).ok_or_else(|| Error::sign("clock timestamp must be a finite number"))
}

fn validate_claim_types(claims: &Claims) -> Result<()> {
    for name in NUMERIC_CLAIMS {
        if let Some(value) = claims.get(name) {
            if !value.is_number() {
                return Err(Error::sign(format!(
                    "\"{name}\" should be a number of seconds"
                )));
            }
        }
    }

    if let Some(audience) = claims.audience() {
        let valid = match audience {
            Value::String(_) => true,
            Value::Array(entries) => entries.iter().all(Value::is_string),
            _ => false,
        };
        if !valid {
            return Err(Error::sign(
                "\"aud\" should be a string or an array of strings",
            ));
        }
    }

    for name in STRING_CLAIMS {
        if let Some(value) = claims.get(name) {
            if !value.is_string() {
                return Err(Error::sign(format!("\"{name}\" must be a string")));
            }
        }
    }

    Ok(())
}

fn check_collisions(claims: &Claims, options: &SignOptions) -> Result<()> {
    if options.expires_in.is_some() && claims.contains(registered::EXPIRATION) {
        return Err(Error::sign(
            "Bad \"options.expiresIn\" option the payload already has an \"exp\" property.",
        ));
    }
    if options.not_before.is_some() && claims.contains(registered::NOT_BEFORE) {
        return Err(Error::sign(
            "Bad \"options.notBefore\" option the payload already has an \"nbf\" property.",
        ));
    }

    let mapped = [
        ("audience", registered::AUDIENCE, options.audience.is_some()),
        ("issuer", registered::ISSUER, options.issuer.is_some()),
        ("subject", registered::SUBJECT, options.subject.is_some()),
        ("jwtid", registered::JWT_ID, options.jwtid.is_some()),
    ];
    for (option, claim, set) in mapped {
        if set && claims.contains(claim) {
            return Err(Error::sign(format!(
                "Bad \"options.{option}\" option. The payload already has an \"{claim}\" property."
            )));
        }
    }

    Ok(())
}
