//! Re-issue a valid token with a new expiry

use crate::claims::{registered, Payload, SignOptions, VerifyOptions};
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::signer::Signer;
use crate::timespan::Timespan;
use crate::validator::{TokenVerifier, Verified};

/// Verify `token` and sign a copy of it that expires `expires_in` from now
///
/// Verification errors are returned unchanged. The new token keeps the
/// header parameters (except `typ`, which is regenerated) and all claims.
/// `iat` is restamped only when the original carried one; `exp` is replaced.
/// `options.clock_timestamp`, when set, is also the new `iat`.
pub fn refresh(
    token: &str,
    expires_in: impl Into<Timespan>,
    verify_key: &Key,
    sign_key: &Key,
    options: &VerifyOptions,
) -> Result<String> {
    let verified = TokenVerifier::new(options.clone().complete())
        .key(verify_key.clone())
        .verify(token)?;
    let Verified::Complete(decoded) = verified else {
        return Err(Error::token("invalid token"));
    };

    let header = decoded.header;
    let algorithm = header
        .algorithm()
        .ok_or_else(|| Error::sign(format!("\"{}\" is not a valid algorithm.", header.alg)))?;

    let mut sign_options = SignOptions::new().algorithm(algorithm);
    for (name, value) in header.extra {
        sign_options = sign_options.header(name, value);
    }
    if let Some(kid) = header.kid {
        sign_options = sign_options.keyid(kid);
    }
    if let Some(cty) = header.cty {
        sign_options = sign_options.header("cty", cty);
    }

    let payload = match decoded.payload {
        Payload::Claims(mut claims) => {
            let had_iat = claims.remove(registered::ISSUED_AT).is_some();
            claims.remove(registered::EXPIRATION);
            sign_options = sign_options.expires_in(expires_in);
            if !had_iat {
                sign_options = sign_options.no_timestamp();
            }
            Payload::Claims(claims)
        }
        other => other,
    };

    tracing::debug!(alg = %algorithm, "refreshing token");

    let mut signer = Signer::new(sign_options);
    if let Some(timestamp) = options.clock_timestamp {
        signer = signer.issued_at(timestamp);
    }
    signer.sign(&payload, Some(sign_key))
}
