//! Token issuance
//!
//! [`Signer`] runs the claims builder, then encodes and signs the result.
//! The clock is read once per call unless frozen with
//! [`Signer::issued_at`].

use crate::claims::{ClaimsBuilder, Payload, SignOptions, UnsignedToken};
use crate::error::Result;
use crate::keys::Key;
use crate::token;
use crate::utils::time;

/// Issues compact tokens with a fixed set of options
///
/// # Example
///
/// ```ignore
/// let token = Signer::new(SignOptions::new().expires_in("1h").issuer("auth"))
///     .sign(&claims.into(), Some(&Key::secret("secret")))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signer {
    options: SignOptions,
    issued_at: Option<f64>,
}

impl Signer {
    pub fn new(options: SignOptions) -> Self {
        Self {
            options,
            issued_at: None,
        }
    }

    /// Use `timestamp` (epoch seconds) instead of the wall clock
    pub fn issued_at(mut self, timestamp: f64) -> Self {
        self.issued_at = Some(timestamp);
        self
    }

    pub fn options(&self) -> &SignOptions {
        &self.options
    }

    /// Sign `payload` with `key`
    ///
    /// `key` may be `None` only for the `none` algorithm.
    pub fn sign(&self, payload: &Payload, key: Option<&Key>) -> Result<String> {
        let unsigned = self.prepare(payload, key)?;
        self.encode(&unsigned, key)
    }

    /// Async form of [`Signer::sign`]
    ///
    /// Resolves to exactly what the sync form returns for the same clock.
    pub async fn sign_async(&self, payload: &Payload, key: Option<&Key>) -> Result<String> {
        self.sign(payload, key)
    }

    /// Sign and, when `mutate_payload` is set, write the final claims back
    /// into `payload`
    pub fn sign_in_place(&self, payload: &mut Payload, key: Option<&Key>) -> Result<String> {
        let unsigned = self.prepare(payload, key)?;
        let token = self.encode(&unsigned, key)?;
        if self.options.mutate_payload {
            *payload = unsigned.payload;
        }
        Ok(token)
    }

    fn prepare(&self, payload: &Payload, key: Option<&Key>) -> Result<UnsignedToken> {
        let now = self.issued_at.unwrap_or_else(time::now);
        tracing::debug!(
            alg = ?self.options.algorithm,
            payload = payload.kind(),
            "building token"
        );

        ClaimsBuilder::new(&self.options)
            .build(payload, key, now)
            .inspect_err(|err| tracing::debug!(error = %err, "token issuance rejected"))
    }

    fn encode(&self, unsigned: &UnsignedToken, key: Option<&Key>) -> Result<String> {
        let encoding = self.options.encoding.unwrap_or_default();
        let token = token::encode(&unsigned.header, &unsigned.payload, encoding, key)
            .inspect_err(|err| tracing::warn!(error = %err, "signing failed"))?;
        tracing::debug!(alg = %unsigned.header.alg, "token signed");
        Ok(token)
    }
}
