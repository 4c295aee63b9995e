use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algorithm::AlgorithmId;
use crate::error::{Error, Result};

/// JWT header structure
///
/// Serialized in the order `alg, typ, kid, cty`, then any extra parameters
/// in insertion order.
///
/// Decoding is lenient: a `typ`, `kid` or `cty` that is not a string stays in
/// `extra` under its own name. Only a non-string `alg` is refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Header {
    /// Algorithm used for signing (empty when the token omits it)
    pub alg: String,

    /// Token type (typically "JWT")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// Any other header parameter
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    pub fn new(algorithm: AlgorithmId) -> Self {
        Self {
            alg: algorithm.as_str().to_string(),
            typ: None,
            kid: None,
            cty: None,
            extra: Map::new(),
        }
    }

    /// Parse algorithm from header
    pub fn algorithm(&self) -> Option<AlgorithmId> {
        AlgorithmId::from_str(&self.alg)
    }

    /// Get key ID if present
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Set one parameter by name
    ///
    /// `null` removes `typ`, `kid` and `cty`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = match name {
            "alg" => {
                return match value {
                    Value::String(alg) => {
                        self.alg = alg;
                        Ok(())
                    }
                    _ => Err(Error::sign("\"alg\" header parameter must be a string")),
                };
            }
            "typ" => &mut self.typ,
            "kid" => &mut self.kid,
            "cty" => &mut self.cty,
            _ => {
                self.extra.insert(name.to_string(), value);
                return Ok(());
            }
        };

        *slot = match value {
            Value::String(s) => Some(s),
            Value::Null => None,
            _ => {
                return Err(Error::sign(format!(
                    "\"{name}\" header parameter must be a string"
                )))
            }
        };
        Ok(())
    }
}

impl TryFrom<Map<String, Value>> for Header {
    type Error = String;

    fn try_from(mut params: Map<String, Value>) -> std::result::Result<Self, String> {
        let alg = match params.shift_remove("alg") {
            None => String::new(),
            Some(Value::String(alg)) => alg,
            Some(_) => return Err("\"alg\" header parameter must be a string".to_string()),
        };

        Ok(Self {
            alg,
            typ: take_string(&mut params, "typ"),
            kid: take_string(&mut params, "kid"),
            cty: take_string(&mut params, "cty"),
            extra: params,
        })
    }
}

fn take_string(params: &mut Map<String, Value>, name: &str) -> Option<String> {
    if !params.get(name).is_some_and(Value::is_string) {
        return None;
    }
    match params.shift_remove(name) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}
