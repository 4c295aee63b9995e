use serde_json::Value;

use crate::algorithm::{get_backend, AlgorithmId};
use crate::claims::{Payload, PayloadEncoding};
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::token::Header;
use crate::utils::base64url;

/// The three parts of a compact token, decoded but not verified
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Header,
    pub payload: Payload,

    /// Raw base64url signature segment
    pub signature: String,
}

/// Decode a compact token without verifying it
///
/// Returns `None` when the token is not three base64url segments, when the
/// header is not a JSON object, or when the header or payload is empty.
/// The payload becomes a claim set when it parses to a JSON object, and an
/// array payload when it parses to a JSON array. Any other payload is kept
/// as text.
///
/// # Example
/// ```ignore
/// let decoded = decode("eyJ...").unwrap();
/// println!("alg: {}", decoded.header.alg);
/// ```
pub fn decode(token: &str) -> Option<DecodedToken> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    if header_b64.is_empty() || payload_b64.is_empty() {
        return None;
    }
    if ![header_b64, payload_b64, signature]
        .iter()
        .all(|segment| base64url::is_base64url(segment))
    {
        return None;
    }

    let header_json = base64url::decode(header_b64).ok()?;
    let header = match serde_json::from_str::<Value>(&header_json).ok()? {
        value @ Value::Object(_) => serde_json::from_value::<Header>(value).ok()?,
        _ => return None,
    };

    let payload = decode_payload(base64url::decode_bytes(payload_b64).ok()?);

    Some(DecodedToken {
        header,
        payload,
        signature: signature.to_string(),
    })
}

fn decode_payload(bytes: Vec<u8>) -> Payload {
    match String::from_utf8(bytes) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Payload::Claims(map.into()),
            Ok(Value::Array(values)) => Payload::Array(values),
            _ => Payload::Text(text),
        },
        Err(err) => Payload::Binary(err.into_bytes()),
    }
}

/// Serialize, encode and sign a token
///
/// The algorithm is read from `header.alg`, so header overrides decide
/// what gets signed.
pub fn encode(
    header: &Header,
    payload: &Payload,
    encoding: PayloadEncoding,
    key: Option<&Key>,
) -> Result<String> {
    let algorithm = header
        .algorithm()
        .ok_or_else(|| Error::sign(format!("\"{}\" is not a valid algorithm.", header.alg)))?;

    let header_json = serde_json::to_string(header).map_err(|e| Error::sign(e.to_string()))?;
    let payload_bytes = match payload {
        Payload::Claims(claims) => {
            let json = serde_json::to_string(claims).map_err(|e| Error::sign(e.to_string()))?;
            encoding.encode(&json)
        }
        Payload::Array(values) => {
            let json = serde_json::to_string(values).map_err(|e| Error::sign(e.to_string()))?;
            encoding.encode(&json)
        }
        Payload::Text(text) => encoding.encode(text),
        Payload::Binary(bytes) => bytes.clone(),
    };

    let signing_input = format!(
        "{}.{}",
        base64url::encode(&header_json),
        base64url::encode_bytes(&payload_bytes)
    );

    let signature = if algorithm == AlgorithmId::None {
        String::new()
    } else {
        let key = key.ok_or_else(|| Error::sign("secretOrPrivateKey must have a value"))?;
        let backend = get_backend(&algorithm).ok_or_else(|| {
            Error::sign(format!("{algorithm} is not supported by this build"))
        })?;
        backend.sign(&signing_input, key)?
    };

    Ok(format!("{signing_input}.{signature}"))
}
