//! Basic example: issue, verify, look up keys by `kid` and refresh
//!
//! Run with `RUST_LOG=jwtclaims=debug` to see the pipeline's tracing output.

use std::collections::HashMap;
use std::sync::Arc;

use jwtclaims::*;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwtclaims=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== jwtclaims - Basic Example ===\n");

    let key = Key::secret("your-256-bit-secret-key-here!");
    let payload = Payload::from_value(json!({ "sub": "user-123", "role": "admin" }))?;

    // Step 1: Issue a token
    let options = SignOptions::new()
        .expires_in("1h")
        .audience(vec!["api", "mobile"])
        .issuer("https://example.com")
        .keyid("primary");
    let token = sign(&payload, Some(&key), &options)?;
    println!("Token: {token}\n");

    // Step 2: Verify it
    let verified = verify(
        &token,
        Some(&key),
        &VerifyOptions::new()
            .algorithms(vec![AlgorithmId::HS256])
            .audience("api")
            .issuer("https://example.com")
            .max_age("1d")
            .clock_tolerance(60.0),
    )?;
    let claims = verified.claims().cloned().unwrap_or_default();
    println!("  ✓ Subject: {:?}", claims.subject());
    println!("  ✓ Issued at: {:?}", claims.issued_at());
    println!("  ✓ Expires at: {:?}\n", claims.expiration());

    // Step 3: Resolve the key from the header asynchronously
    let keys: Arc<HashMap<String, Key>> =
        Arc::new(HashMap::from([("primary".to_string(), key.clone())]));
    let verifier = TokenVerifier::new(VerifyOptions::new().audience("mobile").complete())
        .key_lookup(move |header: Header| {
            let keys = keys.clone();
            async move { Ok(header.key_id().and_then(|kid| keys.get(kid).cloned())) }
        });
    let complete = verifier.verify_async(&token).await?;
    println!("  ✓ Verified with kid {:?}\n", complete.header().and_then(Header::key_id));

    // Step 4: Failures carry a kind and a message
    let expired = Signer::new(SignOptions::new().expires_in(-10)).sign(&payload, Some(&key))?;
    if let Err(err) = verify(&expired, Some(&key), &VerifyOptions::new()) {
        println!("  ✗ {}: {} (at {:?})", err.name(), err, err.expired_at());
    }
    if let Err(err) = verify(&token, Some(&key), &VerifyOptions::new().audience("billing")) {
        println!("  ✗ {}: {}\n", err.name(), err);
    }

    // Step 5: Refresh with a new lifetime
    let refreshed = refresh(&token, "7d", &key, &key, &VerifyOptions::new())?;
    let claims = decode(&refreshed)
        .and_then(|decoded| decoded.payload.into_claims())
        .unwrap_or_default();
    println!("Refreshed, now expires at {:?}", claims.expiration());

    Ok(())
}
