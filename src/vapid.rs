//! Voluntary Application Server Identification (RFC 8292).
//!
//! The sender owns a long-lived P-256 ECDSA keypair. Its external form is
//! the unpadded base64url encoding of the raw 32-byte private scalar:
//! generate once with [`generate_key`], store the string, and parse it back
//! at application startup with [`parse_key`]. A key change invalidates
//! every subscription made against its public key.
//!
//! [`auth_header`] turns the key into the `Authorization` value a push
//! service verifies: a signed assertion over the endpoint origin plus the
//! sender's public key, independent of any message content.

// Rust guideline compliant 2026-02

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use chrono::{DateTime, Utc};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::rand_core::OsRng;
use reqwest::Url;
use serde::Serialize;

use crate::encoding;
use crate::error::{Result, WebPushError};

/// Claims of the signed assertion, serialized in this field order.
#[derive(Serialize)]
struct Claims<'a> {
    aud: String,
    exp: i64,
    sub: &'a str,
}

/// Generate a fresh VAPID private key in base64url raw-scalar form.
pub fn generate_key() -> String {
    let key = SigningKey::random(&mut OsRng);
    BASE64URL.encode(key.to_bytes())
}

/// Parse a stored VAPID private key produced by [`generate_key`].
///
/// The encoding may be any of the four base64 variants; the decoded bytes
/// must be a valid 32-byte P-256 scalar.
pub fn parse_key(private_key: &str) -> Result<SigningKey> {
    let raw = encoding::decode(private_key)?;
    SigningKey::from_slice(&raw).map_err(|e| WebPushError::InvalidVapidKey(e.to_string()))
}

/// Build the `Authorization` header value for a delivery to `endpoint`.
///
/// Validates the endpoint and subscriber before signing, then produces
/// `vapid t=<assertion>, k=<public key>`: an ES256-signed token with claims
/// `aud` (the endpoint origin, never the full capability URL), `exp`, and
/// `sub`, alongside the unpadded base64url uncompressed public key.
pub fn auth_header(
    endpoint: &str,
    subscriber: &str,
    vapid_key: &SigningKey,
    expiration: DateTime<Utc>,
) -> Result<String> {
    let url =
        Url::parse(endpoint).map_err(|_| WebPushError::InvalidEndpoint(endpoint.to_string()))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| WebPushError::InvalidEndpoint(endpoint.to_string()))?;

    // Google & Firefox allow an empty subscriber, but Apple doesn't.
    if !subscriber.starts_with("https:") && !subscriber.starts_with("mailto:") {
        return Err(WebPushError::InvalidSubscriber(subscriber.to_string()));
    }

    let aud = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    let claims = Claims {
        aud,
        exp: expiration.timestamp(),
        sub: subscriber,
    };

    let header = BASE64URL.encode(br#"{"alg":"ES256","typ":"JWT"}"#);
    let payload = BASE64URL.encode(
        serde_json::to_vec(&claims).map_err(|_| WebPushError::Crypto("claims serialization"))?,
    );
    let signing_input = format!("{header}.{payload}");
    let signature: Signature = vapid_key.sign(signing_input.as_bytes());
    let assertion = format!("{signing_input}.{}", BASE64URL.encode(signature.to_bytes()));

    let public_key =
        BASE64URL.encode(vapid_key.verifying_key().to_encoded_point(false).as_bytes());

    Ok(format!("vapid t={assertion}, k={public_key}"))
}
