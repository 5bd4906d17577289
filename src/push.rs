//! Push delivery (RFC 8030).
//!
//! Validates the subscription, encrypts the message, builds the VAPID
//! authorization, and POSTs the record to the push service. Exactly one
//! transport attempt per call: retry policy, response interpretation, and
//! pruning of expired subscriptions all belong to the caller.

// Rust guideline compliant 2026-02

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use p256::ecdsa::SigningKey;
use p256::elliptic_curve::rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, MAX_RECORD_SIZE};
use crate::error::{Result, WebPushError};
use crate::vapid;

/// Base64-encoded key material from the user agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Keys {
    /// Shared auth secret (16 bytes decoded).
    pub auth: String,
    /// Browser's P-256 ECDH public key (65-byte uncompressed point decoded).
    pub p256dh: String,
}

/// A browser `PushSubscription`, as serialized by the Push API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscription {
    /// Push service capability URL for this subscriber.
    pub endpoint: String,
    /// Encryption key material.
    pub keys: Keys,
}

/// Message priority. Directly impacts device battery life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    /// Deliver only on power and Wi-Fi.
    VeryLow,
    /// Deliver on either power or Wi-Fi.
    Low,
    /// Deliver on neither power nor Wi-Fi.
    Normal,
    /// Deliver in any state, including low battery.
    High,
}

impl Urgency {
    /// Wire form of the `Urgency` header value.
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = WebPushError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            other => Err(WebPushError::InvalidUrgency(other.to_string())),
        }
    }
}

/// Required and optional aspects of a delivery.
///
/// The HTTP client is passed to [`send`] directly so a single client can be
/// reused across deliveries for connection pooling.
#[derive(Clone, Debug)]
pub struct Config {
    /// VAPID private key asserting the sender's identity.
    pub vapid_key: SigningKey,
    /// Sender contact: an `https:` URL or `mailto:` address.
    pub subscriber: String,
    /// `TTL` on the endpoint POST request (rounded to whole seconds).
    pub ttl: Duration,
    /// Collapses pending messages that share a topic.
    pub topic: Option<String>,
    /// Message priority.
    pub urgency: Option<Urgency>,
    /// Record size advertised in the encrypted record. Defaults to 4096.
    pub record_size: Option<u32>,
    /// Expiry of the VAPID assertion. Defaults to now + 12 hours,
    /// resolved at send time.
    pub vapid_expiration: Option<DateTime<Utc>>,
}

/// Send an encrypted push message to a subscription.
///
/// Fails fast: validation and all cryptographic work complete before the
/// single POST, so no partial request is ever sent and every error except
/// [`WebPushError::Transport`] is returned without network I/O. The push
/// service response is returned unchanged — a `201 Created` means the
/// service accepted the message, a `410 Gone` means the subscription should
/// be dropped, and interpreting either is up to the caller.
pub async fn send(
    client: &reqwest::Client,
    message: &[u8],
    subscription: &Subscription,
    config: &Config,
) -> Result<reqwest::Response> {
    if subscription.endpoint.is_empty()
        || subscription.keys.auth.is_empty()
        || subscription.keys.p256dh.is_empty()
    {
        return Err(WebPushError::InvalidSubscription);
    }

    let record_size = config.record_size.unwrap_or(MAX_RECORD_SIZE);
    let record = crypto::encrypt_record(
        message,
        &subscription.keys.auth,
        &subscription.keys.p256dh,
        record_size,
        &mut OsRng,
    )?;

    let expiration = config
        .vapid_expiration
        .unwrap_or_else(|| Utc::now() + chrono::Duration::hours(12));
    let authorization = vapid::auth_header(
        &subscription.endpoint,
        &config.subscriber,
        &config.vapid_key,
        expiration,
    )?;

    log::debug!("[WebPush] sending {} byte record", record.len());

    let mut request = client
        .post(subscription.endpoint.as_str())
        .header("Content-Encoding", "aes128gcm")
        .header("Content-Type", "application/octet-stream")
        .header("TTL", config.ttl.as_secs().to_string())
        .header("Authorization", authorization);

    if let Some(topic) = &config.topic {
        request = request.header("Topic", topic);
    }
    if let Some(urgency) = config.urgency {
        request = request.header("Urgency", urgency.as_str());
    }

    Ok(request.body(record).send().await?)
}
