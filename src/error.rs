//! Error taxonomy for the delivery pipeline.
//!
//! Every validation and cryptographic failure is surfaced as a named
//! variant before any network I/O happens; only [`WebPushError::Transport`]
//! originates in the HTTP layer, and it is propagated unchanged. Nothing is
//! retried internally.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, WebPushError>;

/// Errors returned while building or delivering a push message.
#[derive(Debug, Error)]
pub enum WebPushError {
    /// Subscription is missing its endpoint or one of its keys.
    #[error("invalid subscription, missing endpoint or keys")]
    InvalidSubscription,

    /// Message does not fit the record size together with the fixed
    /// 103-byte overhead (header, delimiter, authentication tag).
    #[error("message length of {length} is too long for record size of {record_size}")]
    MessageTooLong {
        /// Length of the rejected message in bytes.
        length: usize,
        /// Record size limit the message was checked against.
        record_size: u32,
    },

    /// Urgency value outside the four levels defined by RFC 8030.
    #[error("invalid urgency {0:?}")]
    InvalidUrgency(String),

    /// Endpoint is not an absolute URL with a scheme and host.
    #[error("invalid endpoint {0:?}")]
    InvalidEndpoint(String),

    /// Subscriber is neither an `https:` URL nor a `mailto:` address.
    #[error("invalid subscriber {0:?}")]
    InvalidSubscriber(String),

    /// The subscription's auth secret failed to decode.
    #[error("invalid auth in key: {0}")]
    InvalidAuthSecret(#[source] base64::DecodeError),

    /// The subscription's public key failed to decode or is not a valid
    /// point on P-256.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A stored VAPID private key is not a valid P-256 scalar.
    #[error("invalid VAPID key: {0}")]
    InvalidVapidKey(String),

    /// Input matched none of the four accepted base64 variants.
    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Key derivation or cipher setup failed. Fatal for the call; no
    /// partial record is ever produced.
    #[error("crypto failure: {0}")]
    Crypto(&'static str),

    /// Error from the HTTP layer, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
