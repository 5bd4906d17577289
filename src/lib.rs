//! Send encrypted Web Push notifications.
//!
//! Implements the coupled specifications an application server needs to
//! deliver a push message to a browser's push service:
//!
//! - Generic Event Delivery Using HTTP Push (RFC 8030)
//! - Message Encryption for Web Push (RFC 8291)
//! - Voluntary Application Server Identification, VAPID (RFC 8292)
//! - Encrypted Content-Encoding for HTTP, aes128gcm (RFC 8188)
//!
//! The HTTP transport is the caller's: supply a [`reqwest::Client`] (and
//! whatever timeout or retry policy it carries) and this crate performs
//! exactly one POST per [`send`]. All validation and cryptographic work
//! completes before the request starts, so cancelling the future never
//! leaves partial state behind.
//!
//! # Usage
//!
//! Generate a VAPID key once with [`generate_key`], store it, and parse it
//! at startup. Browsers subscribe against its public key; the
//! `PushSubscription` JSON they produce is the [`Subscription`] consumed
//! here.
//!
//! ```no_run
//! # async fn demo() -> webpush::Result<()> {
//! let config = webpush::Config {
//!     vapid_key: webpush::parse_key("Npnu7ulDI0A5nvDXgrEreznX809sYVuIqEh7AXG2oOk")?,
//!     subscriber: "mailto:admin@app.server".into(),
//!     ttl: std::time::Duration::from_secs(3600),
//!     topic: None,
//!     urgency: None,
//!     record_size: None,
//!     vapid_expiration: None,
//! };
//! let subscription = webpush::Subscription {
//!     endpoint: "https://the.push.server/capability-url".into(),
//!     keys: webpush::Keys {
//!         auth: "RW2wUiDEKNzSyDxlg7ArbQ".into(),
//!         p256dh: "BOaRpSCtjsB92YouZnj8iNgCdFDNVNbid40AGxLcR47DI1S-zQkYf1CDG2G4y9GXeg74-8U_mEMzSZc-mRF_X0Y".into(),
//!     },
//! };
//!
//! let client = reqwest::Client::new();
//! let response = webpush::send(&client, b"hello", &subscription, &config).await?;
//! println!("push service replied {}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod crypto;
pub mod encoding;
mod error;
pub mod push;
pub mod vapid;

pub use crypto::{encrypt_record, MAX_RECORD_SIZE};
pub use error::{Result, WebPushError};
pub use push::{send, Config, Keys, Subscription, Urgency};
pub use vapid::{auth_header, generate_key, parse_key};
