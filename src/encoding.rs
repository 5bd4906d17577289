//! Permissive base64 decoding.
//!
//! Subscription key material reaches the application server through
//! different user agents, tooling, and copy/paste paths, and each emits one
//! of four base64 variants for the same logical bytes: standard or URL-safe
//! alphabet, padded or unpadded. The decoder classifies the variant from
//! the input itself so callers never supply a hint.

// Rust guideline compliant 2026-02

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::engine::GeneralPurpose;
use base64::{DecodeError, Engine};

/// Pick the engine matching the input's alphabet and padding.
///
/// The alphabet is decided by the first variant-specific byte: `-` or `_`
/// selects URL-safe, `+` or `/` standard. Inputs containing neither decode
/// identically under both alphabets. Padding is read off the final byte.
fn engine_for(input: &str) -> &'static GeneralPurpose {
    let bytes = input.as_bytes();
    let padded = bytes.last() == Some(&b'=');

    let mut url_safe = true;
    for &b in bytes {
        match b {
            b'-' | b'_' => break,
            b'+' | b'/' => {
                url_safe = false;
                break;
            }
            _ => {}
        }
    }

    match (url_safe, padded) {
        (true, true) => &URL_SAFE,
        (true, false) => &URL_SAFE_NO_PAD,
        (false, true) => &STANDARD,
        (false, false) => &STANDARD_NO_PAD,
    }
}

/// Decode `input`, auto-detecting which of the four base64 variants it uses.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    engine_for(input).decode(input)
}
