//! Message encryption for Web Push (RFC 8291, aes128gcm coding of RFC 8188).
//!
//! Every call derives single-use key material: a fresh P-256 ephemeral key
//! agrees a shared secret with the subscriber's key, HKDF-SHA256 walks that
//! down to a 16-byte content-encryption key and a 12-byte nonce, and
//! AES-128-GCM seals `message || 0x02` behind a self-describing 86-byte
//! record header. Compromise of one message key exposes nothing about any
//! other message.

// Rust guideline compliant 2026-02

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::rand_core::CryptoRngCore;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::encoding;
use crate::error::{Result, WebPushError};

/// Push services are not required to accept records beyond this; Apple for
/// example does not. Used as both the default and the advertised limit.
pub const MAX_RECORD_SIZE: u32 = 4096;

/// salt (16) + record size (4) + key length (1) + uncompressed point (65).
pub(crate) const HEADER_LEN: usize = 86;

/// Header plus the mandatory 0x02 delimiter and the 16-byte GCM tag.
pub(crate) const MIN_OVERHEAD: usize = 103;

const WEBPUSH_INFO: &[u8] = b"WebPush: info\x00";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\x00";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\x00";

/// HKDF-SHA256: extract with `salt`, expand `info` to `length` bytes.
fn hkdf_expand(length: usize, secret: &[u8], salt: &[u8], info: &[u8]) -> Result<Vec<u8>> {
    let mut okm = vec![0u8; length];
    Hkdf::<Sha256>::new(Some(salt), secret)
        .expand(info, &mut okm)
        .map_err(|_| WebPushError::Crypto("hkdf expand"))?;
    Ok(okm)
}

/// Encrypt `message` into a self-contained aes128gcm record for the
/// subscriber identified by `auth_secret` and `client_public_key` (the
/// base64 `auth` and `p256dh` fields of the subscription, any variant).
///
/// The record is `record_size` bytes at most but is never padded up to it;
/// its length is always `86 + message.len() + 17`. `rng` supplies the salt
/// and the single-use message key — pass
/// [`OsRng`](p256::elliptic_curve::rand_core::OsRng) outside of tests.
pub fn encrypt_record(
    message: &[u8],
    auth_secret: &str,
    client_public_key: &str,
    record_size: u32,
    rng: &mut impl CryptoRngCore,
) -> Result<Vec<u8>> {
    if (record_size as usize) < MIN_OVERHEAD
        || message.len() > record_size as usize - MIN_OVERHEAD
    {
        return Err(WebPushError::MessageTooLong {
            length: message.len(),
            record_size,
        });
    }

    let auth_secret = encoding::decode(auth_secret).map_err(WebPushError::InvalidAuthSecret)?;
    let client_public_bytes = encoding::decode(client_public_key)
        .map_err(|e| WebPushError::InvalidPublicKey(e.to_string()))?;
    let client_public = PublicKey::from_sec1_bytes(&client_public_bytes)
        .map_err(|e| WebPushError::InvalidPublicKey(e.to_string()))?;

    let mut salt = [0u8; 16];
    rng.fill_bytes(&mut salt);

    // Single-use key for this message; zeroized on drop.
    let message_key = EphemeralSecret::random(rng);
    let message_public = message_key.public_key().to_encoded_point(false);
    let message_public_bytes = message_public.as_bytes();

    let shared_secret = message_key.diffie_hellman(&client_public);

    let mut key_info = Vec::with_capacity(
        WEBPUSH_INFO.len() + client_public_bytes.len() + message_public_bytes.len(),
    );
    key_info.extend_from_slice(WEBPUSH_INFO);
    key_info.extend_from_slice(&client_public_bytes);
    key_info.extend_from_slice(message_public_bytes);

    let mut ikm = hkdf_expand(
        32,
        shared_secret.raw_secret_bytes().as_slice(),
        &auth_secret,
        &key_info,
    )?;
    let mut cek = hkdf_expand(16, &ikm, &salt, CEK_INFO)?;
    let nonce = hkdf_expand(12, &ikm, &salt, NONCE_INFO)?;

    let cipher =
        Aes128Gcm::new_from_slice(&cek).map_err(|_| WebPushError::Crypto("cipher setup"))?;

    // Plaintext staging and output record are separate buffers; the record
    // is sized once for header + ciphertext + tag.
    let mut plaintext = Vec::with_capacity(message.len() + 1);
    plaintext.extend_from_slice(message);
    plaintext.push(0x02);

    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
        .map_err(|_| WebPushError::Crypto("seal"))?;

    plaintext.zeroize();
    cek.zeroize();
    ikm.zeroize();

    let mut record = Vec::with_capacity(HEADER_LEN + sealed.len());
    record.extend_from_slice(&salt);
    record.extend_from_slice(&record_size.to_be_bytes());
    record.push(message_public_bytes.len() as u8);
    record.extend_from_slice(message_public_bytes);
    record.extend_from_slice(&sealed);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
    use p256::elliptic_curve::rand_core::{CryptoRng, Error, OsRng, RngCore};
    use p256::SecretKey;

    /// Deterministic byte counter standing in for the system RNG.
    ///
    /// Yields 0, 1, 2, ... from the seed; low bytes keep the derived P-256
    /// scalar nonzero and below the group order, so key generation never
    /// rejects a draw.
    struct FixedRng(u8);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest.iter_mut() {
                *byte = self.0;
                self.0 = self.0.wrapping_add(1);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for FixedRng {}

    /// Subscriber-side key material for round-trip tests.
    struct Receiver {
        secret: SecretKey,
        auth_secret: [u8; 16],
    }

    impl Receiver {
        fn new() -> Self {
            let mut auth_secret = [0u8; 16];
            OsRng.fill_bytes(&mut auth_secret);
            Self {
                secret: SecretKey::random(&mut OsRng),
                auth_secret,
            }
        }

        fn auth_b64(&self) -> String {
            BASE64URL.encode(self.auth_secret)
        }

        fn p256dh_b64(&self) -> String {
            BASE64URL.encode(self.secret.public_key().to_encoded_point(false).as_bytes())
        }

        /// Open a record the way a user agent would.
        fn decrypt(&self, record: &[u8]) -> std::result::Result<Vec<u8>, aes_gcm::Error> {
            let salt = &record[..16];
            let key_len = usize::from(record[20]);
            let message_public_bytes = &record[21..21 + key_len];
            let message_public =
                PublicKey::from_sec1_bytes(message_public_bytes).expect("ephemeral point");
            let shared = p256::ecdh::diffie_hellman(
                self.secret.to_nonzero_scalar(),
                message_public.as_affine(),
            );

            let client_public = self.secret.public_key().to_encoded_point(false);
            let mut key_info = WEBPUSH_INFO.to_vec();
            key_info.extend_from_slice(client_public.as_bytes());
            key_info.extend_from_slice(message_public_bytes);

            let ikm = hkdf_expand(
                32,
                shared.raw_secret_bytes().as_slice(),
                &self.auth_secret,
                &key_info,
            )
            .expect("ikm");
            let cek = hkdf_expand(16, &ikm, salt, CEK_INFO).expect("cek");
            let nonce = hkdf_expand(12, &ikm, salt, NONCE_INFO).expect("nonce");

            let cipher = Aes128Gcm::new_from_slice(&cek).expect("cek length");
            cipher.decrypt(Nonce::from_slice(&nonce), &record[HEADER_LEN..])
        }
    }

    #[test]
    fn test_record_layout() {
        let receiver = Receiver::new();
        let record = encrypt_record(
            b"Test",
            &receiver.auth_b64(),
            &receiver.p256dh_b64(),
            MAX_RECORD_SIZE,
            &mut FixedRng(0),
        )
        .expect("record");

        // 86-byte header + message + delimiter + tag.
        assert_eq!(record.len(), HEADER_LEN + 4 + 1 + 16);
        // Salt is the first 16 RNG bytes.
        let expected_salt: Vec<u8> = (0u8..16).collect();
        assert_eq!(&record[..16], expected_salt.as_slice());
        // Record size limit, big-endian.
        assert_eq!(&record[16..20], &4096u32.to_be_bytes());
        // Key length byte matches the uncompressed point that follows.
        assert_eq!(record[20], 65);
        assert_eq!(record[21], 0x04);
    }

    #[test]
    fn test_roundtrip_decrypt() {
        let receiver = Receiver::new();
        let message = b"some arbitrary push payload";
        let record = encrypt_record(
            message,
            &receiver.auth_b64(),
            &receiver.p256dh_b64(),
            MAX_RECORD_SIZE,
            &mut OsRng,
        )
        .expect("record");

        let opened = receiver.decrypt(&record).expect("opens");
        assert_eq!(&opened[..message.len()], message);
        // Single delimiter byte, no extra padding.
        assert_eq!(&opened[message.len()..], &[0x02]);
    }

    #[test]
    fn test_deterministic_with_fixed_rng() {
        let receiver = Receiver::new();
        let encrypt = |seed: u8| {
            encrypt_record(
                b"Test",
                &receiver.auth_b64(),
                &receiver.p256dh_b64(),
                MAX_RECORD_SIZE,
                &mut FixedRng(seed),
            )
            .expect("record")
        };
        assert_eq!(encrypt(0), encrypt(0));
        assert_ne!(encrypt(0), encrypt(1));
    }

    #[test]
    fn test_message_length_boundary() {
        let receiver = Receiver::new();
        let auth = receiver.auth_b64();
        let p256dh = receiver.p256dh_b64();

        let fits = vec![b'1'; MAX_RECORD_SIZE as usize - MIN_OVERHEAD];
        let record = encrypt_record(&fits, &auth, &p256dh, MAX_RECORD_SIZE, &mut OsRng)
            .expect("boundary message fits");
        // A maximal message fills the record exactly.
        assert_eq!(record.len(), MAX_RECORD_SIZE as usize);

        let too_long = vec![b'1'; MAX_RECORD_SIZE as usize - MIN_OVERHEAD + 1];
        assert!(matches!(
            encrypt_record(&too_long, &auth, &p256dh, MAX_RECORD_SIZE, &mut OsRng),
            Err(WebPushError::MessageTooLong {
                length: 3994,
                record_size: 4096,
            })
        ));
    }

    #[test]
    fn test_record_size_below_overhead_rejects_everything() {
        let receiver = Receiver::new();
        assert!(matches!(
            encrypt_record(
                b"12",
                &receiver.auth_b64(),
                &receiver.p256dh_b64(),
                1,
                &mut OsRng
            ),
            Err(WebPushError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_auth_secret() {
        let receiver = Receiver::new();
        assert!(matches!(
            encrypt_record(b"1", "{}", &receiver.p256dh_b64(), MAX_RECORD_SIZE, &mut OsRng),
            Err(WebPushError::InvalidAuthSecret(_))
        ));
    }

    #[test]
    fn test_invalid_public_key() {
        let receiver = Receiver::new();
        // Bad encoding.
        assert!(matches!(
            encrypt_record(b"1", &receiver.auth_b64(), "{}", MAX_RECORD_SIZE, &mut OsRng),
            Err(WebPushError::InvalidPublicKey(_))
        ));
        // Decodes, but is not a point on the curve.
        let not_a_point = BASE64URL.encode([0xffu8; 65]);
        assert!(matches!(
            encrypt_record(
                b"1",
                &receiver.auth_b64(),
                &not_a_point,
                MAX_RECORD_SIZE,
                &mut OsRng
            ),
            Err(WebPushError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_tampered_record_fails_to_open() {
        let receiver = Receiver::new();
        let mut record = encrypt_record(
            b"Test",
            &receiver.auth_b64(),
            &receiver.p256dh_b64(),
            MAX_RECORD_SIZE,
            &mut OsRng,
        )
        .expect("record");

        let last = record.len() - 1;
        record[last] ^= 0x01;
        assert!(receiver.decrypt(&record).is_err());
    }
}
