//! AES-256-GCM authenticated encryption with associated data.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.  The associated data is authenticated but not
//! stored; the caller must present the same bytes again to decrypt.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{PwStoreError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Why `decrypt` failed.  Callers map this onto the error kind that fits
/// the object being opened (master keyset vs. a single record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationFailed;

/// Encrypt `plaintext` with a 32-byte `key`, binding `aad`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| PwStoreError::Encryption(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| PwStoreError::Encryption(format!("encryption error: {e}")))?;

    // Prepend the nonce so the caller only needs to store one blob.
    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt` with the same `aad`.
///
/// Truncated input, a wrong key and mismatched associated data all fail
/// the same way; no partial plaintext is ever returned.
pub fn decrypt(
    key: &[u8],
    ciphertext_with_nonce: &[u8],
    aad: &[u8],
) -> std::result::Result<Vec<u8>, AuthenticationFailed> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(AuthenticationFailed);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| AuthenticationFailed)?;

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aad_is_bound_to_ciphertext() {
        let key = [0x42u8; 32];
        let blob = encrypt(&key, b"p4ss", b"email").unwrap();

        assert_eq!(decrypt(&key, &blob, b"email").unwrap(), b"p4ss");
        assert_eq!(decrypt(&key, &blob, b"bank"), Err(AuthenticationFailed));
        assert_eq!(decrypt(&key, &blob, b""), Err(AuthenticationFailed));
    }

    #[test]
    fn output_layout_is_nonce_ciphertext_tag() {
        let key = [0x01u8; 32];
        let blob = encrypt(&key, b"12345", b"").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn rejects_bad_key_length() {
        assert!(encrypt(&[0u8; 16], b"x", b"").is_err());
    }
}
