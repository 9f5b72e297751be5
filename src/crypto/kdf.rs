//! Passphrase-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The cost parameters are compiled in and cannot be
//! changed at runtime: every store ever written must be re-derivable with
//! exactly these values.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{PwStoreError, Result};

use super::keys::{WrappingKey, KEY_LEN};

/// Length of a freshly generated salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Shortest salt accepted from disk.
pub const MIN_SALT_LEN: usize = 16;

/// Argon2id time cost (passes over memory).
pub const ARGON2_ITERATIONS: u32 = 1;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id parallelism lanes.
pub const ARGON2_PARALLELISM: u32 = 4;

/// Derive the wrapping key from a passphrase and the store salt.
///
/// The same passphrase + salt always produce the same key.
pub fn derive_wrapping_key(passphrase: &[u8], salt: &[u8]) -> Result<WrappingKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(PwStoreError::Kdf(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(KEY_LEN),
    )
    .map_err(|e| PwStoreError::Kdf(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = WrappingKey::zeroed();
    argon2
        .hash_password_into(passphrase, salt, key.as_mut_bytes())
        .map_err(|e| PwStoreError::Kdf(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
