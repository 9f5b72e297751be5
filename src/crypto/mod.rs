//! Cryptographic primitives and the key hierarchy for pwstore.
//!
//! This module provides:
//! - AES-256-GCM encryption with associated data (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - Wrapping/master key types and keyset sealing (`keys`)
//! - First-run initialisation and unsealing of the master key (`hierarchy`)

pub mod encryption;
pub mod hierarchy;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, load_or_init_master_key, ...};
pub use encryption::{decrypt, encrypt, AuthenticationFailed};
pub use hierarchy::{load_or_init_master_key, MASTER_FILE, SALT_FILE};
pub use kdf::{derive_wrapping_key, generate_salt};
pub use keys::{MasterKey, WrappingKey};
