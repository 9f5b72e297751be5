//! Key types for the two-tier hierarchy.
//!
//! - [`WrappingKey`]: derived from the passphrase each run, used only to
//!   seal/unseal the master keyset.
//! - [`MasterKey`]: random, generated once, encrypts every record.
//!
//! Both zero their memory on drop.  The master key is persisted only as a
//! sealed [`Keyset`] blob.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PwStoreError, Result};

use super::encryption::{decrypt, encrypt};

/// Length of every symmetric key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Associated data binding a sealed blob to its role.
const MASTER_AAD: &[u8] = b"pwstore/master/v1";

const KEYSET_VERSION: u8 = 1;
const KEYSET_ALGORITHM: &str = "AES256-GCM";

/// Passphrase-derived key that seals the master keyset.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct WrappingKey {
    bytes: [u8; KEY_LEN],
}

impl WrappingKey {
    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_LEN],
        }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Serialize `master` as a keyset and encrypt it under this key.
    pub fn seal(&self, master: &MasterKey) -> Result<Vec<u8>> {
        let keyset = Keyset {
            version: KEYSET_VERSION,
            algorithm: KEYSET_ALGORITHM.to_string(),
            key: master.as_bytes().to_vec(),
        };
        let plaintext = Zeroizing::new(
            serde_json::to_vec(&keyset)
                .map_err(|e| PwStoreError::Serialization(format!("master keyset: {e}")))?,
        );
        encrypt(&self.bytes, &plaintext, MASTER_AAD)
    }

    /// Decrypt a sealed keyset and recover the master key.
    ///
    /// An authentication failure means a wrong passphrase or a damaged
    /// `master` file and is reported as [`PwStoreError::Unseal`].
    pub fn unseal(&self, sealed: &[u8]) -> Result<MasterKey> {
        let plaintext = Zeroizing::new(
            decrypt(&self.bytes, sealed, MASTER_AAD).map_err(|_| PwStoreError::Unseal)?,
        );

        let keyset: Keyset = serde_json::from_slice(&plaintext)
            .map_err(|e| PwStoreError::InvalidFormat(format!("master keyset: {e}")))?;

        if keyset.version != KEYSET_VERSION {
            return Err(PwStoreError::InvalidFormat(format!(
                "unsupported keyset version {}, expected {KEYSET_VERSION}",
                keyset.version
            )));
        }
        if keyset.algorithm != KEYSET_ALGORITHM {
            return Err(PwStoreError::InvalidFormat(format!(
                "unsupported keyset algorithm '{}'",
                keyset.algorithm
            )));
        }

        let mut bytes: [u8; KEY_LEN] = keyset.key.as_slice().try_into().map_err(|_| {
            PwStoreError::InvalidFormat(format!(
                "master key must be {KEY_LEN} bytes, got {}",
                keyset.key.len()
            ))
        })?;
        let master = MasterKey::new(bytes);
        bytes.zeroize();
        Ok(master)
    }
}

/// The record-encryption key, held for the lifetime of an open store.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random master key.
    pub fn generate() -> Self {
        let mut generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&generated);
        generated.as_mut_slice().zeroize();
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Encrypt a serialized record, binding it to `name`.
    pub fn seal_record(&self, name: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        encrypt(&self.bytes, plaintext, name.as_bytes())
    }

    /// Decrypt the ciphertext stored under `name`.
    ///
    /// Fails with [`PwStoreError::RecordDecrypt`] if the blob was altered or
    /// was produced for a different name.
    pub fn open_record(&self, name: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        decrypt(&self.bytes, ciphertext, name.as_bytes())
            .map(Zeroizing::new)
            .map_err(|_| PwStoreError::RecordDecrypt(name.to_string()))
    }
}

/// Serialized form of the master key inside the sealed `master` file.
#[derive(Serialize, Deserialize, Zeroize)]
#[zeroize(drop)]
struct Keyset {
    version: u8,
    algorithm: String,
    #[serde(with = "key_material")]
    key: Vec<u8>,
}

/// Base64 serde helpers that wipe their intermediate strings.
mod key_material {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};
    use zeroize::Zeroizing;

    pub fn serialize<S: Serializer>(key: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = Zeroizing::new(BASE64.encode(key));
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Zeroizing::new(String::deserialize(deserializer)?);
        BASE64.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapping(byte: u8) -> WrappingKey {
        let mut key = WrappingKey::zeroed();
        key.as_mut_bytes().fill(byte);
        key
    }

    #[test]
    fn seal_unseal_recovers_master() {
        let master = MasterKey::generate();
        let sealed = wrapping(1).seal(&master).unwrap();

        let recovered = wrapping(1).unseal(&sealed).unwrap();
        assert_eq!(recovered.as_bytes(), master.as_bytes());
    }

    #[test]
    fn unseal_with_wrong_key_is_unseal_error() {
        let sealed = wrapping(1).seal(&MasterKey::generate()).unwrap();
        let err = wrapping(2).unseal(&sealed).err().unwrap();
        assert!(matches!(err, PwStoreError::Unseal));
    }

    #[test]
    fn unseal_corrupted_blob_is_unseal_error() {
        let mut sealed = wrapping(1).seal(&MasterKey::generate()).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(
            wrapping(1).unseal(&sealed).err().unwrap(),
            PwStoreError::Unseal
        ));
        assert!(matches!(
            wrapping(1).unseal(&[]).err().unwrap(),
            PwStoreError::Unseal
        ));
    }

    #[test]
    fn sealed_keyset_does_not_contain_key() {
        let master = MasterKey::generate();
        let sealed = wrapping(3).seal(&master).unwrap();
        assert!(!sealed
            .windows(KEY_LEN)
            .any(|w| w == master.as_bytes().as_slice()));
    }

    #[test]
    fn generated_master_keys_differ() {
        assert_ne!(
            MasterKey::generate().as_bytes(),
            MasterKey::generate().as_bytes()
        );
    }

    #[test]
    fn record_ciphertext_is_bound_to_name() {
        let master = MasterKey::new([9u8; KEY_LEN]);
        let blob = master.seal_record("email", b"payload").unwrap();

        assert_eq!(master.open_record("email", &blob).unwrap().as_slice(), b"payload");
        let err = master.open_record("bank", &blob).unwrap_err();
        assert!(matches!(err, PwStoreError::RecordDecrypt(ref n) if n == "bank"));
    }
}
