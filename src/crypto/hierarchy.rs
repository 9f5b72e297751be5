//! Loading (or creating on first run) the master key.
//!
//! ```text
//! passphrase ──┐
//!              ├─ Argon2id ─> WrappingKey ── unseal(master file) ─> MasterKey
//! salt file ───┘
//! ```
//!
//! The salt and the sealed master keyset are written once and are
//! authoritative afterwards; neither is ever regenerated while present.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{PwStoreError, Result};
use crate::prompt::PassphraseSource;
use crate::storage::{read_optional, write_atomic};

use super::kdf::{derive_wrapping_key, generate_salt};
use super::keys::{MasterKey, WrappingKey};

/// File holding the raw KDF salt.
pub const SALT_FILE: &str = "salt";

/// File holding the sealed master keyset.
pub const MASTER_FILE: &str = "master";

/// Obtain the master key for the store in `store_dir`.
///
/// Reads (or creates) the salt, asks `source` for the passphrase, derives
/// the wrapping key and then unseals the existing master keyset or seals
/// and persists a brand-new one.
pub fn load_or_init_master_key(
    store_dir: &Path,
    source: &mut dyn PassphraseSource,
) -> Result<MasterKey> {
    let salt = load_or_init_salt(store_dir)?;

    // The passphrase buffer is wiped at the end of this block.
    let wrapping = {
        let passphrase = source.read_passphrase()?;
        derive_wrapping_key(&passphrase, &salt)?
    };

    load_or_init_master(store_dir, &wrapping)
}

fn load_or_init_salt(store_dir: &Path) -> Result<Vec<u8>> {
    let salt_path = store_dir.join(SALT_FILE);
    let existing = read_optional(&salt_path).map_err(|source| PwStoreError::SaltIo {
        path: salt_path.clone(),
        source,
    })?;

    if let Some(salt) = existing {
        return Ok(salt);
    }

    // A sealed keyset without its salt can never be opened again; refuse
    // rather than paper over it with a fresh salt.
    let master_path = store_dir.join(MASTER_FILE);
    if master_path.symlink_metadata().is_ok() {
        return Err(PwStoreError::InvalidFormat(format!(
            "{} exists but {} is missing",
            master_path.display(),
            salt_path.display()
        )));
    }

    let salt = generate_salt();
    write_atomic(&salt_path, &salt)?;
    info!(path = %salt_path.display(), "created new salt");
    Ok(salt.to_vec())
}

fn load_or_init_master(store_dir: &Path, wrapping: &WrappingKey) -> Result<MasterKey> {
    let master_path = store_dir.join(MASTER_FILE);
    let existing = read_optional(&master_path).map_err(|source| PwStoreError::MasterIo {
        path: master_path.clone(),
        source,
    })?;

    match existing {
        Some(sealed) => {
            let master = wrapping.unseal(&sealed)?;
            debug!(path = %master_path.display(), "master keyset unsealed");
            Ok(master)
        }
        None => {
            let master = MasterKey::generate();
            let sealed = wrapping.seal(&master)?;
            write_atomic(&master_path, &sealed)?;
            info!(path = %master_path.display(), "created new master keyset");
            Ok(master)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::StaticPassphrase;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_run_creates_salt_and_master() {
        let dir = TempDir::new().unwrap();
        let mut pw = StaticPassphrase::new("correct-horse");

        load_or_init_master_key(dir.path(), &mut pw).unwrap();

        assert_eq!(fs::read(dir.path().join(SALT_FILE)).unwrap().len(), 16);
        assert!(dir.path().join(MASTER_FILE).is_file());
    }

    #[test]
    fn second_run_unseals_same_key() {
        let dir = TempDir::new().unwrap();
        let first = load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("pw")).unwrap();
        let second = load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("pw")).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn wrong_passphrase_is_unseal_error() {
        let dir = TempDir::new().unwrap();
        load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("right")).unwrap();

        let err = load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("wrong"))
            .err()
            .unwrap();
        assert!(matches!(err, PwStoreError::Unseal));
    }

    #[test]
    fn missing_salt_with_existing_master_is_refused() {
        let dir = TempDir::new().unwrap();
        load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("pw")).unwrap();
        fs::remove_file(dir.path().join(SALT_FILE)).unwrap();

        let err = load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("pw"))
            .err()
            .unwrap();
        assert!(matches!(err, PwStoreError::InvalidFormat(_)));
        assert!(!dir.path().join(SALT_FILE).exists());
    }

    #[test]
    fn short_salt_on_disk_is_kdf_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SALT_FILE), [1u8; 4]).unwrap();

        let err = load_or_init_master_key(dir.path(), &mut StaticPassphrase::new("pw"))
            .err()
            .unwrap();
        assert!(matches!(err, PwStoreError::Kdf(_)));
    }
}
