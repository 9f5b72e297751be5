//! The encrypted record store.
//!
//! `SecretStore` owns the store lock, the master key and an in-memory map
//! of name -> ciphertext.  Records are only decrypted on `get`; every
//! `put` rewrites the whole `pw.db` atomically before returning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::crypto::{load_or_init_master_key, MasterKey};
use crate::errors::{PwStoreError, Result};
use crate::prompt::PassphraseSource;
use crate::storage::{ensure_private_dir, StoreLock};

use super::format::{self, Envelope, RecordSet};
use super::record::Record;

/// Zero-length file carrying the advisory lock.
pub const LOCK_FILE: &str = "lock";

/// The serialized record set.
pub const RECORDS_FILE: &str = "pw.db";

/// Longest accepted record name, in bytes.
const MAX_NAME_LEN: usize = 256;

/// An open store.  Only one can exist per store directory across all
/// processes; the lock is released when this value is dropped.
pub struct SecretStore {
    /// Store directory (holds lock, salt, master, pw.db).
    dir: PathBuf,

    /// In-memory map of record name -> ciphertext.
    records: HashMap<String, Vec<u8>>,

    /// The unsealed master key (zeroized on drop).
    master_key: MasterKey,

    /// Held for the lifetime of the store.
    _lock: StoreLock,
}

impl SecretStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the store in `dir`, creating it on first use.
    ///
    /// 1. create `dir` (owner-only) and take the exclusive lock
    /// 2. obtain the master key (prompting via `passphrase`)
    /// 3. load `pw.db`, committing an empty one if it does not exist yet
    pub fn open(dir: &Path, passphrase: &mut dyn PassphraseSource) -> Result<Self> {
        ensure_private_dir(dir).map_err(|source| PwStoreError::RecordIo {
            path: dir.to_path_buf(),
            source,
        })?;

        let lock = StoreLock::acquire(&dir.join(LOCK_FILE))?;
        let master_key = load_or_init_master_key(dir, passphrase)?;

        let mut store = Self {
            dir: dir.to_path_buf(),
            records: HashMap::new(),
            master_key,
            _lock: lock,
        };

        match format::read_record_set(&store.records_path())? {
            Some(set) => {
                store.records = set
                    .records
                    .into_iter()
                    .map(|env| (env.name, env.data))
                    .collect();
                debug!(count = store.records.len(), "record set loaded");
            }
            None => {
                store.commit()?;
                info!(path = %store.records_path().display(), "initialised empty record set");
            }
        }

        Ok(store)
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// All record names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.keys().cloned().collect();
        names.sort();
        names
    }

    /// Decrypt and return the record stored under `name`.
    pub fn get(&self, name: &str) -> Result<Record> {
        let ciphertext = self
            .records
            .get(name)
            .ok_or_else(|| PwStoreError::NotFound(name.to_string()))?;

        let plaintext = self.master_key.open_record(name, ciphertext)?;
        Record::from_bytes(&plaintext)
    }

    /// Encrypt `record` under `name`, replacing any previous value, and
    /// persist the whole store.
    ///
    /// Returns only after `pw.db` has been durably replaced.  If the write
    /// fails the in-memory map is rolled back so it keeps matching disk.
    pub fn put(&mut self, name: &str, record: &Record) -> Result<()> {
        validate_name(name)?;
        record.validate()?;

        let plaintext = record.to_bytes()?;
        let ciphertext = self.master_key.seal_record(name, &plaintext)?;

        let previous = self.records.insert(name.to_string(), ciphertext);
        if let Err(e) = self.commit() {
            // After a completed rename `pw.db` already holds the new
            // record; keep memory in step with it.
            if e.target_replaced() {
                warn!(name, error = %e, "record committed but directory flush failed");
                return Err(e);
            }
            match previous {
                Some(old) => self.records.insert(name.to_string(), old),
                None => self.records.remove(name),
            };
            return Err(e);
        }

        debug!(name, "record committed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the whole map and atomically rewrite `pw.db`.
    fn commit(&self) -> Result<()> {
        let mut records: Vec<Envelope> = self
            .records
            .iter()
            .map(|(name, data)| Envelope {
                name: name.clone(),
                data: data.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        format::write_record_set(&self.records_path(), &RecordSet { records })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path of `pw.db`.
    pub fn records_path(&self) -> PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if a record exists under `name` (no decryption).
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }
}

/// Validate that a record name is storable.
///
/// Must be non-empty, at most 256 bytes and free of control characters.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PwStoreError::InvalidName("name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(PwStoreError::InvalidName(format!(
            "name cannot exceed {MAX_NAME_LEN} bytes"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(PwStoreError::InvalidName(format!(
            "name {name:?} contains control characters"
        )));
    }
    Ok(())
}
