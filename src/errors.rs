use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwstore.
#[derive(Debug, Error)]
pub enum PwStoreError {
    // --- Store admission ---
    #[error("Store at {0} is busy — another pwstore process holds the lock")]
    StoreBusy(PathBuf),

    #[error("Failed to lock {path}: {source}")]
    LockIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Store file IO ---
    #[error("Failed to read salt from {path}: {source}")]
    SaltIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read master keyset from {path}: {source}")]
    MasterIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access record file {path}: {source}")]
    RecordIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Atomic write of {path} failed during {step}: {source}")]
    AtomicWrite {
        path: PathBuf,
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    Kdf(String),

    #[error("Failed to unseal master keyset — wrong passphrase or corrupted store")]
    Unseal,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Record '{0}' failed authentication — store may be tampered or corrupted")]
    RecordDecrypt(String),

    // --- Record errors ---
    #[error("Record '{0}' not found")]
    NotFound(String),

    #[error("Invalid record name: {0}")]
    InvalidName(String),

    #[error("Invalid store format: {0}")]
    InvalidFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Terminal ---
    #[error("Passphrase prompt failed: {0}")]
    Prompt(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PwStoreError {
    /// `true` if an atomic write failed only after the target was
    /// replaced, so the new content is already visible on disk.
    pub fn target_replaced(&self) -> bool {
        matches!(
            self,
            Self::AtomicWrite { step, .. } if *step == crate::storage::STEP_SYNC_DIR
        )
    }
}

/// Convenience type alias for pwstore results.
pub type Result<T> = std::result::Result<T, PwStoreError>;
