//! On-disk record set format.
//!
//! A `pw.db` file has this layout:
//!
//! ```text
//! [PWDB: 4 bytes][version: 1 byte][record set JSON]
//! ```
//!
//! - **Magic** (`PWDB`): identifies the file as a pwstore record set.
//! - **Version**: format version (currently `1`).
//! - **Record set JSON**: `{"records":[{"name":"..","data":"<base64>"}]}`
//!   where `data` is the AEAD ciphertext of the record, bound to `name`.
//!
//! The file as a whole is not authenticated; every envelope is.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PwStoreError, Result};
use crate::storage::{read_optional, write_atomic};

/// Magic bytes at the start of every record set file.
const MAGIC: &[u8; 4] = b"PWDB";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

/// One persisted record: its name and its ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,

    /// Nonce + ciphertext + tag, serialized as a base64 string.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub data: Vec<u8>,
}

/// The complete persisted store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub records: Vec<Envelope>,
}

impl RecordSet {
    /// Encode to the on-disk byte layout.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(self)
            .map_err(|e| PwStoreError::Serialization(format!("record set: {e}")))?;

        let mut buf = Vec::with_capacity(PREFIX_LEN + body.len());
        buf.extend_from_slice(MAGIC); // 4 bytes
        buf.push(CURRENT_VERSION); // 1 byte
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Decode the on-disk byte layout.
    ///
    /// Duplicate names are rejected: a name must map to exactly one
    /// ciphertext.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < PREFIX_LEN {
            return Err(PwStoreError::InvalidFormat(
                "file too small to be a record set".into(),
            ));
        }

        if &data[0..4] != MAGIC {
            return Err(PwStoreError::InvalidFormat(
                "missing PWDB magic bytes".into(),
            ));
        }

        let version = data[4];
        if version != CURRENT_VERSION {
            return Err(PwStoreError::InvalidFormat(format!(
                "unsupported version {version}, expected {CURRENT_VERSION}"
            )));
        }

        let set: RecordSet = serde_json::from_slice(&data[PREFIX_LEN..])
            .map_err(|e| PwStoreError::InvalidFormat(format!("record set JSON: {e}")))?;

        let mut seen = HashSet::with_capacity(set.records.len());
        for env in &set.records {
            if !seen.insert(env.name.as_str()) {
                return Err(PwStoreError::InvalidFormat(format!(
                    "duplicate record name '{}'",
                    env.name
                )));
            }
        }

        Ok(set)
    }
}

/// Read the record set at `path`, or `None` if the file does not exist.
pub fn read_record_set(path: &Path) -> Result<Option<RecordSet>> {
    let data = read_optional(path).map_err(|source| PwStoreError::RecordIo {
        path: path.to_path_buf(),
        source,
    })?;
    data.map(|bytes| RecordSet::decode(&bytes)).transpose()
}

/// Atomically replace the record set at `path`.
pub fn write_record_set(path: &Path, set: &RecordSet) -> Result<()> {
    write_atomic(path, &set.encode()?)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RecordSet {
        RecordSet {
            records: vec![
                Envelope {
                    name: "bank".into(),
                    data: vec![1, 2, 3],
                },
                Envelope {
                    name: "email".into(),
                    data: vec![0xff; 40],
                },
            ],
        }
    }

    #[test]
    fn encoded_file_starts_with_magic_and_version() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..4], b"PWDB");
        assert_eq!(bytes[4], CURRENT_VERSION);
        assert_eq!(RecordSet::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn empty_set_is_valid() {
        let bytes = RecordSet::default().encode().unwrap();
        assert!(RecordSet::decode(&bytes).unwrap().records.is_empty());
    }

    #[test]
    fn rejects_bad_magic_version_and_truncation() {
        let mut bytes = sample().encode().unwrap();

        assert!(RecordSet::decode(&bytes[..3]).is_err());
        assert!(RecordSet::decode(&bytes[..bytes.len() - 2]).is_err());

        bytes[4] = 9;
        assert!(RecordSet::decode(&bytes).is_err());

        bytes[0] = b'X';
        assert!(RecordSet::decode(&bytes).is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut set = sample();
        set.records.push(Envelope {
            name: "bank".into(),
            data: vec![9],
        });
        let err = RecordSet::decode(&set.encode().unwrap()).unwrap_err();
        assert!(matches!(err, PwStoreError::InvalidFormat(_)));
    }

    #[test]
    fn read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_record_set(&dir.path().join("pw.db")).unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pw.db");
        write_record_set(&path, &sample()).unwrap();
        assert_eq!(read_record_set(&path).unwrap().unwrap(), sample());
    }
}
