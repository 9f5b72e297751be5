//! The protected payload stored under each name.
//!
//! A `Record` always has a username and a password; anything else lives
//! in the open-ended `fields` map.  Two encodings exist:
//!
//! - **binary** (`to_bytes` / `from_bytes`): compact JSON, only ever seen
//!   in cleartext inside the encrypt/decrypt step.
//! - **text** (`to_text` / `from_text`): TOML, for editing, import and
//!   export by humans.
//!
//! ```toml
//! username = "a@b.com"
//! password = "p4ss"
//! url = "https://example.com"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PwStoreError, Result};

/// Keys that live in dedicated fields and may not appear in `fields`.
const RESERVED_KEYS: [&str; 2] = ["username", "password"];

/// A single credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Additional opaque fields (e.g. `url`, `notes`), kept sorted.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach an extra field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Check that the record survives its own encodings.
    ///
    /// An extra field named like a dedicated one would serialize as a
    /// duplicate key and shadow the real value on the way back in.
    pub fn validate(&self) -> Result<()> {
        if let Some(key) = RESERVED_KEYS.iter().find(|k| self.fields.contains_key(**k)) {
            return Err(PwStoreError::Serialization(format!(
                "extra field '{key}' clashes with the built-in {key} field"
            )));
        }
        Ok(())
    }

    /// Serialize for encryption.
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| PwStoreError::Serialization(format!("record: {e}")))
    }

    /// Parse the decrypted binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| PwStoreError::Serialization(format!("record: {e}")))
    }

    /// Render the human-editable TOML form.
    pub fn to_text(&self) -> Result<Zeroizing<String>> {
        toml::to_string(self)
            .map(Zeroizing::new)
            .map_err(|e| PwStoreError::Serialization(format!("record text: {e}")))
    }

    /// Parse the human-editable TOML form.
    ///
    /// Missing `username`/`password` default to empty; extra keys must be
    /// strings.
    pub fn from_text(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PwStoreError::Serialization(format!("record text: {e}")))
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        self.username.zeroize();
        self.password.zeroize();
        for value in self.fields.values_mut() {
            value.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_form_roundtrips_extra_fields() {
        let record = Record::new("a@b.com", "p4ss").with_field("url", "https://b.com");
        let bytes = record.to_bytes().unwrap();
        assert_eq!(Record::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn text_form_is_flat_toml() {
        let record = Record::new("a@b.com", "p4ss").with_field("notes", "recovery codes in safe");
        let text = record.to_text().unwrap();

        assert!(text.contains("username = \"a@b.com\""));
        assert!(text.contains("password = \"p4ss\""));
        assert!(text.contains("notes = \"recovery codes in safe\""));
        assert_eq!(Record::from_text(&text).unwrap(), record);
    }

    #[test]
    fn text_form_defaults_missing_fields() {
        let record = Record::from_text("password = \"only\"\n").unwrap();
        assert_eq!(record.username, "");
        assert_eq!(record.password, "only");
        assert!(record.fields.is_empty());
    }

    #[test]
    fn reserved_extra_fields_are_rejected() {
        assert!(Record::new("a", "b").with_field("url", "x").validate().is_ok());

        let shadowed = Record::new("a", "b").with_field("password", "shadow");
        assert!(matches!(
            shadowed.validate(),
            Err(PwStoreError::Serialization(_))
        ));
        assert!(Record::default()
            .with_field("username", "u")
            .validate()
            .is_err());
    }

    #[test]
    fn text_form_keeps_dedicated_keys_out_of_fields() {
        let record = Record::from_text("username = \"a\"\npassword = \"b\"\n").unwrap();
        assert!(record.fields.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn text_form_rejects_garbage() {
        assert!(Record::from_text("not = valid = toml").is_err());
        assert!(Record::from_text("count = 3\n").is_err());
    }
}
