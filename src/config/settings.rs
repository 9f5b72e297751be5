use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PwStoreError, Result};

/// Which characters `pwstore gen` draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    /// Printable ASCII excluding space.
    Printable,
    /// Letters and digits only.
    Alphanumeric,
}

/// User-level configuration, loaded from `<store_dir>/pwstore.toml`.
///
/// Every field has a sensible default so pwstore works out-of-the-box
/// without any config file at all.  Key-derivation costs are deliberately
/// not configurable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Length of passwords produced by `gen` when `--length` is omitted.
    #[serde(default = "default_generate_length")]
    pub generate_length: usize,

    /// Character set used by `gen`.
    #[serde(default = "default_generate_charset")]
    pub generate_charset: Charset,

    /// Editor command for `edit` (falls back to $VISUAL / $EDITOR / vi).
    #[serde(default)]
    pub editor: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_generate_length() -> usize {
    20
}

fn default_generate_charset() -> Charset {
    Charset::Printable
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            generate_length: default_generate_length(),
            generate_charset: default_generate_charset(),
            editor: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the store directory.
    pub const FILE_NAME: &'static str = "pwstore.toml";

    /// Load settings from `<store_dir>/pwstore.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(store_dir: &Path) -> Result<Self> {
        let config_path = store_dir.join(Self::FILE_NAME);

        let contents = match std::fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PwStoreError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.generate_length == 0 {
            return Err(PwStoreError::Config(format!(
                "{}: generate_length must be at least 1",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Resolve the store directory: explicit override or `$HOME/.pwstore`.
    pub fn store_dir(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }
        let base = directories::BaseDirs::new().ok_or_else(|| {
            PwStoreError::Config("unable to determine the user's home directory".into())
        })?;
        Ok(base.home_dir().join(".pwstore"))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
