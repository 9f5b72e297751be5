//! `pwstore edit` — open a record in an editor.
//!
//! Decrypts the record to an owner-only temp file (in `/dev/shm` when
//! available so it never reaches disk), launches the editor, and stores
//! the result back on save.  A missing record starts out empty.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use rand::Rng;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, open_store, Cli};
use crate::errors::{PwStoreError, Result};
use crate::vault::{validate_name, Record};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    validate_name(name)?;
    let settings = load_settings(cli)?;
    let mut store = open_store(cli)?;

    let current = match store.get(name) {
        Ok(record) => record,
        Err(PwStoreError::NotFound(_)) => {
            output::info(&format!("'{name}' does not exist yet — starting from an empty record."));
            Record::default()
        }
        Err(e) => return Err(e),
    };
    let original_text = current.to_text()?;

    let tmp_path = write_temp_file(&original_text)?;
    let editor = find_editor(settings.editor.as_deref());

    let status = Command::new(&editor).arg(&tmp_path).status();
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            secure_delete(&tmp_path);
            return Err(PwStoreError::Editor(format!("failed to launch '{editor}': {e}")));
        }
    };

    if !status.success() {
        secure_delete(&tmp_path);
        return Err(PwStoreError::Editor(format!(
            "editor exited with code {}",
            status.code().unwrap_or(-1)
        )));
    }

    let edited = fs::read_to_string(&tmp_path)
        .map(Zeroizing::new)
        .map_err(|e| PwStoreError::Editor(format!("failed to read edited file: {e}")));

    // Wipe and delete the temp file before anything can fail below.
    secure_delete(&tmp_path);
    let edited = edited?;

    let updated = Record::from_text(&edited)?;
    if updated == current && store.contains(name) {
        output::info("No changes detected.");
        return Ok(());
    }

    store.put(name, &updated)?;
    output::success(&format!("Saved '{name}'"));

    Ok(())
}

/// Directory for the plaintext temp file: tmpfs if present.
fn temp_dir() -> PathBuf {
    let shm = Path::new("/dev/shm");
    if shm.is_dir() {
        shm.to_path_buf()
    } else {
        std::env::temp_dir()
    }
}

/// Write the record text to a fresh owner-only temp file.
/// Returns the path to the temp file.
fn write_temp_file(text: &str) -> Result<PathBuf> {
    let filename = format!(
        "pwstore-edit-{}-{:016x}.toml",
        std::process::id(),
        rand::rng().random::<u64>()
    );
    let tmp_path = temp_dir().join(filename);

    // Create the file with restrictive permissions atomically (no TOCTOU race).
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| PwStoreError::Editor(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|e| PwStoreError::Editor(format!("failed to create temp file: {e}")))?;

    if let Err(e) = file.write_all(text.as_bytes()).and_then(|()| file.flush()) {
        secure_delete(&tmp_path);
        return Err(PwStoreError::Editor(format!("failed to write temp file: {e}")));
    }

    Ok(tmp_path)
}

/// Find the user's preferred editor.
fn find_editor(configured: Option<&str>) -> String {
    if let Some(editor) = configured.filter(|e| !e.is_empty()) {
        return editor.to_string();
    }

    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = std::env::var(var) {
            if !editor.is_empty() {
                return editor;
            }
        }
    }

    "vi".to_string()
}

/// Overwrite a file's contents with zeros before deleting it.
/// Best-effort: failures are silently ignored.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let zeros = vec![0u8; len];
                let _ = file.write_all(&zeros);
                let _ = file.sync_all();
            }
        }
    }
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_editor_wins() {
        assert_eq!(find_editor(Some("nano")), "nano");
    }

    #[test]
    fn find_editor_falls_back() {
        let editor = find_editor(Some(""));
        assert!(!editor.is_empty());
    }

    #[test]
    fn write_temp_file_creates_private_file() {
        let tmp_path = write_temp_file("username = \"a\"\n").unwrap();
        let content = fs::read_to_string(&tmp_path).unwrap();
        assert_eq!(content, "username = \"a\"\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::metadata(&tmp_path).unwrap().permissions();
            assert_eq!(perms.mode() & 0o777, 0o600);
        }

        secure_delete(&tmp_path);
        assert!(!tmp_path.exists());
    }
}
