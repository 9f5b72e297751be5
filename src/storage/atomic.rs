//! Crash-safe whole-file replacement.
//!
//! Writes follow the classic sequence:
//!
//! 1. create `<target>.tmp` in the same directory (owner-only, no symlinks)
//! 2. write the data and `fsync()` the temp file
//! 3. `rename()` the temp file over the target
//! 4. `fsync()` the containing directory
//!
//! Readers therefore observe either the previous content or the new
//! content, never a truncated file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{PwStoreError, Result};

/// Step name reported when the directory flush fails after the rename.
/// By then the target already holds the new content.
pub const STEP_SYNC_DIR: &str = "sync-dir";

/// Path of the staging file used while replacing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a whole file, reporting absence as `Ok(None)` rather than an error.
pub fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Atomically replace the file at `path` with `data`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let fail = |step: &'static str| {
        let path = path.to_path_buf();
        move |source: io::Error| PwStoreError::AtomicWrite { path, step, source }
    };

    // A failed open leaves whatever sits at `tmp` untouched: it is either
    // absent or something we refuse to follow.
    let file = open_temp(&tmp).map_err(fail("create"))?;

    if let Err(e) = write_and_sync(file, data) {
        remove_temp(&tmp);
        return Err(fail(e.0)(e.1));
    }

    if let Err(e) = fs::rename(&tmp, path) {
        remove_temp(&tmp);
        return Err(fail("rename")(e));
    }

    sync_parent(path).map_err(fail(STEP_SYNC_DIR))?;

    debug!(path = %path.display(), bytes = data.len(), "atomic write committed");
    Ok(())
}

fn open_temp(tmp: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600).custom_flags(libc::O_NOFOLLOW);
    }

    let file = options.open(tmp)?;

    // `mode` only applies on creation; a stale temp file keeps its old bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    Ok(file)
}

fn write_and_sync(mut file: File, data: &[u8]) -> std::result::Result<(), (&'static str, io::Error)> {
    file.write_all(data).map_err(|e| ("write", e))?;
    file.sync_all().map_err(|e| ("sync", e))?;
    Ok(())
}

fn remove_temp(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp) {
        warn!(path = %tmp.display(), error = %e, "failed to remove temp file");
    }
}

/// Flush the directory entry so the rename itself survives power loss.
#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pw.db");

        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pw.db");

        write_atomic(&path, b"a much longer first version").unwrap();
        write_atomic(&path, b"short").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn overwrites_stale_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("salt");
        fs::write(temp_path(&path), b"leftover from a crash").unwrap();

        write_atomic(&path, b"fresh").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"fresh");
        assert!(!temp_path(&path).exists());
    }

    #[cfg(unix)]
    #[test]
    fn created_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("master");
        write_atomic(&path, b"sealed").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn refuses_symlinked_temp_file() {
        let dir = TempDir::new().unwrap();
        let victim = dir.path().join("victim");
        fs::write(&victim, b"do not touch").unwrap();

        let path = dir.path().join("pw.db");
        std::os::unix::fs::symlink(&victim, temp_path(&path)).unwrap();

        let err = write_atomic(&path, b"payload").unwrap_err();
        assert!(matches!(err, PwStoreError::AtomicWrite { step: "create", .. }));
        assert_eq!(fs::read(&victim).unwrap(), b"do not touch");
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("pw.db");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inner"), b"x").unwrap();

        let err = write_atomic(&path, b"payload").unwrap_err();
        assert!(matches!(err, PwStoreError::AtomicWrite { step: "rename", .. }));
        assert!(!temp_path(&path).exists());
        assert!(path.is_dir());
    }

    #[test]
    fn read_optional_distinguishes_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing");
        assert!(read_optional(&path).unwrap().is_none());

        fs::write(&path, b"here").unwrap();
        assert_eq!(read_optional(&path).unwrap().unwrap(), b"here");
    }

    #[test]
    fn read_optional_reports_other_errors() {
        let dir = TempDir::new().unwrap();
        // Reading a directory is an error, not an absence.
        assert!(read_optional(dir.path()).is_err());
    }

    #[test]
    fn temp_path_is_sibling() {
        let path = Path::new("/home/user/.pwstore/pw.db");
        assert_eq!(temp_path(path), PathBuf::from("/home/user/.pwstore/pw.db.tmp"));
    }
}
