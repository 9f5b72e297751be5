//! Process-exclusive store lock.
//!
//! A zero-length `lock` file in the store directory carries an advisory
//! `flock(LOCK_EX | LOCK_NB)`.  The lock lives exactly as long as the
//! returned [`StoreLock`]; closing the descriptor releases it.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use tracing::debug;

use crate::errors::{PwStoreError, Result};

/// Guard holding the exclusive lock on a store directory.
#[derive(Debug)]
pub struct StoreLock {
    // Dropping the file closes the descriptor, which releases the flock.
    _file: File,
}

impl StoreLock {
    /// Open (creating if needed) the lock file at `path` and take the lock.
    ///
    /// Never blocks: if another open file description holds the lock this
    /// returns [`PwStoreError::StoreBusy`] immediately.
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_err = |source| PwStoreError::LockIo {
            path: path.to_path_buf(),
            source,
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600).custom_flags(libc::O_NOFOLLOW);
        }
        let file = options.open(path).map_err(lock_err)?;

        match try_lock_exclusive(&file) {
            Ok(true) => {}
            Ok(false) => return Err(PwStoreError::StoreBusy(path.to_path_buf())),
            Err(e) => return Err(lock_err(e)),
        }

        debug!(path = %path.display(), "store lock acquired");
        Ok(Self { _file: file })
    }
}

#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and valid for this call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> io::Result<bool> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "store locking requires a Unix platform",
    ))
}
