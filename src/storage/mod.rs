//! Filesystem plumbing for the store directory.
//!
//! - Crash-safe file replacement (`atomic`)
//! - The process-exclusive `flock` guard (`lock`)

pub mod atomic;
pub mod lock;

pub use atomic::{read_optional, write_atomic, STEP_SYNC_DIR};
pub use lock::StoreLock;

use std::fs;
use std::io;
use std::path::Path;

/// Create `dir` (and parents) if missing and make it owner-only.
pub fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;

        // An existing directory may predate us with looser bits.
        let perms = fs::metadata(dir)?.permissions();
        if perms.mode() & 0o077 != 0 {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}
