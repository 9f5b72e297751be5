//! Raw terminal mode for passphrase entry.
//!
//! [`RawModeGuard`] switches a terminal to non-canonical, no-echo input
//! and puts the saved `termios` back when dropped, including on error
//! and unwind paths.

use std::io;
use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;

use tracing::error;

/// Restores the saved terminal attributes on drop.
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Disable echo and line buffering on `fd`.
    ///
    /// Signals stay enabled so Ctrl-C still interrupts, and CR is mapped
    /// to NL on input.
    pub fn enter(fd: RawFd) -> io::Result<Self> {
        let mut saved = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fully initialises `saved` when it returns 0.
        if unsafe { libc::tcgetattr(fd, saved.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: checked above.
        let original = unsafe { saved.assume_init() };

        let mut raw = original;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON);
        raw.c_lflag |= libc::ISIG;
        raw.c_iflag |= libc::ICRNL;
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        // SAFETY: `raw` is a valid termios derived from the current state.
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { fd, original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // SAFETY: `original` came from tcgetattr on the same descriptor.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } != 0 {
            error!(
                error = %io::Error::last_os_error(),
                "failed to restore terminal mode; run `stty sane`"
            );
        }
    }
}
