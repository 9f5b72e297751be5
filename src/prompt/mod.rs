//! Passphrase entry.
//!
//! The store never reads the terminal directly; it asks a
//! [`PassphraseSource`].  [`TerminalPrompt`] is the interactive source
//! (raw mode + decoy-masked display on stderr), [`StaticPassphrase`] feeds a
//! known value for scripts and tests.

pub mod masked;
#[cfg(unix)]
pub mod terminal;

pub use masked::{read_masked, PROMPT_LABEL, PROMPT_WIDTH};

use zeroize::Zeroizing;

use crate::errors::{PwStoreError, Result};

/// Something that can hand over the user's passphrase once per open.
pub trait PassphraseSource {
    /// Return the passphrase bytes.  Callers drop the buffer as soon as
    /// the wrapping key has been derived.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// Interactive prompt on the controlling terminal (stdin/stdout).
///
/// Raw mode is process-wide while the prompt is active; nothing else
/// should touch the terminal until `read_passphrase` returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl PassphraseSource for TerminalPrompt {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        use std::io::{self, IsTerminal};
        use std::os::unix::io::{AsFd, AsRawFd};

        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(PwStoreError::Prompt(
                "stdin is not a terminal — set PWSTORE_PASSPHRASE for non-interactive use".into(),
            ));
        }

        let _raw = terminal::RawModeGuard::enter(stdin.as_raw_fd())
            .map_err(|e| PwStoreError::Prompt(format!("cannot enter raw mode: {e}")))?;

        // stdout carries record text and may be redirected.
        let mut output = io::stderr().lock();
        read_masked_fd(stdin.as_fd(), &mut output)
    }
}

/// Run the masked prompt over a duplicate of `fd`.
///
/// `Stdin` reads ahead into a process-wide buffer that is never wiped, so
/// the passphrase is read unbuffered, one byte per syscall, and only ever
/// lands in the returned buffer.
#[cfg(unix)]
fn read_masked_fd<W: std::io::Write + ?Sized>(
    fd: std::os::unix::io::BorrowedFd<'_>,
    output: &mut W,
) -> Result<Zeroizing<Vec<u8>>> {
    let owned = fd
        .try_clone_to_owned()
        .map_err(|e| PwStoreError::Prompt(format!("cannot duplicate stdin: {e}")))?;
    let mut input = std::fs::File::from(owned);
    read_masked(&mut input, output, &mut rand::rng())
}

#[cfg(not(unix))]
impl PassphraseSource for TerminalPrompt {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Err(PwStoreError::Prompt(
            "terminal passphrase entry requires a Unix terminal".into(),
        ))
    }
}

/// A passphrase supplied up front (environment variable, tests).
pub struct StaticPassphrase {
    passphrase: Zeroizing<Vec<u8>>,
}

impl StaticPassphrase {
    pub fn new(passphrase: impl AsRef<[u8]>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.as_ref().to_vec()),
        }
    }
}

impl PassphraseSource for StaticPassphrase {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.passphrase.clone())
    }
}
