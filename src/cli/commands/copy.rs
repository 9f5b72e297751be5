//! `pwstore copy` — put a record's password (or username) on the clipboard.
//!
//! Uses the OSC 52 terminal escape, so it works over SSH and inside tmux
//! without any clipboard daemon.  Nothing is printed besides the escape.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::Zeroizing;

use crate::cli::{open_store, Cli};
use crate::errors::{PwStoreError, Result};

/// Execute the `copy` command.
pub fn execute(cli: &Cli, name: &str, username: bool) -> Result<()> {
    let store = open_store(cli)?;
    let record = store.get(name)?;

    let value = if username {
        &record.username
    } else {
        &record.password
    };
    if value.is_empty() {
        let field = if username { "username" } else { "password" };
        return Err(PwStoreError::CommandFailed(format!(
            "record '{name}' has an empty {field}"
        )));
    }

    let sequence = osc52(value);
    let mut stdout = io::stdout().lock();
    stdout.write_all(sequence.as_bytes())?;
    stdout.flush()?;

    tracing::debug!(name, username, "copied field via OSC 52");
    Ok(())
}

/// Build the OSC 52 "set clipboard" sequence for `text`.
fn osc52(text: &str) -> Zeroizing<String> {
    let encoded = Zeroizing::new(BASE64.encode(text.as_bytes()));
    Zeroizing::new(format!("\x1b]52;c;{}\x07", encoded.as_str()))
}
