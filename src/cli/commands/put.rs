//! `pwstore put` — store a record read from a TOML file or stdin.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Confirm;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::{PwStoreError, Result};
use crate::vault::{validate_name, Record};

/// Execute the `put` command.
pub fn execute(cli: &Cli, name: &str, file: &Path, force: bool) -> Result<()> {
    // Parse before prompting for the passphrase so typos fail fast.
    validate_name(name)?;
    let text = read_input(file)?;
    let record = Record::from_text(&text)?;
    record.validate()?;

    let mut store = open_store(cli)?;

    if store.contains(name) && !force {
        if !io::stdin().is_terminal() {
            return Err(PwStoreError::CommandFailed(format!(
                "record '{name}' already exists — pass --force to overwrite"
            )));
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Overwrite record '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| PwStoreError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    store.put(name, &record)?;
    output::success("ok");

    Ok(())
}

/// Read the record text from `file`, or stdin when `file` is `-`.
fn read_input(file: &Path) -> Result<Zeroizing<String>> {
    let mut text = Zeroizing::new(String::new());
    if file == Path::new("-") {
        io::stdin().read_to_string(&mut *text)?;
    } else {
        *text = fs::read_to_string(file).map_err(|e| {
            PwStoreError::CommandFailed(format!("failed to read {}: {e}", file.display()))
        })?;
    }
    Ok(text)
}
