//! `pwstore get` — print a record in its editable text form.

use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let store = open_store(cli)?;

    // Decrypt and print the record text to stdout.
    let record = store.get(name)?;
    print!("{}", record.to_text()?.as_str());

    Ok(())
}
