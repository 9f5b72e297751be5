//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::Result;
use crate::prompt::{PassphraseSource, StaticPassphrase, TerminalPrompt};
use crate::vault::SecretStore;

/// Environment variable holding a passphrase for non-interactive use.
pub const PASSPHRASE_ENV: &str = "PWSTORE_PASSPHRASE";

/// pwstore CLI: local encrypted password store.
#[derive(Parser)]
#[command(name = "pwstore", about = "Local encrypted password store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store directory (default: ~/.pwstore)
    #[arg(long, env = "PWSTORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List all record names
    List,

    /// Print a record in its editable text form
    Get {
        /// Record name
        #[arg(short, long)]
        name: String,
    },

    /// Store a record read from a TOML file
    Put {
        /// Record name
        #[arg(short, long)]
        name: String,

        /// File holding the record text ("-" for stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Overwrite an existing record without asking
        #[arg(long)]
        force: bool,
    },

    /// Edit a record in $EDITOR (creates it if missing)
    Edit {
        /// Record name
        #[arg(short, long)]
        name: String,
    },

    /// Copy a password to the clipboard via the terminal (OSC 52)
    Copy {
        /// Record name
        #[arg(short, long)]
        name: String,

        /// Copy the username instead of the password
        #[arg(short, long)]
        username: bool,
    },

    /// Generate a random password
    Gen {
        /// Number of characters (default from pwstore.toml, else 20)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the store directory from the CLI arguments.
pub fn store_dir(cli: &Cli) -> Result<PathBuf> {
    Settings::store_dir(cli.store_dir.as_deref())
}

/// Pick the passphrase source, trying in order:
/// 1. `PWSTORE_PASSPHRASE` env var (scripts/CI)
/// 2. Interactive masked prompt
pub fn passphrase_source() -> Box<dyn PassphraseSource> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        let pw = Zeroizing::new(pw);
        if !pw.is_empty() {
            return Box::new(StaticPassphrase::new(pw.as_bytes()));
        }
    }
    Box::new(TerminalPrompt::new())
}

/// Open the store selected by the CLI arguments.
pub fn open_store(cli: &Cli) -> Result<SecretStore> {
    let dir = store_dir(cli)?;
    let mut source = passphrase_source();
    SecretStore::open(&dir, source.as_mut())
}

/// Load settings for the store selected by the CLI arguments.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(&store_dir(cli)?)
}
