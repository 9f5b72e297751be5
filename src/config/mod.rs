//! User configuration (`pwstore.toml`) and store-directory resolution.

pub mod settings;

pub use settings::{Charset, Settings};
