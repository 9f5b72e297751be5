//! Vault module — encrypted record storage.
//!
//! This module provides:
//! - The `Record` payload type and its text form (`record`)
//! - The `pw.db` record set file format (`format`)
//! - `SecretStore` for opening a store and getting/putting records (`store`)

pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use format::{Envelope, RecordSet};
pub use record::Record;
pub use store::{validate_name, SecretStore, LOCK_FILE, RECORDS_FILE};
