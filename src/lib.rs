pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod prompt;
pub mod storage;
pub mod vault;
