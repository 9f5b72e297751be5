//! One module per subcommand, each exposing `execute`.

pub mod completions;
pub mod copy;
pub mod edit;
pub mod generate;
pub mod get;
pub mod list;
pub mod put;
