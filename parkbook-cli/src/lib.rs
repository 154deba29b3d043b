//! Command definitions of the `parkbook` binary, exposed so documentation
//! tooling can walk the clap tree.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
