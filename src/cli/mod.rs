//! CLI module for the todo API
//!
//! Provides command-line interface for:
//! - serve: Open the store and serve HTTP
//! - init: Create an empty collection file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, ServeArgs};
pub use commands::{init, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
