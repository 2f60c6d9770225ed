//! CLI module for sharebox
//!
//! Provides command-line interface for:
//! - init: Write a default config and create the storage directory
//! - serve: Boot subsystems and serve HTTP
//! - list: Print stored files
//! - encode / decode: Convert between stored names and share tokens

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, decode, encode, init, list, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
