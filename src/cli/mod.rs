//! CLI module for couchbatch
//!
//! Provides command-line interface for:
//! - submit: write one batch, print one outcome per line
//! - read: print the current revision of a document
//! - info: print database metadata

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    execute_info, execute_read, execute_submit, info, read, run, run_command, submit,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_batch, read_batch, write_line, write_line_to};
