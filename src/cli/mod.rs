//! CLI module for recordd
//!
//! Provides command-line interface for:
//! - serve: open the record store and run the HTTP server
//! - init-db: create the record tables and exit

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, DatabaseArgs, ServeArgs, DEFAULT_DATABASE_URL};
pub use commands::{init_db, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse process arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
