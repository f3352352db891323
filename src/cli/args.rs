//! CLI argument definitions using clap
//!
//! Commands:
//! - recordd serve [--host] [--port] [--static-dir] [--cors-origin]... [--memory]
//! - recordd init-db
//!
//! `--database-url` falls back to the `DATABASE_URL` environment variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::http_server::HttpServerConfig;

/// Database used when neither `--database-url` nor `DATABASE_URL` is set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://records.db";

/// recordd - item and user records over HTTP
#[derive(Parser, Debug)]
#[command(name = "recordd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Create the record tables and exit
    InitDb(DatabaseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Directory holding the pre-built frontend
    #[arg(long, default_value = "./frontend")]
    pub static_dir: PathBuf,

    /// Allowed CORS origin (repeatable). Without any, every origin is allowed.
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,

    /// Keep records in process memory instead of the database
    #[arg(long)]
    pub memory: bool,
}

impl ServeArgs {
    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
