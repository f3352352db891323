//! CLI command implementations
//!
//! Boot order for `serve`: resolve config, open the store (creating
//! tables), bind the listener.

use std::sync::Arc;

use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::record::{MemoryRecordStore, RecordStore, SqliteRecordStore};

use super::args::{Command, DatabaseArgs, ServeArgs};
use super::errors::{CliError, CliResult};

/// Run a parsed command on a fresh Tokio runtime
pub fn run_command(command: Command) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("failed to start runtime: {}", e)))?;

    runtime.block_on(async move {
        match command {
            Command::Serve(args) => serve(args).await,
            Command::InitDb(args) => init_db(args).await,
        }
    })
}

/// Open the store and serve HTTP until interrupted
pub async fn serve(args: ServeArgs) -> CliResult<()> {
    log_event(Event::BootStart);

    let config = args.http_config();
    let port = config.port.to_string();
    let static_dir = config.static_dir.display().to_string();
    let backend = if args.memory { "memory" } else { "sqlite" };
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("host", config.host.as_str()),
            ("port", port.as_str()),
            ("static_dir", static_dir.as_str()),
            ("store", backend),
        ],
    );

    let store: Arc<dyn RecordStore> = if args.memory {
        Arc::new(MemoryRecordStore::new())
    } else {
        Arc::new(open_store(&args.database).await?)
    };

    HttpServer::new(config, store).start().await?;
    Ok(())
}

/// Create the tables and exit
pub async fn init_db(args: DatabaseArgs) -> CliResult<()> {
    let store = open_store(&args).await?;
    store.close().await;
    Ok(())
}

async fn open_store(args: &DatabaseArgs) -> CliResult<SqliteRecordStore> {
    let store = SqliteRecordStore::connect(&args.database_url).await?;
    log_event_with_fields(
        Event::StoreOpened,
        &[("database_url", args.database_url.as_str())],
    );
    Ok(store)
}
