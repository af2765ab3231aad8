//! CLI command implementations
//!
//! Each command loads the config, opens an [`HttpStore`], does one thing,
//! closes the store and prints JSON lines to stdout. The `execute_*`
//! functions hold the logic and work with any [`DocumentStore`].

use std::path::Path;

use crate::bulk::{BulkWriteCoordinator, CoordinatorOptions, WriteMode, WriteOutcome};
use crate::config::ClientConfig;
use crate::document::{DocId, Document};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::store::{DatabaseInfo, DocumentStore, HttpStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_batch, write_line};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.quiet {
        Logger::set_min_severity(Severity::Warn);
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;
    rt.block_on(run_command(cli.command))
}

/// Run the appropriate command based on CLI args
pub async fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Submit {
            config,
            all_or_nothing,
            file,
        } => submit(&config, file.as_deref(), all_or_nothing.into()).await,
        Command::Read {
            config,
            id,
            conflicts,
        } => read(&config, &id, conflicts).await,
        Command::Info { config } => info(&config).await,
    }
}

/// `couchbatch submit`
pub async fn submit(config_path: &Path, file: Option<&Path>, mode: WriteMode) -> CliResult<()> {
    let config = load_config(config_path)?;
    let batch = read_batch(file)?;
    let store = HttpStore::new(&config)?;

    let outcomes =
        execute_submit(store, CoordinatorOptions::from_config(&config), &batch, mode).await?;
    for outcome in &outcomes {
        write_line(outcome)?;
    }
    Ok(())
}

/// `couchbatch read`
pub async fn read(config_path: &Path, id: &str, conflicts: bool) -> CliResult<()> {
    let config = load_config(config_path)?;
    let id = DocId::parse(id)?;
    let store = HttpStore::new(&config)?;

    match execute_read(store, &id, conflicts).await? {
        Some(doc) => write_line(&doc),
        None => Err(CliError::store_error(format!("Document not found: {}", id))),
    }
}

/// `couchbatch info`
pub async fn info(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = HttpStore::new(&config)?;
    let info = execute_info(store).await?;
    write_line(&info)
}

/// Submit one batch through a freshly opened store, then close it
pub async fn execute_submit<S: DocumentStore>(
    store: S,
    options: CoordinatorOptions,
    batch: &[Document],
    mode: WriteMode,
) -> CliResult<Vec<WriteOutcome>> {
    let coordinator = BulkWriteCoordinator::open(store, options).await?;
    let result = coordinator.submit(batch, mode).await;
    coordinator.close().await?;
    Ok(result?)
}

/// Read one document through a freshly opened store, then close it
pub async fn execute_read<S: DocumentStore>(
    store: S,
    id: &DocId,
    conflicts: bool,
) -> CliResult<Option<Document>> {
    store.open().await?;
    let result = store.read_document(id, conflicts).await;
    store.close().await?;
    Ok(result?)
}

/// Fetch database metadata through a freshly opened store, then close it
pub async fn execute_info<S: DocumentStore>(store: S) -> CliResult<DatabaseInfo> {
    store.open().await?;
    let result = store.info().await;
    store.close().await?;
    Ok(result?)
}

fn load_config(path: &Path) -> CliResult<ClientConfig> {
    let config = ClientConfig::load(path)?;
    let url = redact(&config.url);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("database", config.database.as_str()), ("url", url.as_str())],
    );
    Ok(config)
}

/// URL with any embedded password replaced
fn redact(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
