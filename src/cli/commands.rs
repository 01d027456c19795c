//! CLI command implementations
//!
//! `serve` boots the HTTP server; `status` and `next-id` are one-shot
//! commands that print a single JSON object.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::config::Config;
use crate::http_server::status_routes::SERVICE_NAME;
use crate::http_server::HttpServer;
use crate::inventory::{self, InventoryService, HEADER};
use crate::observability::init_logging;
use crate::sheets::{InMemoryStore, SheetsClient, TabularStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Title of the spreadsheet backing `serve --in-memory`
pub const IN_MEMORY_TITLE: &str = "pecas (in-memory)";

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            in_memory,
        } => serve(&config, port, in_memory),
        Command::Status { config } => status(&config),
        Command::NextId { ids } => next_id(&ids),
    }
}

/// Start the HTTP server and block until shutdown.
///
/// 1. Resolve config (file, then environment, then `--port`)
/// 2. Install the log subscriber
/// 3. Connect the store (Google Sheets, or in-memory)
/// 4. Serve
pub fn serve(config_path: &Path, port: Option<u16>, in_memory: bool) -> CliResult<()> {
    let mut config = Config::resolve(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
        config.validate()?;
    }

    init_logging(config.log_format);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let store = build_store(&config, in_memory)?;
        let service = Arc::new(InventoryService::new(store, config.service_options()));
        let server = HttpServer::new(config.server.clone(), service);

        tracing::info!(
            addr = %server.socket_addr(),
            default_page = %config.default_page,
            in_memory,
            "starting parts API"
        );

        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Open the spreadsheet once and report its title
pub fn status(config_path: &Path) -> CliResult<()> {
    let config = Config::resolve(config_path)?;
    init_logging(config.log_format);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let title = rt.block_on(async {
        let store = build_store(&config, false)?;
        store.spreadsheet_title().await.map_err(CliError::from)
    })?;

    write_response(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "planilha": title,
    }))
}

/// Print the identifier the allocator would assign after `ids`
pub fn next_id(ids: &[String]) -> CliResult<()> {
    write_response(json!({ "id": inventory::next_id(ids) }))
}

/// Build the configured store
pub fn build_store(config: &Config, in_memory: bool) -> CliResult<Arc<dyn TabularStore>> {
    if in_memory {
        let store = InMemoryStore::new(IN_MEMORY_TITLE);
        store.add_worksheet(&config.default_page, &HEADER);
        return Ok(Arc::new(store));
    }

    let key = config.credentials()?;
    let client = SheetsClient::new(key, config.sheets_client_config()?)?;
    tracing::info!(client_email = %client.client_email(), "connected to Google Sheets");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_has_default_page() {
        let config = Config {
            default_page: "motor".to_string(),
            ..Config::default()
        };

        let store = build_store(&config, true).unwrap();
        assert_eq!(store.spreadsheet_title().await.unwrap(), IN_MEMORY_TITLE);
        let worksheet = store.worksheet("motor").await.unwrap();
        assert_eq!(store.col_values(&worksheet, 1).await.unwrap(), vec!["id"]);
    }

    #[test]
    fn test_sheets_store_requires_spreadsheet_id() {
        let config = Config {
            spreadsheet_id: None,
            credentials_path: Some("/nonexistent/key.json".into()),
            ..Config::default()
        };
        // Fails on credentials or on the missing id, never reaches the network
        assert!(build_store(&config, false).is_err());
    }

    #[test]
    fn test_next_id_command() {
        assert!(next_id(&["FRS-001".to_string()]).is_ok());
    }
}
