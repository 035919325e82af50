//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use crate::api::ApiServer;
use crate::config::ServerConfig;
use crate::fixtures;
use crate::schema::describe;

use super::args::{Cli, Command};
use super::errors::CliError;

/// Parse arguments and dispatch.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse_args();
    match cli.command {
        Command::Serve { config } => serve(&config),
        Command::Schema => schema(),
    }
}

fn serve(config_path: &Path) -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    // A missing config file falls back to defaults; a present but broken
    // one is an error.
    let config = if config_path.exists() {
        ServerConfig::from_file(config_path)?
    } else {
        tracing::info!(path = %config_path.display(), "no config file, using defaults");
        ServerConfig::default()
    };

    let registry = Arc::new(fixtures::sample_registry());
    let store = Arc::new(fixtures::sample_store());
    let server = ApiServer::new(config, registry, store);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(server.start())?;
    Ok(())
}

fn schema() -> Result<(), CliError> {
    let registry = fixtures::sample_registry();
    let doc = describe(&registry);
    println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
    Ok(())
}
