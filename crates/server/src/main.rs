//! sieve-assets server entry point.
//!
//! Loads configuration, runs the upgrade sweep once and serves the asset
//! tools over MCP stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sieve_client::{FetchClient, FetchConfig};
use sieve_core::assets::SyncOutcome;
use sieve_core::{AppConfig, Assets};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let fetch = FetchClient::new(FetchConfig::from_app_config(&config)?)?;
    let assets = Arc::new(Assets::from_config(&config, Arc::new(fetch))?);

    tracing::info!(
        version = assets.package_version(),
        db_path = %config.db_path.display(),
        remote_root = %config.remote_root,
        "Starting sieve-assets server on stdio transport"
    );

    match assets.synchronize().await {
        SyncOutcome::UpToDate => tracing::debug!("asset cache matches the running version"),
        SyncOutcome::Skipped => tracing::warn!("version check skipped; cache left as is"),
        SyncOutcome::Swept(report) => tracing::info!(
            previous = %report.previous_version,
            removed = report.removed,
            kept = report.kept,
            completed = report.completed,
            "asset cache swept after upgrade"
        ),
    }

    let handler = handler::SieveServer::new(assets);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
