mod forests;
mod init;
mod requests;
mod server;

use forests::Forests;
use rdt_config_core::Storage;
use rmcp::ServiceExt;
use server::ConfigServer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries the MCP stream.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle `rdt-config-mcp init` subcommand
    if std::env::args().nth(1).as_deref() == Some("init") {
        return init::init_project();
    }

    let storage = Storage::from_env();
    let settings = storage.read_settings();
    init_tracing(&settings.log_level);
    info!(
        dir = %storage.dir().display(),
        default_forest = %settings.default_forest,
        "starting configuration MCP server"
    );

    let service = ConfigServer::new(Forests::new(storage, settings))
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
