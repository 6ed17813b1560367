mod init;
mod server;

use chassis_core::{ConfigurationManager, DocumentExporter};
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use crate::server::ChassisServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Handle `chassis-mcp init [--force]` subcommand
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("init") {
        return init::run(args.iter().any(|a| a == "--force"));
    }

    let settings = chassis_core::read_settings()?;
    let catalog = settings.load_catalog()?;
    tracing::info!(
        servers = catalog.servers.len(),
        export_dir = %settings.export_dir().display(),
        "starting chassis MCP server"
    );

    let exporter = DocumentExporter::new(settings.export_dir(), settings.export_format);
    let service = ChassisServer::new(ConfigurationManager::new(catalog), exporter)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "MCP server error"))?;
    service.waiting().await?;
    Ok(())
}
