use anyhow::Result;
use moon_banking_mcp::{
    adapters::{cli::Cli, server::BankingServer},
    app::{dispatcher::Dispatcher, registry::ToolRegistry},
    infra::{config::AppConfig, http::HttpUpstream, metrics},
};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // IMPORTANT: write logs to stderr; stdout must remain clear for MCP JSON-RPC
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let (cli, ignored) = Cli::parse_lenient(std::env::args_os()).unwrap_or_else(|err| err.exit());
    for arg in &ignored {
        tracing::warn!(%arg, "ignoring unrecognized argument");
    }
    let config = AppConfig::load()?;
    let upstream_config = config.upstream()?;

    if let Some(metrics_cfg) = config.metrics_server_config()? {
        if metrics_cfg.auth_token.is_none() {
            tracing::warn!(
                addr = %metrics_cfg.addr,
                "metrics auth token missing; set METRICS_AUTH_TOKEN for production"
            );
        }
        metrics::spawn_metrics_server(metrics_cfg).await;
    }

    let selection = cli.selection();
    for name in ToolRegistry::unmatched(&selection) {
        tracing::warn!(tool = name, "--tool filter matches no known tool");
    }
    let registry = ToolRegistry::new(&selection);
    if registry.is_empty() {
        tracing::warn!("tool filter excludes every tool; the catalog is empty");
    }

    let upstream = HttpUpstream::new(upstream_config)?;
    tracing::info!(
        base_url = %upstream.base_url(),
        tools = registry.len(),
        "Moon Banking API MCP server running on stdio"
    );

    let handler = BankingServer::new(Dispatcher::new(registry, Arc::new(upstream)));
    let server = handler.serve(stdio()).await?;
    server.waiting().await?;
    Ok(())
}
