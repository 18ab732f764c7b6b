//! Planka MCP server binary.
//!
//! Reads the connection settings, authenticates once against Planka and
//! serves the MCP tools over stdio (default) or Streamable HTTP.

use std::net::IpAddr;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use miette::Diagnostic;
use planka_mcp::cache::Cache;
use planka_mcp::client::{ApiError, PlankaClient};
use planka_mcp::config::{Config, ConfigError};
use planka_mcp::mcp::{McpServer, create_mcp_service};
use rmcp::ServiceExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to bind HTTP listener: {0}")]
    #[diagnostic(code(planka_mcp::binary::io))]
    Io(#[from] std::io::Error),

    #[error("MCP transport error: {0}")]
    #[diagnostic(code(planka_mcp::binary::transport))]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// Streamable HTTP at /mcp
    Http,
}

#[derive(Parser)]
#[command(name = "planka-mcp")]
#[command(author, version, about = "MCP server for Planka kanban boards", long_about = None)]
struct Cli {
    /// Planka server URL (overrides PLANKA_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Transport to serve MCP over
    #[arg(long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// Host address to bind to (http transport)
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on (http transport)
    #[arg(short, long, default_value = "3737")]
    port: u16,
}

/// Logs go to stderr: stdout carries the protocol on the stdio transport.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planka_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn log_cache_stats(cache: &Cache) {
    let stats = cache.stats();
    info!(
        workspace_hits = stats.workspace.hits,
        workspace_misses = stats.workspace.misses,
        board_hits = stats.board_overview.hits,
        board_misses = stats.board_overview.misses,
        card_hits = stats.entity_detail.hits,
        card_misses = stats.entity_detail.misses,
        card_entries = stats.entity_detail.entries,
        "cache statistics at shutdown"
    );
}

async fn serve_stdio(client: Arc<PlankaClient>, cache: Arc<Cache>) -> Result<(), BinaryError> {
    let running = McpServer::new(client, cache)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| BinaryError::Transport(e.to_string()))?;
    info!("MCP server ready on stdio");

    running
        .waiting()
        .await
        .map_err(|e| BinaryError::Transport(e.to_string()))?;
    Ok(())
}

async fn serve_http(
    client: Arc<PlankaClient>,
    cache: Arc<Cache>,
    host: IpAddr,
    port: u16,
) -> Result<(), BinaryError> {
    let ct = CancellationToken::new();
    let service = create_mcp_service(client, cache, ct.child_token());
    let app = axum::Router::new().nest_service("/mcp", service);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
            ct.cancel();
        })
        .await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), BinaryError> {
    init_tracing();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::from_env_with_base_url(cli.base_url)?;
    info!(
        base_url = %config.base_url,
        credentials = config.credentials.kind(),
        transport = ?cli.transport,
        "starting Planka MCP server"
    );

    let client = Arc::new(PlankaClient::connect(&config).await?);
    let cache = Arc::new(Cache::new());

    let result = match cli.transport {
        Transport::Stdio => serve_stdio(client, Arc::clone(&cache)).await,
        Transport::Http => serve_http(client, Arc::clone(&cache), cli.host, cli.port).await,
    };
    log_cache_stats(&cache);
    result
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    run(Cli::parse()).await?;
    Ok(())
}
