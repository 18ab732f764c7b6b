//! MCP Streamable HTTP service creation
//!
//! This module provides the service that is nested into an Axum router when
//! the server runs over HTTP.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::cache::Cache;
use crate::client::PlankaApi;

use super::server::McpServer;

/// Create MCP Streamable HTTP service
///
/// Every session gets its own [`McpServer`], all of them sharing one gateway
/// and one cache.
///
/// # Example
/// ```no_run
/// use axum::Router;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// # use planka_mcp::cache::Cache;
/// # use planka_mcp::client::PlankaClient;
/// # use planka_mcp::config::Config;
/// # use planka_mcp::mcp::create_mcp_service;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let config = Config::from_env()?;
/// let client = Arc::new(PlankaClient::connect(&config).await?);
/// let service = create_mcp_service(client, Arc::new(Cache::new()), CancellationToken::new());
///
/// let app: Router = Router::new().nest_service("/mcp", service);
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<A: PlankaApi + 'static>(
    api: Arc<A>,
    cache: Arc<Cache>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer<A>, LocalSessionManager> {
    // rmcp expects the factory to fail with io::Error
    let service_factory = move || -> Result<McpServer<A>, std::io::Error> {
        Ok(McpServer::new(Arc::clone(&api), Arc::clone(&cache)))
    };

    let config = StreamableHttpServerConfig::default()
        .with_sse_keep_alive(None) // Use default (15s)
        .with_sse_retry(None) // Use default retry behavior
        .with_stateful_mode(true) // Enable session management
        .with_cancellation_token(cancellation_token);

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
