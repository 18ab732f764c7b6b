//! Model Context Protocol (MCP) server implementation
//!
//! The server speaks MCP over stdio or the Streamable HTTP transport and
//! exposes the `planka_*` tools.
//!
//! - **server**: tool registration and routing
//! - **service**: Streamable HTTP service for Axum
//! - **tools**: one struct per entity family, generic over `A: PlankaApi`
//!   - WorkspaceTools: workspace structure
//!   - CardTools: card listing, detail and writes
//!   - SearchTools: find-then-get card search
//!   - TaskTools: checklist items
//!   - LabelTools: card labels

pub mod server;
mod service;
pub mod tools;


pub use server::McpServer;
pub use service::create_mcp_service;
