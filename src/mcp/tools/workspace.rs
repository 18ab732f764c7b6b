//! MCP tools for workspace structure.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::Cache;
use crate::client::PlankaApi;
use crate::mcp::tools::{Handles, cached_workspace, read_result, try_api};
use crate::shaper::markdown::render_workspace;
use crate::shaper::{ResponseFormat, to_json_text};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetWorkspaceParams {
    #[serde(default)]
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub response_format: ResponseFormat,
}

pub struct WorkspaceTools<A> {
    handles: Handles<A>,
}

impl<A> Clone for WorkspaceTools<A> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
        }
    }
}

impl<A: PlankaApi> WorkspaceTools<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            handles: Handles { api, cache },
        }
    }

    /// Projects, boards, lists, labels and users in one cached payload.
    pub async fn get_workspace(
        &self,
        params: Parameters<GetWorkspaceParams>,
    ) -> Result<CallToolResult, McpError> {
        let Handles { api, cache } = &self.handles;
        let workspace = try_api!("get_workspace", cached_workspace(api.as_ref(), cache).await);

        let text = match params.0.response_format {
            ResponseFormat::Markdown => render_workspace(&workspace),
            ResponseFormat::Json => to_json_text(workspace.as_ref()),
        };
        Ok(read_result(&text))
    }
}
