//! MCP tools for attaching and detaching card labels.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::cache::{Cache, CacheKey};
use crate::client::PlankaApi;
use crate::mcp::tools::validation::{ID_MAX, required};
use crate::mcp::tools::{Handles, cached_workspace, try_api, write_result};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CardLabelParams {
    #[schemars(description = "Card ID", length(min = 1, max = 100))]
    pub card_id: String,
    #[schemars(
        description = "Label ID (see planka_get_workspace for the board's labels)",
        length(min = 1, max = 100)
    )]
    pub label_id: String,
}

pub struct LabelTools<A> {
    handles: Handles<A>,
}

impl<A> Clone for LabelTools<A> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
        }
    }
}

impl<A: PlankaApi> LabelTools<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            handles: Handles { api, cache },
        }
    }

    /// Label name for the confirmation line, falling back to the id.
    async fn label_name(&self, label_id: &str) -> String {
        let Handles { api, cache } = &self.handles;
        let workspace = match cache.peek_workspace() {
            Some(workspace) => workspace,
            None => match cached_workspace(api.as_ref(), cache).await {
                Ok(workspace) => workspace,
                Err(e) => {
                    warn!(label_id, error = %e, "workspace unavailable for label lookup");
                    return label_id.to_string();
                }
            },
        };
        workspace
            .label_name(label_id)
            .map_or_else(|| label_id.to_string(), str::to_string)
    }

    pub async fn add_card_label(
        &self,
        Parameters(params): Parameters<CardLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;
        let label_id = required("label_id", &params.label_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        try_api!(
            "add_card_label",
            api.post(
                &format!("cards/{card_id}/labels"),
                json!({"labelId": label_id}),
            )
            .await
        );
        cache.invalidate(CacheKey::EntityDetail(&card_id));

        let name = self.label_name(&label_id).await;
        Ok(write_result(format!(
            "✓ Added label **{name}** to card (Label ID: `{label_id}`)"
        )))
    }

    pub async fn remove_card_label(
        &self,
        Parameters(params): Parameters<CardLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;
        let label_id = required("label_id", &params.label_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        try_api!(
            "remove_card_label",
            api.delete(&format!("cards/{card_id}/labels/{label_id}")).await
        );
        cache.invalidate(CacheKey::EntityDetail(&card_id));

        let name = self.label_name(&label_id).await;
        Ok(write_result(format!(
            "✓ Removed label **{name}** from card (Label ID: `{label_id}`)"
        )))
    }
}
