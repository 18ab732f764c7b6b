//! MCP tools for card tasks (checklist items).

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{Cache, CacheKey};
use crate::client::{ApiError, PlankaApi};
use crate::mcp::tools::validation::{
    ID_MAX, NAME_MAX, TASK_LIST_NAME_MAX, optional_filter, required,
};
use crate::mcp::tools::{
    DEFAULT_POSITION, Handles, api_error_result, item_str, try_api, write_result,
};
use crate::shaper::CardPayload;

pub const DEFAULT_TASK_LIST: &str = "Tasks";

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddTaskParams {
    #[schemars(description = "Card ID to add the task to", length(min = 1, max = 100))]
    pub card_id: String,
    #[schemars(description = "Task text (1-500 characters)", length(min = 1, max = 500))]
    pub task_name: String,
    #[schemars(
        description = "Task list (checklist) name. Reused when it exists (case-insensitive), created otherwise. Default: 'Tasks'",
        length(max = 100)
    )]
    pub task_list_name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskParams {
    #[schemars(description = "Task ID", length(min = 1, max = 100))]
    pub task_id: String,
    #[schemars(description = "true to mark complete, false to mark incomplete")]
    pub is_completed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteTaskParams {
    #[schemars(description = "Task ID to delete", length(min = 1, max = 100))]
    pub task_id: String,
}

// =============================================================================
// Task Tools
// =============================================================================

pub struct TaskTools<A> {
    handles: Handles<A>,
}

impl<A> Clone for TaskTools<A> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
        }
    }
}

/// Drop every cached card whose task lists contain `task_id`.
fn invalidate_task_owner(cache: &Cache, task_id: &str) -> usize {
    cache.invalidate_cards_where(|card| CardPayload::from_value(card).record.has_task(task_id))
}

impl<A: PlankaApi> TaskTools<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            handles: Handles { api, cache },
        }
    }

    pub async fn add_task(
        &self,
        Parameters(params): Parameters<AddTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;
        let task_name = required("task_name", &params.task_name, NAME_MAX)?;
        let list_name = optional_filter(
            "task_list_name",
            params.task_list_name.as_deref(),
            TASK_LIST_NAME_MAX,
        )?
        .unwrap_or_else(|| DEFAULT_TASK_LIST.to_string());

        let Handles { api, cache } = &self.handles;

        // Read through to the API: the cached copy may miss a just-created list.
        let current = try_api!("add_task", api.get(&format!("cards/{card_id}")).await);
        let card = CardPayload::from_value(&current);
        let wanted = list_name.to_lowercase();
        let existing = card.record.task_lists.iter().find(|list| {
            list.list
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase() == wanted)
        });

        let (task_list_id, task_list_name) = match existing {
            Some(list) => (
                list.list.id.clone(),
                list.list.name.clone().unwrap_or(list_name),
            ),
            None => {
                let created = try_api!(
                    "add_task",
                    api.post(
                        &format!("cards/{card_id}/task-lists"),
                        json!({"name": list_name, "position": DEFAULT_POSITION}),
                    )
                    .await
                );
                let Some(id) = item_str(&created, "id") else {
                    return Ok(api_error_result(
                        "add_task",
                        ApiError::InvalidResponse {
                            message: "created task list has no id".to_string(),
                        },
                    ));
                };
                debug!(card_id = %card_id, task_list_id = id, "created task list");
                (id.to_string(), list_name)
            }
        };

        let response = try_api!(
            "add_task",
            api.post(
                &format!("task-lists/{task_list_id}/tasks"),
                json!({"name": task_name, "position": DEFAULT_POSITION}),
            )
            .await
        );
        cache.invalidate(CacheKey::EntityDetail(&card_id));

        Ok(write_result(format!(
            "✓ Added task: **{}** to list '{task_list_name}' (Task ID: `{}`)",
            item_str(&response, "name").unwrap_or(&task_name),
            item_str(&response, "id").unwrap_or("N/A"),
        )))
    }

    pub async fn update_task(
        &self,
        Parameters(params): Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = required("task_id", &params.task_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        let response = try_api!(
            "update_task",
            api.patch(
                &format!("tasks/{task_id}"),
                json!({"isCompleted": params.is_completed}),
            )
            .await
        );
        let invalidated = invalidate_task_owner(cache, &task_id);
        debug!(task_id = %task_id, invalidated, "task updated");

        let (status, check) = if params.is_completed {
            ("complete", "[x]")
        } else {
            ("incomplete", "[ ]")
        };
        Ok(write_result(format!(
            "✓ Marked task as {status}: {check} **{}** (ID: `{}`)",
            item_str(&response, "name").unwrap_or("Unnamed task"),
            item_str(&response, "id").unwrap_or(&task_id),
        )))
    }

    pub async fn delete_task(
        &self,
        Parameters(params): Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = required("task_id", &params.task_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        let response = try_api!("delete_task", api.delete(&format!("tasks/{task_id}")).await);
        let invalidated = invalidate_task_owner(cache, &task_id);
        debug!(task_id = %task_id, invalidated, "task deleted");

        Ok(write_result(format!(
            "✓ Deleted task: **{}** (ID: `{task_id}`)",
            item_str(&response, "name").unwrap_or(&task_id),
        )))
    }
}
