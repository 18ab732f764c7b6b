//! MCP tool implementations
//!
//! Tool handlers are organized by entity type. Each struct is generic over
//! the [`PlankaApi`] gateway and shares the process-wide [`Cache`].

mod cards;
mod labels;
mod search;
mod tasks;
pub mod validation;
mod workspace;

#[cfg(test)]
mod cards_test;
#[cfg(test)]
mod tasks_test;

pub use cards::{
    CardTools, CreateCardParams, DeleteCardParams, GetCardParams, ListCardsParams,
    UpdateCardParams,
};
pub use labels::{CardLabelParams, LabelTools};
pub use search::{FindAndGetCardParams, SearchTools};
pub use tasks::{AddTaskParams, DeleteTaskParams, TaskTools, UpdateTaskParams};
pub use workspace::{GetWorkspaceParams, WorkspaceTools};

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;
use tracing::warn;

use crate::cache::Cache;
use crate::client::{ApiError, ApiResult, PlankaApi};
use crate::shaper::{RESPONSE_CHAR_LIMIT, enforce_budget};
use crate::workspace::{Workspace, fetch_workspace};

/// Default position Planka uses for "end of list".
pub const DEFAULT_POSITION: f64 = 65535.0;

/// Successful read: budget-enforced text.
pub(crate) fn read_result(text: &str) -> CallToolResult {
    CallToolResult::success(vec![Content::text(enforce_budget(text, RESPONSE_CHAR_LIMIT))])
}

/// Successful write: a one-line confirmation.
pub(crate) fn write_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Gateway failure converted to an actionable tool error.
pub(crate) fn api_error_result(operation: &'static str, err: ApiError) -> CallToolResult {
    warn!(operation, error = %err, "Planka request failed");
    CallToolResult::error(vec![Content::text(err.user_message())])
}

pub(crate) fn error_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// Unwrap an [`ApiResult`] or return early from a tool with the converted error.
macro_rules! try_api {
    ($operation:literal, $result:expr) => {
        match $result {
            Ok(value) => value,
            Err(err) => return Ok($crate::mcp::tools::api_error_result($operation, err)),
        }
    };
}
pub(crate) use try_api;

pub(crate) async fn cached_workspace<A: PlankaApi>(
    api: &A,
    cache: &Cache,
) -> ApiResult<Arc<Workspace>> {
    cache.workspace(|| fetch_workspace(api)).await
}

pub(crate) async fn cached_board<A: PlankaApi>(
    api: &A,
    cache: &Cache,
    board_id: &str,
) -> ApiResult<Arc<Value>> {
    cache
        .board_overview(board_id, || async move {
            api.get(&format!("boards/{board_id}")).await
        })
        .await
}

pub(crate) async fn cached_card<A: PlankaApi>(
    api: &A,
    cache: &Cache,
    card_id: &str,
) -> ApiResult<Arc<Value>> {
    cache
        .card(card_id, || async move { api.get(&format!("cards/{card_id}")).await })
        .await
}

/// `item.<field>` of a write response, when it is a non-empty string.
pub(crate) fn item_str<'a>(response: &'a Value, field: &str) -> Option<&'a str> {
    response["item"][field].as_str().filter(|s| !s.is_empty())
}

/// Handles shared by every tool struct.
pub(crate) struct Handles<A> {
    pub api: Arc<A>,
    pub cache: Arc<Cache>,
}

impl<A> Clone for Handles<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
        }
    }
}
