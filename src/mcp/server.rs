//! MCP server implementation
//!
//! The server owns one instance of each tool struct and routes the twelve
//! `planka_*` tools to them. All tool structs share the process-wide cache.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::cache::Cache;
use crate::client::PlankaApi;

use super::tools::{
    AddTaskParams, CardLabelParams, CardTools, CreateCardParams, DeleteCardParams,
    DeleteTaskParams, FindAndGetCardParams, GetCardParams, GetWorkspaceParams, LabelTools,
    ListCardsParams, SearchTools, TaskTools, UpdateCardParams, UpdateTaskParams, WorkspaceTools,
};

const INSTRUCTIONS: &str = "Planka MCP Server - Browse and edit Planka kanban boards. \
Start with planka_get_workspace to learn project, board, list and label IDs in one call. \
Use planka_list_cards with detail_level='preview' for overviews and planka_find_and_get_card \
to jump to a card by name.";

/// Main MCP server coordinator
///
/// Generic over `A: PlankaApi` so tests can drive it with a mocked gateway.
pub struct McpServer<A: PlankaApi> {
    workspace_tools: WorkspaceTools<A>,
    card_tools: CardTools<A>,
    search_tools: SearchTools<A>,
    task_tools: TaskTools<A>,
    label_tools: LabelTools<A>,
    cache: Arc<Cache>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl<A: PlankaApi + 'static> McpServer<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            workspace_tools: WorkspaceTools::new(Arc::clone(&api), Arc::clone(&cache)),
            card_tools: CardTools::new(Arc::clone(&api), Arc::clone(&cache)),
            search_tools: SearchTools::new(Arc::clone(&api), Arc::clone(&cache)),
            task_tools: TaskTools::new(Arc::clone(&api), Arc::clone(&cache)),
            label_tools: LabelTools::new(api, Arc::clone(&cache)),
            cache,
            tool_router: Self::tool_router(),
        }
    }

    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Get the tool router for this handler
    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "planka_get_workspace",
        description = "Get the whole Planka workspace in one call: projects, boards, lists, labels and users with their IDs. Cached for 5 minutes. Call this first to discover IDs."
    )]
    pub async fn get_workspace(
        &self,
        params: Parameters<GetWorkspaceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.workspace_tools.get_workspace(params).await
    }

    #[tool(
        name = "planka_list_cards",
        description = "List cards on a board, optionally filtered by list or label name. Paginated (default limit 50, max 100). Use detail_level='preview' (default) to keep responses small."
    )]
    pub async fn list_cards(
        &self,
        params: Parameters<ListCardsParams>,
    ) -> Result<CallToolResult, McpError> {
        self.card_tools.list_cards(params).await
    }

    #[tool(
        name = "planka_get_card",
        description = "Get one card with everything on it: description, members, labels, tasks, comments and attachments."
    )]
    pub async fn get_card(
        &self,
        params: Parameters<GetCardParams>,
    ) -> Result<CallToolResult, McpError> {
        self.card_tools.get_card(params).await
    }

    #[tool(
        name = "planka_create_card",
        description = "Create a card in a list. Requires list_id and name; description, due_date (ISO 8601) and position are optional."
    )]
    pub async fn create_card(
        &self,
        params: Parameters<CreateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        self.card_tools.create_card(params).await
    }

    #[tool(
        name = "planka_update_card",
        description = "Update a card's name, description, due date or position, or move it to another list with list_id."
    )]
    pub async fn update_card(
        &self,
        params: Parameters<UpdateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        self.card_tools.update_card(params).await
    }

    #[tool(
        name = "planka_delete_card",
        description = "Permanently delete a card. This cannot be undone."
    )]
    pub async fn delete_card(
        &self,
        params: Parameters<DeleteCardParams>,
    ) -> Result<CallToolResult, McpError> {
        self.card_tools.delete_card(params).await
    }

    #[tool(
        name = "planka_find_and_get_card",
        description = "Find a card by text in its name or description and return it in full. When several cards match, returns a short list to choose from. Optionally limit to one board."
    )]
    pub async fn find_and_get_card(
        &self,
        params: Parameters<FindAndGetCardParams>,
    ) -> Result<CallToolResult, McpError> {
        self.search_tools.find_and_get_card(params).await
    }

    #[tool(
        name = "planka_add_task",
        description = "Add a task (checklist item) to a card. The task list is found by name or created; default list name is 'Tasks'."
    )]
    pub async fn add_task(
        &self,
        params: Parameters<AddTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        self.task_tools.add_task(params).await
    }

    #[tool(
        name = "planka_update_task",
        description = "Mark a task complete or incomplete."
    )]
    pub async fn update_task(
        &self,
        params: Parameters<UpdateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        self.task_tools.update_task(params).await
    }

    #[tool(name = "planka_delete_task", description = "Delete a task from its card.")]
    pub async fn delete_task(
        &self,
        params: Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        self.task_tools.delete_task(params).await
    }

    #[tool(
        name = "planka_add_card_label",
        description = "Attach a board label to a card. Label IDs are listed by planka_get_workspace."
    )]
    pub async fn add_card_label(
        &self,
        params: Parameters<CardLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.label_tools.add_card_label(params).await
    }

    #[tool(
        name = "planka_remove_card_label",
        description = "Detach a label from a card."
    )]
    pub async fn remove_card_label(
        &self,
        params: Parameters<CardLabelParams>,
    ) -> Result<CallToolResult, McpError> {
        self.label_tools.remove_card_label(params).await
    }
}

#[tool_handler]
impl<A: PlankaApi + 'static> ServerHandler for McpServer<A> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_instructions(INSTRUCTIONS.to_string())
    }
}
