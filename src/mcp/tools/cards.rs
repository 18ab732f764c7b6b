//! MCP tools for cards.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheKey};
use crate::client::{ApiResult, PlankaApi};
use crate::mcp::tools::validation::{
    DESCRIPTION_MAX, FILTER_MAX, ID_MAX, NAME_MAX, ValidationError, due_date, in_range, optional,
    optional_filter, position, required,
};
use crate::mcp::tools::{
    DEFAULT_POSITION, Handles, cached_board, cached_card, cached_workspace, error_result,
    item_str, read_result, try_api, write_result,
};
use crate::shaper::markdown::{render_card_detailed, render_cards};
use crate::shaper::{
    BoardPayload, CardPayload, CardRecord, CardView, DetailLevel, ResponseContext,
    ResponseFormat, ShapeContext, paginate, shape_card, to_json_text,
};

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCardsParams {
    #[schemars(description = "Board ID to list cards from", length(min = 1, max = 100))]
    pub board_id: String,
    #[schemars(
        description = "Only cards in this list. Omit to list cards across ALL lists of the board.",
        length(max = 100)
    )]
    pub list_id: Option<String>,
    #[schemars(
        description = "Case-insensitive substring matched against label names (e.g. 'bug')",
        length(max = 100)
    )]
    pub label_filter: Option<String>,
    #[serde(default = "default_limit")]
    #[schemars(
        description = "Maximum cards to return (1-100, default: 50)",
        range(min = 1, max = 100)
    )]
    pub limit: usize,
    #[serde(default)]
    #[schemars(description = "Cards to skip for pagination (default: 0)")]
    pub offset: usize,
    #[serde(default)]
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub response_format: ResponseFormat,
    #[serde(default)]
    #[schemars(
        description = "'preview' (default, ~50 tokens/card), 'summary' (~200) or 'detailed' (~400)"
    )]
    pub detail_level: DetailLevel,
    #[serde(default)]
    #[schemars(
        description = "'minimal' (ids only), 'standard' (default, ids and names) or 'full' (adds colours, usernames, board names)"
    )]
    pub response_context: ResponseContext,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetCardParams {
    #[schemars(description = "Card ID", length(min = 1, max = 100))]
    pub card_id: String,
    #[serde(default)]
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub response_format: ResponseFormat,
    #[serde(default)]
    #[schemars(description = "'minimal', 'standard' (default) or 'full'")]
    pub response_context: ResponseContext,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCardParams {
    #[schemars(
        description = "List ID to create the card in. Use planka_get_workspace to find list IDs.",
        length(min = 1, max = 100)
    )]
    pub list_id: String,
    #[schemars(description = "Card title (1-500 characters)", length(min = 1, max = 500))]
    pub name: String,
    #[schemars(
        description = "Card description in markdown (optional, at most 10000 characters)",
        length(max = 10000)
    )]
    pub description: Option<String>,
    #[schemars(description = "Due date, ISO 8601 (e.g. '2026-01-31' or '2026-01-31T12:00:00Z')")]
    pub due_date: Option<String>,
    #[schemars(
        description = "Position in the list, non-negative (default: end of list)",
        range(min = 0.0)
    )]
    pub position: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCardParams {
    #[schemars(description = "Card ID to update", length(min = 1, max = 100))]
    pub card_id: String,
    #[schemars(description = "New title (optional, 1-500 characters)", length(min = 1, max = 500))]
    pub name: Option<String>,
    #[schemars(
        description = "New description (optional, at most 10000 characters). Empty string clears it.",
        length(max = 10000)
    )]
    pub description: Option<String>,
    #[schemars(description = "New due date, ISO 8601 (optional)")]
    pub due_date: Option<String>,
    #[schemars(description = "Move the card to this list (optional)", length(max = 100))]
    pub list_id: Option<String>,
    #[schemars(
        description = "New position in the list, non-negative (optional)",
        range(min = 0.0)
    )]
    pub position: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteCardParams {
    #[schemars(description = "Card ID to delete", length(min = 1, max = 100))]
    pub card_id: String,
}

// =============================================================================
// Card Tools
// =============================================================================

pub struct CardTools<A> {
    handles: Handles<A>,
}

impl<A> Clone for CardTools<A> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
        }
    }
}

fn label_matches(card: &CardRecord, ctx: &ShapeContext, needle_lower: &str) -> bool {
    card.label_ids.iter().any(|label_id| {
        ctx.labels
            .get(label_id)
            .is_some_and(|label| label.name.to_lowercase().contains(needle_lower))
    })
}

/// Render one card at the detailed tier. The card comes from the entity
/// cache; names come from its board's overview unless ids are all that is
/// wanted.
pub(crate) async fn card_detail_text<A: PlankaApi>(
    api: &A,
    cache: &Cache,
    card_id: &str,
    format: ResponseFormat,
    context: ResponseContext,
) -> ApiResult<String> {
    let raw = cached_card(api, cache, card_id).await?;
    let card = CardPayload::from_value(&raw);

    let mut ctx = ShapeContext::from_included(&card.included, None);
    let board_id = card
        .record
        .card
        .board_id
        .as_deref()
        .filter(|_| context != ResponseContext::Minimal);
    if let Some(board_id) = board_id {
        match cached_board(api, cache, board_id).await {
            Ok(board) => {
                ctx = ctx.merge(ShapeContext::from_board(&BoardPayload::from_value(&board)));
            }
            Err(err) => {
                warn!(
                    card_id,
                    board_id,
                    error = %err,
                    "board lookup failed, falling back to workspace names"
                );
                if let Some(workspace) = cache.peek_workspace() {
                    ctx = ctx.merge(ShapeContext::from_workspace(&workspace));
                }
            }
        }
    }

    let view = shape_card(&card.record, DetailLevel::Detailed, context, &ctx);
    Ok(match format {
        ResponseFormat::Markdown => render_card_detailed(&view),
        ResponseFormat::Json => to_json_text(&view),
    })
}

impl<A: PlankaApi> CardTools<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            handles: Handles { api, cache },
        }
    }

    pub async fn list_cards(
        &self,
        Parameters(params): Parameters<ListCardsParams>,
    ) -> Result<CallToolResult, McpError> {
        let board_id = required("board_id", &params.board_id, ID_MAX)?;
        let list_id = optional_filter("list_id", params.list_id.as_deref(), ID_MAX)?;
        let label_filter =
            optional_filter("label_filter", params.label_filter.as_deref(), FILTER_MAX)?
                .map(|filter| filter.to_lowercase());
        let limit = in_range("limit", params.limit, 1, MAX_LIST_LIMIT)?;

        let Handles { api, cache } = &self.handles;
        let raw = try_api!("list_cards", cached_board(api.as_ref(), cache, &board_id).await);
        let board = BoardPayload::from_value(&raw);
        let ctx = ShapeContext::from_board(&board);

        let matching: Vec<&CardRecord> = board
            .cards
            .iter()
            .filter(|card| {
                list_id
                    .as_deref()
                    .is_none_or(|id| card.card.list_id.as_deref() == Some(id))
            })
            .filter(|card| {
                label_filter
                    .as_deref()
                    .is_none_or(|needle| label_matches(card, &ctx, needle))
            })
            .collect();

        let (window, page) = paginate(&matching, params.offset, limit);
        let views: Vec<CardView> = window
            .iter()
            .map(|card| shape_card(card, params.detail_level, params.response_context, &ctx))
            .collect();
        debug!(
            board_id = %board_id,
            matched = matching.len(),
            returned = views.len(),
            "listed cards"
        );

        let text = match params.response_format {
            ResponseFormat::Markdown => render_cards(&views, &page),
            ResponseFormat::Json => to_json_text(&json!({
                "board": {
                    "id": board_id,
                    "name": board.board.name.as_deref().unwrap_or("Unknown Board"),
                },
                "count": page.count,
                "cards": views,
                "pagination": page,
            })),
        };
        Ok(read_result(&text))
    }

    pub async fn get_card(
        &self,
        Parameters(params): Parameters<GetCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        let text = try_api!(
            "get_card",
            card_detail_text(
                api.as_ref(),
                cache,
                &card_id,
                params.response_format,
                params.response_context,
            )
            .await
        );
        Ok(read_result(&text))
    }

    pub async fn create_card(
        &self,
        Parameters(params): Parameters<CreateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let list_id = required("list_id", &params.list_id, ID_MAX)?;
        let name = required("name", &params.name, NAME_MAX)?;
        let description = optional("description", params.description.as_deref(), DESCRIPTION_MAX)?
            .filter(|text| !text.is_empty());
        let due = due_date("due_date", params.due_date.as_deref())?;
        let position = position("position", params.position)?.unwrap_or(DEFAULT_POSITION);

        let Handles { api, cache } = &self.handles;
        let workspace = try_api!("create_card", cached_workspace(api.as_ref(), cache).await);
        let Some(board_id) = workspace.board_of_list(&list_id).map(str::to_string) else {
            return Ok(error_result(format!(
                "Error: List ID '{list_id}' not found. Use planka_get_workspace to see valid list IDs."
            )));
        };

        let mut body = json!({
            "type": "project",
            "name": name,
            "position": position,
        });
        if let Some(description) = description {
            body["description"] = Value::String(description);
        }
        if let Some(due) = due {
            body["dueDate"] = Value::String(due);
        }

        let response = try_api!(
            "create_card",
            api.post(&format!("lists/{list_id}/cards"), body).await
        );
        cache.invalidate(CacheKey::BoardOverview(&board_id));

        Ok(write_result(format!(
            "✓ Created card: **{}** (ID: `{}`)",
            item_str(&response, "name").unwrap_or(&name),
            item_str(&response, "id").unwrap_or("N/A"),
        )))
    }

    pub async fn update_card(
        &self,
        Parameters(params): Parameters<UpdateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;
        let name = params
            .name
            .as_deref()
            .map(|name| required("name", name, NAME_MAX))
            .transpose()?;
        let description = optional("description", params.description.as_deref(), DESCRIPTION_MAX)?;
        let due = due_date("due_date", params.due_date.as_deref())?;
        let list_id = optional_filter("list_id", params.list_id.as_deref(), ID_MAX)?;
        let position = position("position", params.position)?;

        let mut body = Map::new();
        let mut updated = Vec::new();
        if let Some(name) = name {
            body.insert("name".into(), Value::String(name));
            updated.push("name");
        }
        if let Some(description) = description {
            body.insert("description".into(), Value::String(description));
            updated.push("description");
        }
        if let Some(due) = due {
            body.insert("dueDate".into(), Value::String(due));
            updated.push("due date");
        }
        if let Some(list_id) = &list_id {
            body.insert("listId".into(), Value::String(list_id.clone()));
            updated.push("list (moved)");
        }
        match position {
            Some(position) => {
                body.insert("position".into(), json!(position));
                updated.push("position");
            }
            None if list_id.is_some() => {
                body.insert("position".into(), json!(DEFAULT_POSITION));
            }
            None => {}
        }
        if body.is_empty() {
            return Err(ValidationError::new(
                "card_id",
                "nothing to update: provide at least one of name, description, due_date, list_id or position",
            )
            .into());
        }

        let Handles { api, cache } = &self.handles;

        // The card's current board must be known before the move happens.
        let old_board = match &list_id {
            Some(_) => {
                let current = try_api!("update_card", api.get(&format!("cards/{card_id}")).await);
                item_str(&current, "boardId").map(str::to_string)
            }
            None => None,
        };

        let response = try_api!(
            "update_card",
            api.patch(&format!("cards/{card_id}"), Value::Object(body))
                .await
        );

        cache.invalidate(CacheKey::EntityDetail(&card_id));
        if let Some(list_id) = &list_id {
            let new_board = match item_str(&response, "boardId") {
                Some(board_id) => Some(board_id.to_string()),
                None => match cached_workspace(api.as_ref(), cache).await {
                    Ok(workspace) => workspace.board_of_list(list_id).map(str::to_string),
                    Err(err) => {
                        warn!(
                            list_id = %list_id,
                            error = %err,
                            "destination board unknown after move"
                        );
                        None
                    }
                },
            };
            let mut boards: Vec<String> = old_board.into_iter().chain(new_board).collect();
            boards.dedup();
            for board_id in &boards {
                cache.invalidate(CacheKey::BoardOverview(board_id));
            }
            debug!(card_id = %card_id, boards = ?boards, "card moved");
        }

        Ok(write_result(format!(
            "✓ Updated {} for card: **{}** (ID: `{}`)",
            updated.join(", "),
            item_str(&response, "name").unwrap_or("Untitled"),
            item_str(&response, "id").unwrap_or(&card_id),
        )))
    }

    pub async fn delete_card(
        &self,
        Parameters(params): Parameters<DeleteCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = required("card_id", &params.card_id, ID_MAX)?;

        let Handles { api, cache } = &self.handles;
        let cached_board_id = cache
            .peek_card(&card_id)
            .and_then(|card| item_str(&card, "boardId").map(str::to_string));

        let response = try_api!("delete_card", api.delete(&format!("cards/{card_id}")).await);

        cache.invalidate(CacheKey::EntityDetail(&card_id));
        let board_id = item_str(&response, "boardId")
            .map(str::to_string)
            .or(cached_board_id);
        match &board_id {
            Some(board_id) => {
                cache.invalidate(CacheKey::BoardOverview(board_id));
            }
            None => warn!(
                card_id = %card_id,
                "deleted card's board unknown, board overview left to expire"
            ),
        }

        Ok(write_result(format!(
            "✓ Deleted card: **{}** (ID: `{card_id}`)",
            item_str(&response, "name").unwrap_or(&card_id),
        )))
    }
}
