//! Composite "find then get" search over board overviews.

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

use crate::cache::Cache;
use crate::client::PlankaApi;
use crate::mcp::tools::cards::card_detail_text;
use crate::mcp::tools::validation::{ID_MAX, QUERY_MAX, optional_filter, required};
use crate::mcp::tools::{Handles, cached_board, cached_workspace, read_result, try_api};
use crate::shaper::markdown::{MAX_DISAMBIGUATION_ENTRIES, render_disambiguation};
use crate::shaper::{
    BoardPayload, CardView, DetailLevel, ResponseContext, ResponseFormat, ShapeContext,
    shape_card, to_json_text,
};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FindAndGetCardParams {
    #[schemars(
        description = "Text to find in card names or descriptions (case-insensitive, 1-200 characters)",
        length(min = 1, max = 200)
    )]
    pub query: String,
    #[schemars(
        description = "Limit the search to one board (optional, default: all boards)",
        length(max = 100)
    )]
    pub board_id: Option<String>,
    #[serde(default)]
    #[schemars(description = "Output format: 'markdown' (default) or 'json'")]
    pub response_format: ResponseFormat,
    #[serde(default)]
    #[schemars(description = "'minimal', 'standard' (default) or 'full'")]
    pub response_context: ResponseContext,
}

pub struct SearchTools<A> {
    handles: Handles<A>,
}

impl<A> Clone for SearchTools<A> {
    fn clone(&self) -> Self {
        Self {
            handles: self.handles.clone(),
        }
    }
}

impl<A: PlankaApi> SearchTools<A> {
    pub fn new(api: Arc<A>, cache: Arc<Cache>) -> Self {
        Self {
            handles: Handles { api, cache },
        }
    }

    /// One match: the card in full. Several: a preview list to choose from.
    /// None: a plain no-match message.
    pub async fn find_and_get_card(
        &self,
        Parameters(params): Parameters<FindAndGetCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = required("query", &params.query, QUERY_MAX)?;
        let board_id = optional_filter("board_id", params.board_id.as_deref(), ID_MAX)?;
        let needle = query.to_lowercase();

        let Handles { api, cache } = &self.handles;
        let board_ids: Vec<String> = match board_id {
            Some(board_id) => vec![board_id],
            None => {
                let workspace =
                    try_api!("find_and_get_card", cached_workspace(api.as_ref(), cache).await);
                workspace.board_ids().map(str::to_string).collect()
            }
        };

        let mut found: Vec<(String, CardView)> = Vec::new();
        for board_id in &board_ids {
            let raw = try_api!(
                "find_and_get_card",
                cached_board(api.as_ref(), cache, board_id).await
            );
            let board = BoardPayload::from_value(&raw);
            let ctx = ShapeContext::from_board(&board);
            let board_name = board
                .board
                .name
                .clone()
                .unwrap_or_else(|| "Unknown Board".to_string());

            found.extend(board.cards.iter().filter(|card| card.matches(&needle)).map(|card| {
                (
                    board_name.clone(),
                    shape_card(card, DetailLevel::Preview, params.response_context, &ctx),
                )
            }));
        }
        debug!(query = %query, boards = board_ids.len(), matches = found.len(), "card search");

        let text = match found.as_slice() {
            [] => format!("No cards found matching query: '{query}'"),
            [(_, only)] => try_api!(
                "find_and_get_card",
                card_detail_text(
                    api.as_ref(),
                    cache,
                    &only.preview.id,
                    params.response_format,
                    params.response_context,
                )
                .await
            ),
            many => match params.response_format {
                ResponseFormat::Markdown => render_disambiguation(many),
                ResponseFormat::Json => to_json_text(&json!({
                    "query": query,
                    "count": many.len(),
                    "matches": many
                        .iter()
                        .take(MAX_DISAMBIGUATION_ENTRIES)
                        .map(|(board, view)| json!({"board": board, "card": view}))
                        .collect::<Vec<_>>(),
                })),
            },
        };
        Ok(read_result(&text))
    }
}
