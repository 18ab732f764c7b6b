//! Tests for Card MCP tools

use crate::cache::Cache;
use crate::client::{ApiError, MockPlankaApi};
use crate::mcp::tools::{
    CardTools, CreateCardParams, DeleteCardParams, GetCardParams, ListCardsParams,
    UpdateCardParams,
};
use crate::shaper::{DetailLevel, ResponseContext, ResponseFormat};
use crate::testing::{
    board_b1, board_b2, card_c1, expect_get, expect_workspace, is_error, project_p1, projects,
    result_text, users,
};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::{Value, json};
use std::sync::Arc;

fn tools(api: MockPlankaApi) -> (CardTools<MockPlankaApi>, Arc<Cache>) {
    let cache = Arc::new(Cache::new());
    (CardTools::new(Arc::new(api), cache.clone()), cache)
}

fn list(board_id: &str) -> ListCardsParams {
    ListCardsParams {
        board_id: board_id.to_string(),
        limit: 50,
        ..Default::default()
    }
}

fn get(card_id: &str) -> GetCardParams {
    GetCardParams {
        card_id: card_id.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// list_cards
// =============================================================================

#[tokio::test]
async fn test_list_cards_renders_previews() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools.list_cards(Parameters(list("b1"))).await.unwrap();

    let text = result_text(&result);
    assert!(text.starts_with("# Cards (2 found)"));
    assert!(text.contains("- **Fix login bug** (ID: `c1`)"));
    assert!(text.contains("  - List: Todo"));
    assert!(text.contains("  - Labels: Bug"));
    assert!(text.contains("  - Tasks: 1/2"));
    assert!(text.contains("  - Comments: 1"));
    assert!(text.contains("- **Fix signup bug** (ID: `c2`)"));
    assert!(!text.contains("Pagination"));
}

#[tokio::test]
async fn test_list_cards_second_call_is_served_from_cache() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, cache) = tools(api);

    tools.list_cards(Parameters(list("b1"))).await.unwrap();
    tools.list_cards(Parameters(list("b1"))).await.unwrap();

    let stats = cache.stats().board_overview;
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[tokio::test]
async fn test_list_cards_filters_by_list() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            list_id: Some("l2".to_string()),
            ..list("b1")
        }))
        .await
        .unwrap();

    let text = result_text(&result);
    assert!(text.starts_with("# Cards (1 found)"));
    assert!(text.contains("Fix signup bug"));
    assert!(!text.contains("Fix login bug"));
}

#[tokio::test]
async fn test_list_cards_label_filter_is_case_insensitive_substring() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            label_filter: Some("BU".to_string()),
            ..list("b1")
        }))
        .await
        .unwrap();

    let text = result_text(&result);
    assert!(text.contains("Fix login bug"));
    assert!(!text.contains("Fix signup bug"));
}

#[tokio::test]
async fn test_list_cards_no_matches() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            label_filter: Some("security".to_string()),
            ..list("b1")
        }))
        .await
        .unwrap();

    assert!(!is_error(&result));
    assert_eq!(result_text(&result), "No cards found matching the criteria.");
}

#[tokio::test]
async fn test_list_cards_pagination_footer() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            limit: 1,
            ..list("b1")
        }))
        .await
        .unwrap();

    let text = result_text(&result);
    assert!(text.starts_with("# Cards (1 found)"));
    assert!(text.contains("Showing 1 of 2 cards (offset 0). Use offset=1 to see more."));
}

#[tokio::test]
async fn test_list_cards_json_with_summary_tier() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            response_format: ResponseFormat::Json,
            detail_level: DetailLevel::Summary,
            ..list("b1")
        }))
        .await
        .unwrap();

    let json: Value = serde_json::from_str(result_text(&result)).unwrap();
    assert_eq!(json["board"]["name"], "Backend");
    assert_eq!(json["count"], 2);
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["pagination"]["has_more"], false);

    let first = &json["cards"][0];
    assert_eq!(first["id"], "c1");
    assert_eq!(first["list"]["name"], "Todo");
    assert_eq!(first["description"], "Users cannot log in with SSO");
    assert_eq!(first["members"][0]["name"], "Ada Lovelace");
    // Detailed-only fields stay out of summary views.
    assert!(first.get("task_lists").is_none());
    assert!(first.get("comments").is_none());
}

#[tokio::test]
async fn test_list_cards_minimal_context_uses_bare_ids() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools
        .list_cards(Parameters(ListCardsParams {
            response_format: ResponseFormat::Json,
            response_context: ResponseContext::Minimal,
            ..list("b1")
        }))
        .await
        .unwrap();

    let json: Value = serde_json::from_str(result_text(&result)).unwrap();
    assert_eq!(json["cards"][0]["list"], "l1");
    assert_eq!(json["cards"][0]["labels"], json!(["lab1"]));
}

#[tokio::test]
async fn test_list_cards_rejects_limit_before_any_request() {
    let (tools, cache) = tools(MockPlankaApi::new());

    let err = tools
        .list_cards(Parameters(ListCardsParams {
            limit: 101,
            ..list("b1")
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(err.data.unwrap()["field"], "limit");
    assert_eq!(cache.stats().board_overview.misses, 0);
}

#[tokio::test]
async fn test_list_cards_rejects_blank_board_id() {
    let (tools, _) = tools(MockPlankaApi::new());

    let err = tools
        .list_cards(Parameters(list("   ")))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(err.data.unwrap()["field"], "board_id");
}

// =============================================================================
// get_card
// =============================================================================

#[tokio::test]
async fn test_get_card_renders_every_section() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, _) = tools(api);

    let result = tools.get_card(Parameters(get("c1"))).await.unwrap();

    let text = result_text(&result);
    assert!(text.starts_with("# Fix login bug"));
    assert!(text.contains("**List**: Todo (ID: `l1`)"));
    assert!(text.contains("**Board**: Backend"));
    assert!(text.contains("## Members\nAda Lovelace"));
    assert!(text.contains("## Labels\nBug"));
    assert!(text.contains("## Description\nUsers cannot log in with SSO"));
    assert!(text.contains("## Tasks (1/2)"));
    assert!(text.contains("- [x] Reproduce (ID: `t1`)"));
    assert!(text.contains("- [ ] Patch (ID: `t2`)"));
    assert!(text.contains("Seen on staging"));
    assert!(text.contains("trace.log"));
}

#[tokio::test]
async fn test_get_card_minimal_skips_board_lookup() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    let (tools, cache) = tools(api);

    let result = tools
        .get_card(Parameters(GetCardParams {
            response_format: ResponseFormat::Json,
            response_context: ResponseContext::Minimal,
            ..get("c1")
        }))
        .await
        .unwrap();

    let json: Value = serde_json::from_str(result_text(&result)).unwrap();
    assert_eq!(json["board"], "b1");
    assert_eq!(json["task_lists"][0]["tasks"][0]["id"], "t1");
    assert_eq!(cache.stats().board_overview.misses, 0);
}

#[tokio::test]
async fn test_get_card_is_cached() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    let (tools, cache) = tools(api);

    tools.get_card(Parameters(get("c1"))).await.unwrap();
    tools.get_card(Parameters(get("c1"))).await.unwrap();

    let stats = cache.stats().entity_detail;
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[tokio::test]
async fn test_get_card_not_found_is_tool_error() {
    let mut api = MockPlankaApi::new();
    api.expect_get()
        .withf(|endpoint: &str| endpoint == "cards/missing")
        .times(1)
        .returning(|_| Err(ApiError::NotFound));
    let (tools, cache) = tools(api);

    let result = tools.get_card(Parameters(get("missing"))).await.unwrap();

    assert!(is_error(&result));
    assert!(result_text(&result).starts_with("Error: Resource not found"));
    assert_eq!(cache.stats().entity_detail.entries, 0);
}

#[tokio::test]
async fn test_get_card_survives_board_lookup_failure() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    api.expect_get()
        .withf(|endpoint: &str| endpoint == "boards/b1")
        .times(1)
        .returning(|_| Err(ApiError::Permission));
    let (tools, _) = tools(api);

    let result = tools.get_card(Parameters(get("c1"))).await.unwrap();

    assert!(!is_error(&result));
    assert!(result_text(&result).contains("**Board**: Unknown Board"));
}

#[tokio::test]
async fn test_get_card_falls_back_to_cached_workspace_names() {
    use crate::workspace::{BoardInfo, Workspace};

    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    api.expect_get()
        .withf(|endpoint: &str| endpoint == "boards/b1")
        .times(1)
        .returning(|_| Err(ApiError::Timeout));
    let (tools, cache) = tools(api);

    let mut workspace = Workspace::default();
    workspace.boards.insert(
        "b1".to_string(),
        BoardInfo {
            id: "b1".to_string(),
            name: "Backend".to_string(),
            project_id: Some("p1".to_string()),
            project_name: "Engineering".to_string(),
        },
    );
    cache
        .workspace(move || async move { Ok::<_, ApiError>(workspace) })
        .await
        .unwrap();

    let result = tools.get_card(Parameters(get("c1"))).await.unwrap();

    assert!(result_text(&result).contains("**Board**: Backend"));
}

// =============================================================================
// create_card
// =============================================================================

#[tokio::test]
async fn test_create_card_invalidates_only_its_board() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "projects", projects(), 1);
    expect_get(&mut api, "users", users(), 1);
    expect_get(&mut api, "projects/p1", project_p1(), 1);
    // overview priming + workspace aggregation + refetch after invalidation
    expect_get(&mut api, "boards/b1", board_b1(), 3);
    // overview priming + workspace aggregation only
    expect_get(&mut api, "boards/b2", board_b2(), 2);
    api.expect_post()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "lists/l1/cards"
                && body["type"] == "project"
                && body["name"] == "Add SSO tests"
                && body["position"] == 65535.0
                && body.get("description").is_none()
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "c9", "name": "Add SSO tests"}})));
    let (tools, cache) = tools(api);

    tools.list_cards(Parameters(list("b1"))).await.unwrap();
    tools.list_cards(Parameters(list("b2"))).await.unwrap();

    let result = tools
        .create_card(Parameters(CreateCardParams {
            list_id: "l1".to_string(),
            name: "  Add SSO tests ".to_string(),
            description: Some(String::new()),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert!(!is_error(&result));
    assert_eq!(
        result_text(&result),
        "✓ Created card: **Add SSO tests** (ID: `c9`)"
    );

    tools.list_cards(Parameters(list("b2"))).await.unwrap();
    tools.list_cards(Parameters(list("b1"))).await.unwrap();

    let stats = cache.stats().board_overview;
    assert_eq!((stats.hits, stats.misses), (1, 3));
}

#[tokio::test]
async fn test_create_card_normalizes_due_date() {
    let mut api = MockPlankaApi::new();
    expect_workspace(&mut api, 1);
    api.expect_post()
        .withf(|_, body: &Value| {
            body["dueDate"] == "2026-01-31T00:00:00.000Z"
                && body["description"] == "Cover the SAML flow"
                && body["position"] == 10.0
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "c9", "name": "Add SSO tests"}})));
    let (tools, _) = tools(api);

    let result = tools
        .create_card(Parameters(CreateCardParams {
            list_id: "l3".to_string(),
            name: "Add SSO tests".to_string(),
            description: Some("Cover the SAML flow".to_string()),
            due_date: Some("2026-01-31".to_string()),
            position: Some(10.0),
        }))
        .await
        .unwrap();
    assert!(!is_error(&result));
}

#[tokio::test]
async fn test_create_card_unknown_list() {
    let mut api = MockPlankaApi::new();
    expect_workspace(&mut api, 1);
    let (tools, _) = tools(api);

    let result = tools
        .create_card(Parameters(CreateCardParams {
            list_id: "l404".to_string(),
            name: "Orphan".to_string(),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert!(is_error(&result));
    assert_eq!(
        result_text(&result),
        "Error: List ID 'l404' not found. Use planka_get_workspace to see valid list IDs."
    );
}

#[tokio::test]
async fn test_create_card_validation_happens_before_network() {
    let (tools, cache) = tools(MockPlankaApi::new());

    let err = tools
        .create_card(Parameters(CreateCardParams {
            list_id: "l1".to_string(),
            name: "x".repeat(501),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(err.data.unwrap()["field"], "name");

    let err = tools
        .create_card(Parameters(CreateCardParams {
            list_id: "l1".to_string(),
            name: "Card".to_string(),
            due_date: Some("tomorrow".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(err.data.unwrap()["field"], "due_date");
    assert_eq!(cache.stats().workspace.misses, 0);
}

// =============================================================================
// update_card
// =============================================================================

#[tokio::test]
async fn test_update_card_move_invalidates_both_boards_and_card() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 2);
    expect_get(&mut api, "boards/b2", board_b2(), 2);
    expect_get(
        &mut api,
        "boards/b3",
        json!({"item": {"id": "b3", "name": "Ops"}, "included": {}}),
        1,
    );
    // get_card, then the pre-move lookup of the current board
    expect_get(&mut api, "cards/c1", card_c1(), 2);
    api.expect_patch()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "cards/c1" && body["listId"] == "l3" && body["position"] == 65535.0
        })
        .times(1)
        .returning(|_, _| {
            Ok(json!({"item": {"id": "c1", "name": "Fix login bug", "boardId": "b2", "listId": "l3"}}))
        });
    let (tools, cache) = tools(api);

    for board in ["b1", "b2", "b3"] {
        tools.list_cards(Parameters(list(board))).await.unwrap();
    }
    tools.get_card(Parameters(get("c1"))).await.unwrap();
    assert!(cache.peek_card("c1").is_some());

    let result = tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            list_id: Some("l3".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();
    assert_eq!(
        result_text(&result),
        "✓ Updated list (moved) for card: **Fix login bug** (ID: `c1`)"
    );
    assert!(cache.peek_card("c1").is_none());

    for board in ["b1", "b2", "b3"] {
        tools.list_cards(Parameters(list(board))).await.unwrap();
    }
    let stats = cache.stats().board_overview;
    // get_card hit b1 once; b3 is the only hit after the move.
    assert_eq!((stats.hits, stats.misses), (2, 5));
}

#[tokio::test]
async fn test_update_card_move_resolves_destination_board_from_workspace() {
    let mut api = MockPlankaApi::new();
    // Priming list, workspace aggregation, relist.
    expect_workspace(&mut api, 3);
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    api.expect_patch()
        .withf(|endpoint: &str, body: &Value| endpoint == "cards/c1" && body["listId"] == "l3")
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "c1", "name": "Fix login bug"}})));
    let (tools, cache) = tools(api);

    for board in ["b1", "b2"] {
        tools.list_cards(Parameters(list(board))).await.unwrap();
    }
    assert!(cache.peek_workspace().is_none());

    tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            list_id: Some("l3".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();

    for board in ["b1", "b2"] {
        tools.list_cards(Parameters(list(board))).await.unwrap();
    }
    let stats = cache.stats().board_overview;
    assert_eq!((stats.hits, stats.misses), (0, 4));
}

#[tokio::test]
async fn test_update_card_rename_leaves_boards_cached() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    api.expect_patch()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "cards/c1" && *body == json!({"name": "Fix SSO login"})
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "c1", "name": "Fix SSO login"}})));
    let (tools, cache) = tools(api);

    tools.list_cards(Parameters(list("b1"))).await.unwrap();
    let result = tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            name: Some("Fix SSO login".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Updated name for card: **Fix SSO login** (ID: `c1`)"
    );
    tools.list_cards(Parameters(list("b1"))).await.unwrap();
    assert_eq!(cache.stats().board_overview.hits, 1);
}

#[tokio::test]
async fn test_update_card_lists_every_changed_field() {
    let mut api = MockPlankaApi::new();
    api.expect_patch()
        .withf(|_, body: &Value| {
            body["description"] == "" && body["dueDate"] == "2026-02-01T09:30:00.000Z"
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "c1", "name": "Fix login bug"}})));
    let (tools, _) = tools(api);

    let result = tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            description: Some(String::new()),
            due_date: Some("2026-02-01T09:30:00Z".to_string()),
            position: Some(3.0),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Updated description, due date, position for card: **Fix login bug** (ID: `c1`)"
    );
}

#[tokio::test]
async fn test_update_card_requires_a_change() {
    let (tools, _) = tools(MockPlankaApi::new());

    let err = tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            ..Default::default()
        }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("nothing to update"));
}

#[tokio::test]
async fn test_update_card_failure_keeps_cache() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    expect_get(&mut api, "boards/b1", board_b1(), 1);
    api.expect_patch()
        .times(1)
        .returning(|_, _| Err(ApiError::Permission));
    let (tools, cache) = tools(api);

    tools.get_card(Parameters(get("c1"))).await.unwrap();
    let result = tools
        .update_card(Parameters(UpdateCardParams {
            card_id: "c1".to_string(),
            name: Some("Nope".to_string()),
            ..Default::default()
        }))
        .await
        .unwrap();

    assert!(is_error(&result));
    assert!(result_text(&result).contains("permission"));
    assert!(cache.peek_card("c1").is_some());
}

// =============================================================================
// delete_card
// =============================================================================

#[tokio::test]
async fn test_delete_card_uses_cached_board_for_invalidation() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    // get_card context, then the refetch after deletion
    expect_get(&mut api, "boards/b1", board_b1(), 2);
    api.expect_delete()
        .withf(|endpoint: &str| endpoint == "cards/c1")
        .times(1)
        .returning(|_| Ok(json!({"item": {"id": "c1", "name": "Fix login bug"}})));
    let (tools, cache) = tools(api);

    tools.get_card(Parameters(get("c1"))).await.unwrap();
    let result = tools
        .delete_card(Parameters(DeleteCardParams {
            card_id: "c1".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Deleted card: **Fix login bug** (ID: `c1`)"
    );
    assert!(cache.peek_card("c1").is_none());
    tools.list_cards(Parameters(list("b1"))).await.unwrap();
    assert_eq!(cache.stats().board_overview.misses, 2);
}
