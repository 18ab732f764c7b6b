//! Tests for Task MCP tools

use crate::cache::Cache;
use crate::client::{ApiError, MockPlankaApi};
use crate::mcp::tools::{AddTaskParams, DeleteTaskParams, TaskTools, UpdateTaskParams};
use crate::testing::{card_c1, card_c3, expect_get, is_error, result_text};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::{Value, json};
use std::sync::Arc;

fn tools(api: MockPlankaApi) -> (TaskTools<MockPlankaApi>, Arc<Cache>) {
    let cache = Arc::new(Cache::new());
    (TaskTools::new(Arc::new(api), cache.clone()), cache)
}

async fn prime_cards(cache: &Cache) {
    cache
        .card("c1", || async { Ok::<_, ApiError>(card_c1()) })
        .await
        .unwrap();
    cache
        .card("c3", || async { Ok::<_, ApiError>(card_c3()) })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_task_reuses_existing_list_case_insensitively() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    api.expect_post()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "task-lists/tl1/tasks" && body["name"] == "Write regression test"
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "t9", "name": "Write regression test"}})));
    let (tools, cache) = tools(api);
    prime_cards(&cache).await;

    let result = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "c1".to_string(),
            task_name: "Write regression test".to_string(),
            task_list_name: Some("TASKS".to_string()),
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Added task: **Write regression test** to list 'Tasks' (Task ID: `t9`)"
    );
    assert!(cache.peek_card("c1").is_none());
    assert!(cache.peek_card("c3").is_some());
}

#[tokio::test]
async fn test_add_task_creates_missing_list() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c1", card_c1(), 1);
    api.expect_post()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "cards/c1/task-lists" && body["name"] == "QA"
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "tl2", "name": "QA"}})));
    api.expect_post()
        .withf(|endpoint: &str, _| endpoint == "task-lists/tl2/tasks")
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "t9", "name": "Smoke test"}})));
    let (tools, _) = tools(api);

    let result = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "c1".to_string(),
            task_name: "Smoke test".to_string(),
            task_list_name: Some("QA".to_string()),
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Added task: **Smoke test** to list 'QA' (Task ID: `t9`)"
    );
}

#[tokio::test]
async fn test_add_task_defaults_to_tasks_list() {
    let mut api = MockPlankaApi::new();
    expect_get(&mut api, "cards/c3", card_c3(), 1);
    api.expect_post()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "cards/c3/task-lists" && body["name"] == "Tasks"
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "tl3", "name": "Tasks"}})));
    api.expect_post()
        .withf(|endpoint: &str, _| endpoint == "task-lists/tl3/tasks")
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "t10", "name": "Sketch layout"}})));
    let (tools, _) = tools(api);

    let result = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "c3".to_string(),
            task_name: "Sketch layout".to_string(),
            task_list_name: None,
        }))
        .await
        .unwrap();

    assert!(result_text(&result).contains("to list 'Tasks'"));
}

#[tokio::test]
async fn test_add_task_card_lookup_failure() {
    let mut api = MockPlankaApi::new();
    api.expect_get()
        .times(1)
        .returning(|_| Err(ApiError::NotFound));
    let (tools, _) = tools(api);

    let result = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "gone".to_string(),
            task_name: "Anything".to_string(),
            task_list_name: None,
        }))
        .await
        .unwrap();

    assert!(is_error(&result));
    assert!(result_text(&result).starts_with("Error: Resource not found"));
}

#[tokio::test]
async fn test_add_task_validation() {
    let (tools, _) = tools(MockPlankaApi::new());

    let err = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "c1".to_string(),
            task_name: " ".to_string(),
            task_list_name: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert_eq!(err.data.unwrap()["field"], "task_name");

    let err = tools
        .add_task(Parameters(AddTaskParams {
            card_id: "c1".to_string(),
            task_name: "Task".to_string(),
            task_list_name: Some("l".repeat(101)),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.data.unwrap()["field"], "task_list_name");
}

#[tokio::test]
async fn test_update_task_invalidates_owning_card_only() {
    let mut api = MockPlankaApi::new();
    api.expect_patch()
        .withf(|endpoint: &str, body: &Value| {
            endpoint == "tasks/t2" && *body == json!({"isCompleted": true})
        })
        .times(1)
        .returning(|_, _| Ok(json!({"item": {"id": "t2", "name": "Patch", "isCompleted": true}})));
    let (tools, cache) = tools(api);
    prime_cards(&cache).await;

    let result = tools
        .update_task(Parameters(UpdateTaskParams {
            task_id: "t2".to_string(),
            is_completed: true,
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Marked task as complete: [x] **Patch** (ID: `t2`)"
    );
    assert!(cache.peek_card("c1").is_none());
    assert!(cache.peek_card("c3").is_some());
}

#[tokio::test]
async fn test_update_task_mark_incomplete() {
    let mut api = MockPlankaApi::new();
    api.expect_patch()
        .times(1)
        .returning(|_, _| {
            Ok(json!({"item": {"id": "t1", "name": "Reproduce", "isCompleted": false}}))
        });
    let (tools, _) = tools(api);

    let result = tools
        .update_task(Parameters(UpdateTaskParams {
            task_id: "t1".to_string(),
            is_completed: false,
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Marked task as incomplete: [ ] **Reproduce** (ID: `t1`)"
    );
}

#[tokio::test]
async fn test_delete_task() {
    let mut api = MockPlankaApi::new();
    api.expect_delete()
        .withf(|endpoint: &str| endpoint == "tasks/t1")
        .times(1)
        .returning(|_| Ok(json!({"item": {"id": "t1", "name": "Reproduce"}})));
    let (tools, cache) = tools(api);
    prime_cards(&cache).await;

    let result = tools
        .delete_task(Parameters(DeleteTaskParams {
            task_id: "t1".to_string(),
        }))
        .await
        .unwrap();

    assert_eq!(
        result_text(&result),
        "✓ Deleted task: **Reproduce** (ID: `t1`)"
    );
    assert!(cache.peek_card("c1").is_none());
}

#[tokio::test]
async fn test_delete_task_failure_keeps_cache() {
    let mut api = MockPlankaApi::new();
    api.expect_delete()
        .times(1)
        .returning(|_| Err(ApiError::RateLimited));
    let (tools, cache) = tools(api);
    prime_cards(&cache).await;

    let result = tools
        .delete_task(Parameters(DeleteTaskParams {
            task_id: "t1".to_string(),
        }))
        .await
        .unwrap();

    assert!(is_error(&result));
    assert!(result_text(&result).contains("Rate limit exceeded"));
    assert!(cache.peek_card("c1").is_some());
}
