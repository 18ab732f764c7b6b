//! Planka payload fixtures shared by unit tests.
//!
//! One project `p1` ("Engineering") with two boards:
//! - `b1` "Backend": lists `l1` Todo, `l2` Done; label `lab1` Bug;
//!   cards `c1` "Fix login bug" (2 tasks, 1 done) and `c2` "Fix signup bug"
//! - `b2` "Frontend": list `l3` Backlog; label `lab2` Feature;
//!   card `c3` "Build dashboard"

use crate::client::MockPlankaApi;
use rmcp::model::{CallToolResult, RawContent};
use serde_json::{Value, json};

/// Text of the first content item of a tool result.
pub fn result_text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}

pub fn expect_get(api: &mut MockPlankaApi, endpoint: &'static str, body: Value, times: usize) {
    api.expect_get()
        .withf(move |requested: &str| requested == endpoint)
        .times(times)
        .returning(move |_| Ok(body.clone()));
}

/// Expect exactly one workspace aggregation. Each board endpoint is
/// expected `board_gets` times in total (at least the one aggregation read).
pub fn expect_workspace(api: &mut MockPlankaApi, board_gets: usize) {
    expect_get(api, "projects", projects(), 1);
    expect_get(api, "users", users(), 1);
    expect_get(api, "projects/p1", project_p1(), 1);
    expect_get(api, "boards/b1", board_b1(), board_gets);
    expect_get(api, "boards/b2", board_b2(), board_gets);
}

pub fn projects() -> Value {
    json!({"items": [{"id": "p1", "name": "Engineering"}]})
}

pub fn users() -> Value {
    json!({"items": [
        {"id": "u1", "name": "Ada Lovelace", "username": "ada"},
        {"id": "u2", "name": "Alan Turing", "username": "alan"}
    ]})
}

pub fn project_p1() -> Value {
    json!({
        "item": {"id": "p1", "name": "Engineering"},
        "included": {"boards": [
            {"id": "b1", "name": "Backend", "projectId": "p1"},
            {"id": "b2", "name": "Frontend", "projectId": "p1"}
        ]}
    })
}

pub fn board_b1() -> Value {
    json!({
        "item": {"id": "b1", "name": "Backend", "projectId": "p1"},
        "included": {
            "lists": [
                {"id": "l1", "name": "Todo", "boardId": "b1", "position": 1.0},
                {"id": "l2", "name": "Done", "boardId": "b1", "position": 2.0}
            ],
            "labels": [{"id": "lab1", "name": "Bug", "color": "berry-red", "boardId": "b1"}],
            "users": [{"id": "u1", "name": "Ada Lovelace", "username": "ada"}],
            "cards": [
                {
                    "id": "c1", "name": "Fix login bug", "listId": "l1", "boardId": "b1",
                    "description": "Users cannot log in with SSO",
                    "dueDate": "2026-11-01T12:00:00.000Z", "position": 65535.0,
                    "createdAt": "2026-10-01T09:00:00.000Z", "commentsTotal": 1
                },
                {
                    "id": "c2", "name": "Fix signup bug", "listId": "l2", "boardId": "b1",
                    "description": null, "position": 131070.0
                }
            ],
            "cardLabels": [{"id": "cl1", "cardId": "c1", "labelId": "lab1"}],
            "cardMemberships": [{"id": "cm1", "cardId": "c1", "userId": "u1"}],
            "taskLists": [{"id": "tl1", "cardId": "c1", "name": "Tasks", "position": 1.0}],
            "tasks": [
                {"id": "t1", "taskListId": "tl1", "name": "Reproduce", "isCompleted": true, "position": 1.0},
                {"id": "t2", "taskListId": "tl1", "name": "Patch", "isCompleted": false, "position": 2.0}
            ]
        }
    })
}

pub fn board_b2() -> Value {
    json!({
        "item": {"id": "b2", "name": "Frontend", "projectId": "p1"},
        "included": {
            "lists": [{"id": "l3", "name": "Backlog", "boardId": "b2", "position": 1.0}],
            "labels": [{"id": "lab2", "name": "Feature", "color": "lagoon-blue", "boardId": "b2"}],
            "cards": [
                {"id": "c3", "name": "Build dashboard", "listId": "l3", "boardId": "b2"}
            ],
            "cardLabels": [{"id": "cl2", "cardId": "c3", "labelId": "lab2"}]
        }
    })
}

pub fn card_c1() -> Value {
    json!({
        "item": {
            "id": "c1", "name": "Fix login bug", "listId": "l1", "boardId": "b1",
            "description": "Users cannot log in with SSO",
            "dueDate": "2026-11-01T12:00:00.000Z", "position": 65535.0,
            "createdAt": "2026-10-01T09:00:00.000Z", "updatedAt": "2026-10-02T09:00:00.000Z"
        },
        "included": {
            "cardLabels": [{"id": "cl1", "cardId": "c1", "labelId": "lab1"}],
            "cardMemberships": [{"id": "cm1", "cardId": "c1", "userId": "u1"}],
            "taskLists": [{"id": "tl1", "cardId": "c1", "name": "Tasks", "position": 1.0}],
            "tasks": [
                {"id": "t1", "taskListId": "tl1", "name": "Reproduce", "isCompleted": true, "position": 1.0},
                {"id": "t2", "taskListId": "tl1", "name": "Patch", "isCompleted": false, "position": 2.0}
            ],
            "comments": [
                {"id": "cm9", "cardId": "c1", "userId": "u1", "text": "Seen on staging", "createdAt": "2026-10-03T10:00:00.000Z"}
            ],
            "attachments": [{"id": "a1", "cardId": "c1", "name": "trace.log"}]
        }
    })
}

pub fn card_c3() -> Value {
    json!({
        "item": {"id": "c3", "name": "Build dashboard", "listId": "l3", "boardId": "b2"},
        "included": {}
    })
}
