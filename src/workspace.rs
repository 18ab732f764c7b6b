//! Workspace structure aggregated from projects, boards, lists, labels and users.

use crate::client::{ApiResult, PlankaApi};
use crate::shaper::raw::{RawBoard, RawEnvelope, RawItems, RawProject, RawUser, decode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardInfo {
    pub id: String,
    pub name: String,
    pub project_id: Option<String>,
    pub project_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListInfo {
    pub id: String,
    pub name: String,
    pub board_id: String,
    pub board_name: String,
    pub position: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelInfo {
    pub id: String,
    pub name: String,
    pub color: String,
    pub board_id: String,
    pub board_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
}

/// Everything needed to resolve ids to names across the whole account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workspace {
    pub projects: Vec<ProjectInfo>,
    pub boards: BTreeMap<String, BoardInfo>,
    pub lists: BTreeMap<String, ListInfo>,
    pub labels: BTreeMap<String, LabelInfo>,
    pub users: BTreeMap<String, UserInfo>,
    /// card id -> label ids
    pub card_labels: BTreeMap<String, Vec<String>>,
}

impl Workspace {
    /// Board owning the given list, if the list is known.
    pub fn board_of_list(&self, list_id: &str) -> Option<&str> {
        self.lists.get(list_id).map(|list| list.board_id.as_str())
    }

    pub fn label_name(&self, label_id: &str) -> Option<&str> {
        self.labels.get(label_id).map(|label| label.name.as_str())
    }

    pub fn board_ids(&self) -> impl Iterator<Item = &str> {
        self.boards.keys().map(String::as_str)
    }
}

/// Fetch the full workspace: projects and users, then each project's boards,
/// then each board's lists, labels and card labels.
///
/// Any failed request fails the whole aggregation.
pub async fn fetch_workspace<A: PlankaApi + ?Sized>(api: &A) -> ApiResult<Workspace> {
    let projects: RawItems<RawProject> = decode(&api.get("projects").await?, "projects");
    let users: RawItems<RawUser> = decode(&api.get("users").await?, "users");

    let mut workspace = Workspace {
        users: users
            .items
            .into_iter()
            .map(|user| {
                let info = UserInfo {
                    name: user
                        .name
                        .or_else(|| user.username.clone())
                        .unwrap_or_else(|| "Unnamed User".to_string()),
                    username: user.username,
                    id: user.id.clone(),
                };
                (user.id, info)
            })
            .collect(),
        ..Default::default()
    };

    for project in projects.items {
        let project_name = project
            .name
            .clone()
            .unwrap_or_else(|| "Unknown Project".to_string());
        let detail: RawEnvelope<RawProject> =
            decode(&api.get(&format!("projects/{}", project.id)).await?, "project");

        for summary in detail.included.boards {
            let board_detail: RawEnvelope<RawBoard> =
                decode(&api.get(&format!("boards/{}", summary.id)).await?, "board");
            let board = board_detail.item;
            let board_id = if board.id.is_empty() {
                summary.id.clone()
            } else {
                board.id.clone()
            };
            let board_name = board
                .name
                .or(summary.name)
                .unwrap_or_else(|| "Unnamed Board".to_string());

            for list in board_detail.included.lists {
                workspace.lists.insert(
                    list.id.clone(),
                    ListInfo {
                        name: list.name.unwrap_or_else(|| "Unnamed List".to_string()),
                        board_id: list.board_id.unwrap_or_else(|| board_id.clone()),
                        board_name: board_name.clone(),
                        position: list.position.unwrap_or(0.0),
                        id: list.id,
                    },
                );
            }

            for label in board_detail.included.labels {
                workspace.labels.insert(
                    label.id.clone(),
                    LabelInfo {
                        name: label.name.unwrap_or_else(|| "Unnamed Label".to_string()),
                        color: label.color.unwrap_or_else(|| "gray".to_string()),
                        board_id: label.board_id.unwrap_or_else(|| board_id.clone()),
                        board_name: board_name.clone(),
                        id: label.id,
                    },
                );
            }

            for link in board_detail.included.card_labels {
                if link.card_id.is_empty() || link.label_id.is_empty() {
                    continue;
                }
                workspace
                    .card_labels
                    .entry(link.card_id)
                    .or_default()
                    .push(link.label_id);
            }

            workspace.boards.insert(
                board_id.clone(),
                BoardInfo {
                    id: board_id,
                    name: board_name,
                    project_id: board.project_id.or_else(|| Some(project.id.clone())),
                    project_name: project_name.clone(),
                },
            );
        }

        workspace.projects.push(ProjectInfo {
            id: project.id,
            name: project_name,
        });
    }

    debug!(
        projects = workspace.projects.len(),
        boards = workspace.boards.len(),
        lists = workspace.lists.len(),
        "workspace aggregated"
    );
    Ok(workspace)
}
