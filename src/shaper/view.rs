//! Typed card views at three detail tiers and three context tiers.

use crate::shaper::raw::{BoardPayload, CardRecord, RawBoard, RawIncluded, TaskListRecord};
use crate::workspace::Workspace;
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Characters of description kept at the summary tier.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// How many of a card's fields are rendered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Name, list, labels, due date and counts (~50 tokens per card)
    #[default]
    Preview,
    /// Preview plus description snippet, members and timestamps
    Summary,
    /// Everything, including tasks, comments and attachments
    Detailed,
}

/// How related entities (lists, labels, members) are referenced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseContext {
    /// Bare ids
    Minimal,
    /// Id and name
    #[default]
    Standard,
    /// Id, name and one extra attribute
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

/// A resolvable name plus the attribute shown at the `full` context tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Named {
    pub name: String,
    pub extra: Option<String>,
}

impl Named {
    fn new(name: impl Into<String>, extra: Option<String>) -> Self {
        Self {
            name: name.into(),
            extra,
        }
    }
}

/// Id-to-name tables used while shaping.
///
/// `extra` holds: the project name for boards, the board name for lists, the
/// colour for labels and the username for users.
#[derive(Debug, Clone, Default)]
pub struct ShapeContext {
    pub boards: HashMap<String, Named>,
    pub lists: HashMap<String, Named>,
    pub labels: HashMap<String, Named>,
    pub users: HashMap<String, Named>,
}

impl ShapeContext {
    pub fn from_included(included: &RawIncluded, board: Option<&RawBoard>) -> Self {
        let board_name = board.and_then(|b| b.name.clone());
        let mut ctx = Self::default();

        if let Some(board) = board.filter(|b| !b.id.is_empty()) {
            ctx.boards.insert(
                board.id.clone(),
                Named::new(board_name.clone().unwrap_or_else(|| "Unknown Board".into()), None),
            );
        }
        for board in &included.boards {
            ctx.boards.insert(
                board.id.clone(),
                Named::new(board.name.clone().unwrap_or_default(), None),
            );
        }
        for list in &included.lists {
            ctx.lists.insert(
                list.id.clone(),
                Named::new(
                    list.name.clone().unwrap_or_else(|| "Unnamed List".into()),
                    board_name.clone(),
                ),
            );
        }
        for label in &included.labels {
            ctx.labels.insert(
                label.id.clone(),
                Named::new(label.name.clone().unwrap_or_default(), label.color.clone()),
            );
        }
        for user in &included.users {
            ctx.users.insert(
                user.id.clone(),
                Named::new(
                    user.name.clone().or_else(|| user.username.clone()).unwrap_or_default(),
                    user.username.clone(),
                ),
            );
        }
        ctx
    }

    pub fn from_board(payload: &BoardPayload) -> Self {
        Self::from_included(&payload.included, Some(&payload.board))
    }

    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self {
            boards: workspace
                .boards
                .iter()
                .map(|(id, b)| (id.clone(), Named::new(&b.name, Some(b.project_name.clone()))))
                .collect(),
            lists: workspace
                .lists
                .iter()
                .map(|(id, l)| (id.clone(), Named::new(&l.name, Some(l.board_name.clone()))))
                .collect(),
            labels: workspace
                .labels
                .iter()
                .map(|(id, l)| (id.clone(), Named::new(&l.name, Some(l.color.clone()))))
                .collect(),
            users: workspace
                .users
                .iter()
                .map(|(id, u)| (id.clone(), Named::new(&u.name, u.username.clone())))
                .collect(),
        }
    }

    /// Fill entries missing from `self` with those of `other`.
    pub fn merge(mut self, other: Self) -> Self {
        fn fill(into: &mut HashMap<String, Named>, from: HashMap<String, Named>) {
            for (id, named) in from {
                into.entry(id).or_insert(named);
            }
        }
        fill(&mut self.boards, other.boards);
        fill(&mut self.lists, other.lists);
        fill(&mut self.labels, other.labels);
        fill(&mut self.users, other.users);
        self
    }
}

/// Reference to a related entity. Serializes as a bare id string at the
/// `minimal` tier and as an object otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(String),
    Named {
        id: String,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl EntityRef {
    pub fn resolve(
        id: &str,
        named: Option<&Named>,
        fallback: &str,
        context: ResponseContext,
    ) -> Self {
        let name = || named.map_or_else(|| fallback.to_string(), |n| n.name.clone());
        match context {
            ResponseContext::Minimal => Self::Id(id.to_string()),
            ResponseContext::Standard => Self::Named {
                id: id.to_string(),
                name: name(),
                detail: None,
            },
            ResponseContext::Full => Self::Named {
                id: id.to_string(),
                name: name(),
                detail: named.and_then(|n| n.extra.clone()),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Named { id, .. } => id,
        }
    }

    /// Name when resolved, otherwise the id.
    pub fn display(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Named { name, .. } => name,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Named { detail, .. } => detail.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewFields {
    pub id: String,
    pub name: String,
    pub list: Option<EntityRef>,
    pub labels: Vec<EntityRef>,
    pub due_date: Option<String>,
    pub task_progress: String,
    pub comment_count: usize,
    pub attachment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryFields {
    /// Truncated at the summary tier, complete at the detailed tier.
    pub description: Option<String>,
    pub members: Vec<EntityRef>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub name: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListView {
    pub id: String,
    pub name: String,
    pub tasks: Vec<TaskView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author: Option<EntityRef>,
    pub text: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedFields {
    pub board: Option<EntityRef>,
    pub position: Option<f64>,
    pub task_lists: Vec<TaskListView>,
    pub comments: Vec<CommentView>,
    pub attachments: Vec<AttachmentView>,
}

/// A card projected to one detail tier. Higher tiers only add fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub preview: PreviewFields,
    #[serde(flatten)]
    pub summary: Option<SummaryFields>,
    #[serde(flatten)]
    pub detailed: Option<DetailedFields>,
}

impl CardView {
    pub fn detail_level(&self) -> DetailLevel {
        match (&self.summary, &self.detailed) {
            (_, Some(_)) => DetailLevel::Detailed,
            (Some(_), None) => DetailLevel::Summary,
            (None, None) => DetailLevel::Preview,
        }
    }
}

/// `"<completed>/<total>"` across all task lists, `""` when there are none.
pub fn format_task_progress(task_lists: &[TaskListRecord]) -> String {
    let (completed, total) = task_lists
        .iter()
        .flat_map(|list| &list.tasks)
        .fold((0usize, 0usize), |(done, all), task| {
            (done + usize::from(task.is_completed), all + 1)
        });
    if total == 0 {
        String::new()
    } else {
        format!("{completed}/{total}")
    }
}

/// Keep the first `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Project a joined card record into a view. Pure and infallible.
pub fn shape_card(
    record: &CardRecord,
    detail: DetailLevel,
    context: ResponseContext,
    ctx: &ShapeContext,
) -> CardView {
    let card = &record.card;

    let preview = PreviewFields {
        id: card.id.clone(),
        name: record.name().to_string(),
        list: card
            .list_id
            .as_deref()
            .map(|id| EntityRef::resolve(id, ctx.lists.get(id), "Unknown List", context)),
        labels: record
            .label_ids
            .iter()
            .map(|id| EntityRef::resolve(id, ctx.labels.get(id), "Unknown Label", context))
            .collect(),
        due_date: card.due_date.clone(),
        task_progress: format_task_progress(&record.task_lists),
        comment_count: if record.comments.is_empty() {
            card.comments_total.unwrap_or(0) as usize
        } else {
            record.comments.len()
        },
        attachment_count: record.attachments.len(),
    };

    let summary = (detail >= DetailLevel::Summary).then(|| SummaryFields {
        description: card.description.as_deref().map(|text| {
            if detail == DetailLevel::Detailed {
                text.to_string()
            } else {
                truncate_text(text, DESCRIPTION_PREVIEW_CHARS)
            }
        }),
        members: record
            .member_ids
            .iter()
            .map(|id| EntityRef::resolve(id, ctx.users.get(id), "Unknown User", context))
            .collect(),
        created_at: card.created_at.clone(),
        updated_at: card.updated_at.clone(),
    });

    let detailed = (detail == DetailLevel::Detailed).then(|| DetailedFields {
        board: card
            .board_id
            .as_deref()
            .map(|id| EntityRef::resolve(id, ctx.boards.get(id), "Unknown Board", context)),
        position: card.position,
        task_lists: record
            .task_lists
            .iter()
            .map(|list| TaskListView {
                id: list.list.id.clone(),
                name: list.list.name.clone().unwrap_or_else(|| "Tasks".into()),
                tasks: list
                    .tasks
                    .iter()
                    .map(|task| TaskView {
                        id: task.id.clone(),
                        name: task.name.clone().unwrap_or_else(|| "Unnamed task".into()),
                        is_completed: task.is_completed,
                    })
                    .collect(),
            })
            .collect(),
        comments: record
            .comments
            .iter()
            .map(|comment| CommentView {
                id: comment.id.clone(),
                author: comment.user_id.as_deref().map(|id| {
                    EntityRef::resolve(id, ctx.users.get(id), "Unknown User", context)
                }),
                text: comment.text.clone().unwrap_or_default(),
                created_at: comment.created_at.clone(),
            })
            .collect(),
        attachments: record
            .attachments
            .iter()
            .map(|attachment| AttachmentView {
                id: attachment.id.clone(),
                name: attachment.name.clone().unwrap_or_else(|| "Unnamed".into()),
            })
            .collect(),
    });

    CardView {
        preview,
        summary,
        detailed,
    }
}
