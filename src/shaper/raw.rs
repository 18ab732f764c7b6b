//! Lenient decoding of Planka's JSON payloads.
//!
//! Planka answers with `{ "item": ..., "included": { ... } }` where related
//! records are normalized into flat collections linked by id. Everything here
//! defaults missing fields so malformed payloads degrade instead of failing.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProject {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBoard {
    pub id: String,
    pub name: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawList {
    pub id: String,
    pub name: Option<String>,
    pub board_id: Option<String>,
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLabel {
    pub id: String,
    pub name: Option<String>,
    pub color: Option<String>,
    pub board_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUser {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCard {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub list_id: Option<String>,
    pub board_id: Option<String>,
    pub due_date: Option<String>,
    pub position: Option<f64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub comments_total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCardLabel {
    pub card_id: String,
    pub label_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCardMembership {
    pub card_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTaskList {
    pub id: String,
    pub card_id: Option<String>,
    pub name: Option<String>,
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTask {
    pub id: String,
    pub task_list_id: Option<String>,
    pub card_id: Option<String>,
    pub name: Option<String>,
    pub is_completed: bool,
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawComment {
    pub id: String,
    pub card_id: Option<String>,
    pub user_id: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttachment {
    pub id: String,
    pub card_id: Option<String>,
    pub name: Option<String>,
}

/// The `included` side-collections of any Planka response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIncluded {
    pub boards: Vec<RawBoard>,
    pub lists: Vec<RawList>,
    pub labels: Vec<RawLabel>,
    pub users: Vec<RawUser>,
    pub cards: Vec<RawCard>,
    pub card_labels: Vec<RawCardLabel>,
    pub card_memberships: Vec<RawCardMembership>,
    pub task_lists: Vec<RawTaskList>,
    pub tasks: Vec<RawTask>,
    pub comments: Vec<RawComment>,
    pub attachments: Vec<RawAttachment>,
}

/// `{ "item": T, "included": {...} }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEnvelope<T: Default> {
    pub item: T,
    pub included: RawIncluded,
}

/// `{ "items": [T] }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItems<T> {
    pub items: Vec<T>,
}

/// Decode without cloning the value; on a shape mismatch log and fall back
/// to the default (empty) record.
pub fn decode<T>(value: &Value, what: &str) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    T::deserialize(value).unwrap_or_else(|err| {
        warn!(payload = what, error = %err, "malformed payload, using empty record");
        T::default()
    })
}

/// A task list with its tasks folded in, ordered by position.
#[derive(Debug, Clone, Default)]
pub struct TaskListRecord {
    pub list: RawTaskList,
    pub tasks: Vec<RawTask>,
}

/// A card with every related record the views need, already joined.
#[derive(Debug, Clone, Default)]
pub struct CardRecord {
    pub card: RawCard,
    pub label_ids: Vec<String>,
    pub member_ids: Vec<String>,
    pub task_lists: Vec<TaskListRecord>,
    pub comments: Vec<RawComment>,
    pub attachments: Vec<RawAttachment>,
}

impl CardRecord {
    pub fn name(&self) -> &str {
        self.card.name.as_deref().unwrap_or("Untitled")
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches(&self, needle_lower: &str) -> bool {
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(needle_lower))
        };
        hit(&self.card.name) || hit(&self.card.description)
    }

    pub fn has_task(&self, task_id: &str) -> bool {
        self.task_lists
            .iter()
            .any(|list| list.tasks.iter().any(|task| task.id == task_id))
    }
}

fn by_position(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
}

/// Join the normalized `included` collections back onto each card.
pub fn join_cards(cards: Vec<RawCard>, included: &RawIncluded) -> Vec<CardRecord> {
    let mut labels: HashMap<&str, Vec<String>> = HashMap::new();
    for link in &included.card_labels {
        labels
            .entry(link.card_id.as_str())
            .or_default()
            .push(link.label_id.clone());
    }

    let mut members: HashMap<&str, Vec<String>> = HashMap::new();
    for link in &included.card_memberships {
        members
            .entry(link.card_id.as_str())
            .or_default()
            .push(link.user_id.clone());
    }

    let mut tasks: HashMap<&str, Vec<RawTask>> = HashMap::new();
    for task in &included.tasks {
        if let Some(list_id) = task.task_list_id.as_deref() {
            tasks.entry(list_id).or_default().push(task.clone());
        }
    }

    cards
        .into_iter()
        .map(|card| {
            let id = card.id.as_str();

            let mut task_lists: Vec<TaskListRecord> = included
                .task_lists
                .iter()
                .filter(|list| list.card_id.as_deref() == Some(id))
                .map(|list| {
                    let mut list_tasks = tasks.get(list.id.as_str()).cloned().unwrap_or_default();
                    list_tasks.sort_by(|a, b| by_position(a.position, b.position));
                    TaskListRecord {
                        list: list.clone(),
                        tasks: list_tasks,
                    }
                })
                .collect();
            task_lists.sort_by(|a, b| by_position(a.list.position, b.list.position));

            CardRecord {
                label_ids: labels.get(id).cloned().unwrap_or_default(),
                member_ids: members.get(id).cloned().unwrap_or_default(),
                comments: included
                    .comments
                    .iter()
                    .filter(|c| c.card_id.as_deref() == Some(id))
                    .cloned()
                    .collect(),
                attachments: included
                    .attachments
                    .iter()
                    .filter(|a| a.card_id.as_deref() == Some(id))
                    .cloned()
                    .collect(),
                task_lists,
                card,
            }
        })
        .collect()
}

/// Decoded `GET boards/{id}` response.
#[derive(Debug, Clone, Default)]
pub struct BoardPayload {
    pub board: RawBoard,
    pub cards: Vec<CardRecord>,
    pub included: RawIncluded,
}

impl BoardPayload {
    pub fn from_value(value: &Value) -> Self {
        let mut envelope: RawEnvelope<RawBoard> = decode(value, "board");
        let cards = std::mem::take(&mut envelope.included.cards);
        let cards = join_cards(cards, &envelope.included);
        Self {
            board: envelope.item,
            cards,
            included: envelope.included,
        }
    }
}

/// Decoded `GET cards/{id}` response.
#[derive(Debug, Clone, Default)]
pub struct CardPayload {
    pub record: CardRecord,
    pub included: RawIncluded,
}

impl CardPayload {
    pub fn from_value(value: &Value) -> Self {
        let envelope: RawEnvelope<RawCard> = decode(value, "card");
        let record = join_cards(vec![envelope.item], &envelope.included)
            .pop()
            .unwrap_or_default();
        Self {
            record,
            included: envelope.included,
        }
    }
}
