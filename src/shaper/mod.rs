//! Detail shaping: raw Planka payloads to bounded, tiered text.
//!
//! - `raw`: lenient decoding and joining of normalized API payloads
//! - `view`: detail/context tiers and the typed card view
//! - `markdown`: human-readable rendering
//! - `budget`: character budget and pagination

pub mod budget;
pub mod markdown;
pub mod raw;
pub mod view;


use serde::Serialize;

pub use budget::{Page, RESPONSE_CHAR_LIMIT, enforce_budget, paginate};
pub use raw::{BoardPayload, CardPayload, CardRecord};
pub use view::{
    CardView, DetailLevel, EntityRef, ResponseContext, ResponseFormat, ShapeContext,
    format_task_progress, shape_card,
};

/// Pretty JSON for a tool response.
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| format!("Error: Failed to encode response: {err}"))
}
