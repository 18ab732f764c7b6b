//! Output size bounds: character budget enforcement and pagination.

use serde::Serialize;

/// Cap applied to every read tool's rendered output.
pub const RESPONSE_CHAR_LIMIT: usize = 25_000;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
    pub count: usize,
    pub total: usize,
    pub has_more: bool,
    pub next_offset: Option<usize>,
}

/// Slice `items[offset..offset + limit]`, clamped to the collection.
pub fn paginate<T>(items: &[T], offset: usize, limit: usize) -> (&[T], Page) {
    let total = items.len();
    let start = offset.min(total);
    let end = offset.saturating_add(limit).min(total);
    let window = &items[start..end];
    let has_more = offset.saturating_add(limit) < total;

    let page = Page {
        offset,
        limit,
        count: window.len(),
        total,
        has_more,
        next_offset: has_more.then(|| offset + limit),
    };
    (window, page)
}

/// Return `text` unchanged when it fits in `limit` characters. Otherwise
/// keep 60% of the limit, backing up to the last newline when that newline
/// lies in the final 20% of the kept span, and append a truncation warning.
pub fn enforce_budget(text: &str, limit: usize) -> String {
    let length = text.chars().count();
    if length <= limit {
        return text.to_string();
    }

    let keep_chars = limit * 6 / 10;
    let keep_bytes = text
        .char_indices()
        .nth(keep_chars)
        .map_or(text.len(), |(index, _)| index);
    let mut kept = &text[..keep_bytes];

    if let Some(newline) = kept.rfind('\n') {
        let newline_chars = kept[..newline].chars().count();
        if newline_chars * 10 > keep_chars * 8 {
            kept = &kept[..newline];
        }
    }

    format!("{kept}{}", truncation_warning(length, limit))
}

fn truncation_warning(length: usize, limit: usize) -> String {
    format!(
        "\n---\n\
         ⚠️ **RESPONSE TRUNCATED**: Output was {} characters (limit: {})\n\
         \n\
         **To see more results:**\n\
         - Use pagination: Increase `offset` parameter\n\
         - Add filters: Use `list_id` or `label_filter` to filter results\n\
         - Reduce detail: Use `detail_level=\"preview\"` instead of \"summary\" or \"detailed\"\n\
         ---\n",
        group_thousands(length),
        group_thousands(limit)
    )
}

/// `25000` -> `25,000`
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
