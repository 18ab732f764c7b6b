//! Markdown rendering of shaped views.

use crate::shaper::budget::Page;
use crate::shaper::view::{CardView, DetailLevel, EntityRef};
use crate::workspace::Workspace;
use std::fmt::Write;

/// Disambiguation lists stop after this many entries.
pub const MAX_DISAMBIGUATION_ENTRIES: usize = 10;

const NO_CARDS: &str = "No cards found matching the criteria.";

fn describe(entity: &EntityRef) -> String {
    match entity.detail() {
        Some(detail) => format!("{} ({detail})", entity.display()),
        None => entity.display().to_string(),
    }
}

fn join_refs(refs: &[EntityRef], empty: &str) -> String {
    if refs.is_empty() {
        empty.to_string()
    } else {
        refs.iter().map(describe).collect::<Vec<_>>().join(", ")
    }
}

fn or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

fn list_name(view: &CardView) -> String {
    view.preview
        .list
        .as_ref()
        .map_or_else(|| "Unknown List".to_string(), describe)
}

fn task_progress(view: &CardView) -> &str {
    or(Some(view.preview.task_progress.as_str()), "None")
}

pub fn render_preview(view: &CardView) -> String {
    let p = &view.preview;
    format!(
        "- **{}** (ID: `{}`)\n  - List: {}\n  - Labels: {}\n  - Due: {}\n  - Tasks: {}\n  - Comments: {}\n  - Attachments: {}",
        p.name,
        p.id,
        list_name(view),
        join_refs(&p.labels, "None"),
        or(p.due_date.as_deref(), "No due date"),
        task_progress(view),
        p.comment_count,
        p.attachment_count,
    )
}

pub fn render_summary(view: &CardView) -> String {
    let p = &view.preview;
    let mut out = format!(
        "### {}\n**ID**: `{}`\n**List**: {}\n**Labels**: {}\n",
        p.name,
        p.id,
        list_name(view),
        join_refs(&p.labels, "None"),
    );

    let (members, created, updated, description) = match &view.summary {
        Some(s) => (
            join_refs(&s.members, "None"),
            s.created_at.as_deref(),
            s.updated_at.as_deref(),
            s.description.as_deref(),
        ),
        None => ("None".to_string(), None, None, None),
    };

    let _ = write!(
        out,
        "**Members**: {members}\n**Due Date**: {}\n**Created**: {}\n**Updated**: {}\n**Tasks**: {}\n**Comments**: {}\n**Attachments**: {}\n\n**Description**: {}\n",
        or(p.due_date.as_deref(), "No due date"),
        or(created, "Unknown"),
        or(updated, "Unknown"),
        task_progress(view),
        p.comment_count,
        p.attachment_count,
        or(description, "(No description)"),
    );
    out
}

/// Full single-card rendering. Sections missing from lower-tier views are
/// rendered as empty.
pub fn render_card_detailed(view: &CardView) -> String {
    let p = &view.preview;
    let summary = view.summary.as_ref();
    let detailed = view.detailed.as_ref();

    let mut out = format!("# {}\n\n**ID**: `{}`\n", p.name, p.id);
    match &p.list {
        Some(list) => {
            let _ = writeln!(out, "**List**: {} (ID: `{}`)", describe(list), list.id());
        }
        None => out.push_str("**List**: Unknown List\n"),
    }
    let board = detailed
        .and_then(|d| d.board.as_ref())
        .map_or_else(|| "Unknown Board".to_string(), describe);
    let _ = writeln!(out, "**Board**: {board}");

    let position = detailed
        .and_then(|d| d.position)
        .map_or_else(|| "N/A".to_string(), |pos| pos.to_string());
    let _ = write!(
        out,
        "\n## Details\n- **Due Date**: {}\n- **Created**: {}\n- **Updated**: {}\n- **Position**: {position}\n",
        or(p.due_date.as_deref(), "No due date"),
        or(summary.and_then(|s| s.created_at.as_deref()), "Unknown"),
        or(summary.and_then(|s| s.updated_at.as_deref()), "Unknown"),
    );

    let members = summary.map_or(&[][..], |s| s.members.as_slice());
    let _ = write!(
        out,
        "\n## Members\n{}\n\n## Labels\n{}\n\n## Description\n{}\n",
        join_refs(members, "(No members assigned)"),
        join_refs(&p.labels, "(No labels)"),
        or(summary.and_then(|s| s.description.as_deref()), "(No description)"),
    );

    match p.task_progress.as_str() {
        "" => out.push_str("\n## Tasks\n"),
        progress => {
            let _ = writeln!(out, "\n## Tasks ({progress})");
        }
    }
    let task_lists = detailed.map_or(&[][..], |d| d.task_lists.as_slice());
    if task_lists.iter().all(|list| list.tasks.is_empty()) {
        out.push_str("(No tasks)\n");
    } else {
        for list in task_lists {
            let _ = writeln!(out, "\n**{}**:", list.name);
            for task in &list.tasks {
                let check = if task.is_completed { "[x]" } else { "[ ]" };
                let _ = writeln!(out, "- {check} {} (ID: `{}`)", task.name, task.id);
            }
        }
    }

    out.push_str("\n## Comments\n");
    let comments = detailed.map_or(&[][..], |d| d.comments.as_slice());
    if comments.is_empty() {
        out.push_str("(No comments)\n");
    }
    for comment in comments {
        let author = comment
            .author
            .as_ref()
            .map_or_else(|| "Unknown User".to_string(), describe);
        let _ = writeln!(
            out,
            "- **{author}** ({}): {}",
            or(comment.created_at.as_deref(), "Unknown"),
            comment.text
        );
    }

    out.push_str("\n## Attachments\n");
    let attachments = detailed.map_or(&[][..], |d| d.attachments.as_slice());
    if attachments.is_empty() {
        out.push_str("(No attachments)\n");
    }
    for attachment in attachments {
        let _ = writeln!(out, "- {} (ID: `{}`)", attachment.name, attachment.id);
    }

    out
}

/// A page of cards with a count header and, when more remain, a hint with
/// the next offset.
pub fn render_cards(views: &[CardView], page: &Page) -> String {
    if views.is_empty() {
        return NO_CARDS.to_string();
    }

    let mut out = format!("# Cards ({} found)\n\n", views.len());
    for view in views {
        let _ = match view.detail_level() {
            DetailLevel::Preview => writeln!(out, "{}\n", render_preview(view)),
            DetailLevel::Summary => writeln!(out, "{}", render_summary(view)),
            DetailLevel::Detailed => writeln!(out, "{}\n---\n", render_card_detailed(view)),
        };
    }
    let mut out = out.trim_end().to_string();

    if let Some(next) = page.next_offset {
        let _ = write!(
            out,
            "\n\n---\n**Pagination**: Showing {} of {} cards (offset {}). Use offset={next} to see more.\n",
            page.count, page.total, page.offset
        );
    }
    out
}

/// Candidate list shown when a search matches more than one card.
/// Each entry pairs the owning board's name with a preview view.
pub fn render_disambiguation(matches: &[(String, CardView)]) -> String {
    let mut out = format!("# Found {} matching cards\n\n", matches.len());
    for (board, view) in matches.iter().take(MAX_DISAMBIGUATION_ENTRIES) {
        let _ = write!(
            out,
            "- **{}** (ID: `{}`)\n  - Board: {board}\n  - List: {}\n\n",
            view.preview.name,
            view.preview.id,
            list_name(view),
        );
    }
    if matches.len() > MAX_DISAMBIGUATION_ENTRIES {
        let _ = writeln!(
            out,
            "... and {} more cards.",
            matches.len() - MAX_DISAMBIGUATION_ENTRIES
        );
    }
    out.push_str("\n**Use planka_get_card with a specific card ID to see full details.**");
    out
}

pub fn render_workspace(workspace: &Workspace) -> String {
    let mut out = String::from("# Planka Workspace\n\n## Projects\n");
    for project in &workspace.projects {
        let _ = writeln!(out, "- **{}** (ID: `{}`)", project.name, project.id);
    }

    out.push_str("\n## Boards\n");
    for board in workspace.boards.values() {
        let _ = writeln!(
            out,
            "- **{}** (ID: `{}`, Project: {})",
            board.name, board.id, board.project_name
        );
    }

    out.push_str("\n## Lists\n");
    for list in workspace.lists.values() {
        let _ = writeln!(
            out,
            "- **{}** (ID: `{}`, Board: {})",
            list.name, list.id, list.board_name
        );
    }

    out.push_str("\n## Labels\n");
    for label in workspace.labels.values() {
        let _ = writeln!(
            out,
            "- **{}** (Color: {}, ID: `{}`, Board: {})",
            label.name, label.color, label.id, label.board_name
        );
    }

    out.push_str("\n## Users\n");
    for user in workspace.users.values() {
        match &user.username {
            Some(username) => {
                let _ = writeln!(out, "- **{}** (@{username}, ID: `{}`)", user.name, user.id);
            }
            None => {
                let _ = writeln!(out, "- **{}** (ID: `{}`)", user.name, user.id);
            }
        }
    }
    out
}
