//! Input checks run before any cache or network access.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use miette::Diagnostic;
use rmcp::ErrorData as McpError;
use serde_json::json;
use thiserror::Error;

pub const ID_MAX: usize = 100;
pub const NAME_MAX: usize = 500;
pub const DESCRIPTION_MAX: usize = 10_000;
pub const QUERY_MAX: usize = 200;
pub const TASK_LIST_NAME_MAX: usize = 100;
pub const FILTER_MAX: usize = 100;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("Invalid `{field}`: {message}")]
#[diagnostic(code(planka_mcp::mcp::validation))]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for McpError {
    fn from(err: ValidationError) -> Self {
        McpError::invalid_params(
            err.to_string(),
            Some(json!({"field": err.field, "error": err.message})),
        )
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_length(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Trimmed, non-empty, at most `max` characters.
pub fn required(field: &'static str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    check_length(field, value, max)?;
    Ok(value.to_string())
}

/// Trimmed and length-checked. An empty string is kept (it clears a field).
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    value
        .map(|raw| {
            let value = raw.trim();
            check_length(field, value, max).map(|()| value.to_string())
        })
        .transpose()
}

/// Like [`optional`] but a blank value means "not given".
pub fn optional_filter(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    Ok(optional(field, value, max)?.filter(|value| !value.is_empty()))
}

/// Accept RFC 3339 timestamps or plain `YYYY-MM-DD` dates; normalize to UTC
/// with millisecond precision as Planka stores them.
pub fn due_date(field: &'static str, value: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(raw) = value.map(str::trim) else {
        return Ok(None);
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        })
        .map_err(|_| {
            ValidationError::new(
                field,
                format!("'{raw}' is not an ISO 8601 date (e.g. 2026-01-31 or 2026-01-31T12:00:00Z)"),
            )
        })?;

    Ok(Some(parsed.to_rfc3339_opts(SecondsFormat::Millis, true)))
}

pub fn in_range(
    field: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> ValidationResult<usize> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

pub fn position(field: &'static str, value: Option<f64>) -> ValidationResult<Option<f64>> {
    match value {
        Some(pos) if !pos.is_finite() || pos < 0.0 => Err(ValidationError::new(
            field,
            "must be a non-negative number",
        )),
        other => Ok(other),
    }
}
