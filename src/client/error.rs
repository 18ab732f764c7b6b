//! Remote API error types.
//!
//! Every failure of the Planka gateway is classified into one of these
//! variants. Tool handlers never surface them as protocol faults; they call
//! [`ApiError::user_message`] and return the text to the agent.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Authentication failed (HTTP 401)")]
    #[diagnostic(
        code(planka_mcp::client::authentication),
        help("Check PLANKA_API_TOKEN, PLANKA_API_KEY or PLANKA_EMAIL/PLANKA_PASSWORD.")
    )]
    Authentication,

    #[error("Permission denied (HTTP 403)")]
    #[diagnostic(code(planka_mcp::client::permission))]
    Permission,

    #[error("Resource not found (HTTP 404)")]
    #[diagnostic(code(planka_mcp::client::not_found))]
    NotFound,

    #[error("Rate limit exceeded (HTTP 429)")]
    #[diagnostic(code(planka_mcp::client::rate_limited))]
    RateLimited,

    #[error("API request failed (HTTP {status}): {message}")]
    #[diagnostic(code(planka_mcp::client::http))]
    Http { status: u16, message: String },

    #[error("Request to Planka timed out")]
    #[diagnostic(
        code(planka_mcp::client::timeout),
        help("Increase PLANKA_TIMEOUT_SECS or check server load.")
    )]
    Timeout,

    #[error("Failed to connect to Planka server")]
    #[diagnostic(
        code(planka_mcp::client::connect),
        help("Is PLANKA_BASE_URL correct and the server reachable?")
    )]
    Connect {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from Planka server: {message}")]
    #[diagnostic(code(planka_mcp::client::invalid_response))]
    InvalidResponse { message: String },
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => ApiError::Authentication,
            403 => ApiError::Permission,
            404 => ApiError::NotFound,
            429 => ApiError::RateLimited,
            _ => ApiError::Http {
                status,
                message: message.into(),
            },
        }
    }

    /// Short, actionable message returned to the agent in place of a fault.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authentication => "Error: Invalid API credentials. Check PLANKA_API_TOKEN, \
                 PLANKA_API_KEY or PLANKA_EMAIL/PLANKA_PASSWORD."
                .to_string(),
            ApiError::Permission => "Error: You don't have permission to access this resource. \
                 You may need board membership."
                .to_string(),
            ApiError::NotFound => "Error: Resource not found. Check that the ID is correct and \
                 the resource exists."
                .to_string(),
            ApiError::RateLimited => {
                "Error: Rate limit exceeded. Wait a moment before trying again.".to_string()
            }
            ApiError::Http { status, .. } => {
                format!("Error: API request failed (HTTP {}). Please try again.", status)
            }
            ApiError::Timeout => "Error: Request timed out. The Planka server may be slow or \
                 unreachable; try again shortly."
                .to_string(),
            ApiError::Connect { .. } => {
                "Error: Cannot connect to Planka server. Check PLANKA_BASE_URL.".to_string()
            }
            ApiError::InvalidResponse { message } => {
                format!("Error: Unexpected response from Planka server: {}", message)
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Connect { source: e }
        } else if let Some(status) = e.status() {
            ApiError::from_status(status.as_u16(), e.to_string())
        } else {
            ApiError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
