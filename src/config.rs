//! Runtime configuration sourced from the environment.
//!
//! Precedence: CLI flag (via the `with_*` builders) > environment variable > default.

use miette::Diagnostic;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const BASE_URL_VAR: &str = "PLANKA_BASE_URL";
pub const API_TOKEN_VAR: &str = "PLANKA_API_TOKEN";
pub const API_KEY_VAR: &str = "PLANKA_API_KEY";
pub const EMAIL_VAR: &str = "PLANKA_EMAIL";
pub const PASSWORD_VAR: &str = "PLANKA_PASSWORD";
pub const TIMEOUT_VAR: &str = "PLANKA_TIMEOUT_SECS";

/// Default per-request timeout against the Planka server.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PLANKA_BASE_URL is not set")]
    #[diagnostic(
        code(planka_mcp::config::missing_base_url),
        help("Set PLANKA_BASE_URL (e.g. https://planka.example.com) or pass --base-url.")
    )]
    MissingBaseUrl,

    #[error("No authentication method configured")]
    #[diagnostic(
        code(planka_mcp::config::missing_credentials),
        help("Set one of: PLANKA_API_TOKEN, PLANKA_API_KEY, or PLANKA_EMAIL + PLANKA_PASSWORD.")
    )]
    MissingCredentials,

    #[error("Invalid PLANKA_TIMEOUT_SECS value '{value}'")]
    #[diagnostic(
        code(planka_mcp::config::invalid_timeout),
        help("Use a positive whole number of seconds.")
    )]
    InvalidTimeout { value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// One of the three supported credential forms.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Existing bearer access token.
    Token(String),
    /// API key, presented as a bearer token.
    ApiKey(String),
    /// Exchanged for an access token once at startup.
    Password { email: String, password: String },
}

impl Credentials {
    /// Human-readable name of the credential form, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Token(_) => "access token",
            Credentials::ApiKey(_) => "API key",
            Credentials::Password { .. } => "email/password",
        }
    }

    /// Resolve credentials from the environment: token, then API key, then email + password.
    pub fn from_env() -> ConfigResult<Self> {
        if let Some(token) = read_var(API_TOKEN_VAR) {
            return Ok(Credentials::Token(token));
        }
        if let Some(key) = read_var(API_KEY_VAR) {
            return Ok(Credentials::ApiKey(key));
        }
        match (read_var(EMAIL_VAR), read_var(PASSWORD_VAR)) {
            (Some(email), Some(password)) => Ok(Credentials::Password { email, password }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }
}

// Secrets never reach logs or panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Connection settings for the Planka gateway.
#[derive(Debug, Clone)]
pub struct Config {
    /// Service root without trailing slash, e.g. `https://planka.example.com`.
    pub base_url: String,
    pub credentials: Credentials,
    /// Applied to every outbound request.
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build configuration from `PLANKA_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_with_base_url(None)
    }

    /// Like [`Config::from_env`], with `base_url` taking precedence over
    /// `PLANKA_BASE_URL` when given.
    pub fn from_env_with_base_url(base_url: Option<String>) -> ConfigResult<Self> {
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| read_var(BASE_URL_VAR))
            .ok_or(ConfigError::MissingBaseUrl)?;
        let credentials = Credentials::from_env()?;

        let timeout = match read_var(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(base_url, credentials).with_timeout(timeout))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read an environment variable, treating blank values as unset.
fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> ConfigResult<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
