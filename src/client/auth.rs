//! Startup authentication: turn the configured credential form into a bearer token.

use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use super::error::{ApiError, ApiResult};
use super::http::PlankaClient;
use crate::config::{Config, Credentials};

/// Obtain the bearer credential used for every subsequent request.
///
/// Tokens and API keys are used as-is; email + password are exchanged once
/// via `POST /api/access-tokens`.
pub async fn obtain_token(config: &Config) -> ApiResult<String> {
    match &config.credentials {
        Credentials::Token(token) | Credentials::ApiKey(token) => Ok(token.clone()),
        Credentials::Password { email, password } => {
            info!(email = %email, "Exchanging email/password for an access token");

            let client = Client::builder().timeout(config.timeout).build()?;
            let response = client
                .post(format!("{}/api/access-tokens", config.base_url))
                .json(&json!({ "emailOrUsername": email, "password": password }))
                .send()
                .await?;

            let body = PlankaClient::handle_response(response).await?;
            extract_access_token(&body)
        }
    }
}

/// Planka returns either `{"item": "<token>"}` or `{"item": {"accessToken": "<token>"}}`.
pub(crate) fn extract_access_token(body: &Value) -> ApiResult<String> {
    let item = &body["item"];
    item.as_str()
        .or_else(|| item["accessToken"].as_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::InvalidResponse {
            message: "access token missing from /api/access-tokens response".to_string(),
        })
}
