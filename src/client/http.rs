use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::auth;
use super::error::{ApiError, ApiResult};
use super::gateway::PlankaApi;
use crate::config::Config;

/// HTTP client for the Planka REST API.
///
/// Holds a bearer credential obtained once at startup; every request carries
/// it along with the configured timeout.
pub struct PlankaClient {
    base_url: String,
    client: Client,
}

impl PlankaClient {
    /// Create a client from an already obtained bearer token.
    pub fn new(base_url: impl Into<String>, token: &str, timeout: Duration) -> ApiResult<Self> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Authentication)?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Authenticate with the configured credential form and build a client.
    pub async fn connect(config: &Config) -> ApiResult<Self> {
        let token = auth::obtain_token(config).await?;
        Self::new(config.base_url.clone(), &token, config.timeout)
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response with standardized error handling
    ///
    /// Success bodies are parsed as JSON (`204` and empty bodies become `{}`);
    /// non-success statuses are classified into [`ApiError`].
    pub async fn handle_response(response: Response) -> ApiResult<Value> {
        let status = response.status();

        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(json!({}));
            }
            let body = response.text().await?;
            if body.trim().is_empty() {
                return Ok(json!({}));
            }
            Ok(serde_json::from_str(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::from_status(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl PlankaApi for PlankaClient {
    async fn get(&self, endpoint: &str) -> ApiResult<Value> {
        debug!(endpoint, "GET");
        self.send(self.client.get(self.url(endpoint))).await
    }

    async fn post(&self, endpoint: &str, body: Value) -> ApiResult<Value> {
        debug!(endpoint, "POST");
        self.send(self.client.post(self.url(endpoint)).json(&body))
            .await
    }

    async fn patch(&self, endpoint: &str, body: Value) -> ApiResult<Value> {
        debug!(endpoint, "PATCH");
        self.send(self.client.patch(self.url(endpoint)).json(&body))
            .await
    }

    async fn delete(&self, endpoint: &str) -> ApiResult<Value> {
        debug!(endpoint, "DELETE");
        self.send(self.client.delete(self.url(endpoint))).await
    }
}
