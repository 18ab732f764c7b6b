//! Gateway abstraction over the Planka REST API.
//!
//! Handlers depend on this trait rather than on the HTTP client so they can
//! be exercised against a mock in tests.

use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiResult;

#[cfg(test)]
use mockall::automock;

/// Authenticated access to `<base>/api/<endpoint>`.
///
/// Payloads stay loosely typed at this boundary; the shaper converts them to
/// view models.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlankaApi: Send + Sync + 'static {
    /// GET an endpoint and return the parsed JSON body.
    async fn get(&self, endpoint: &str) -> ApiResult<Value>;

    /// POST a JSON body.
    async fn post(&self, endpoint: &str, body: Value) -> ApiResult<Value>;

    /// PATCH a JSON body.
    async fn patch(&self, endpoint: &str, body: Value) -> ApiResult<Value>;

    /// DELETE an endpoint. An empty response yields `{}`.
    async fn delete(&self, endpoint: &str) -> ApiResult<Value>;
}
