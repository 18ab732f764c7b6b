//! Remote API gateway for the Planka kanban service.
//!
//! - `gateway`: the [`PlankaApi`] trait handlers depend on (mockable)
//! - `http`: reqwest-backed implementation
//! - `auth`: one-time credential exchange at startup
//! - `error`: classified failures and their user-facing messages

mod auth;
mod error;
mod gateway;
mod http;


pub use auth::obtain_token;
pub use error::{ApiError, ApiResult};
#[cfg(test)]
pub use gateway::MockPlankaApi;
pub use gateway::PlankaApi;
pub use http::PlankaClient;
