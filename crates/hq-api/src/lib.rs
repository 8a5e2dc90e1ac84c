//! hq-api: backend contract and wire types for the dashboard.

pub mod client;
pub mod fixtures;
pub mod types;

pub use client::DashboardApi;
pub use fixtures::{FixtureBackend, RequestCounts};
pub use types::*;

use hq_core::{CoreError, ScenarioId};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scenario not found: {id}")]
    ScenarioNotFound { id: ScenarioId },

    #[error("Invalid scenario record: {0}")]
    Core(#[from] CoreError),

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
