//! Error types for the hq-app dashboard layer.

use std::path::PathBuf;

use hq_api::ApiError;
use hq_viz::FetchError;

/// Application error type shared by the CLI and any other front end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("Scenario error: {0}")]
    Core(#[from] hq_core::CoreError),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Unknown panel: {0}")]
    UnknownPanel(String),

    #[error("Panel {panel} failed: {source}")]
    Panel {
        panel: &'static str,
        source: FetchError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hq-app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Map a backend error onto the cause a panel keeps in its failed state.
pub fn fetch_error(err: ApiError) -> FetchError {
    match err {
        ApiError::Io(e) => FetchError::transport(e.to_string()),
        ApiError::Json(e) => FetchError::decode(e.to_string()),
        ApiError::ScenarioNotFound { id } => FetchError::NotFound {
            what: format!("scenario {}", id),
        },
        ApiError::Core(e) => FetchError::decode(e.to_string()),
        ApiError::InvalidPath { message } => FetchError::transport(message),
    }
}
