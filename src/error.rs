//! Error handling

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    // Validation errors (message is shown to the user as-is)
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    // Record store errors (hosted backend)
    #[error("Record store error: {0}")]
    Store(String),

    // Local persistence errors
    #[error("Local storage error: {0}")]
    LocalStorage(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::LocalStorage(err.to_string())
    }
}
