use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fetch::FetchError;

/// Failures of the key-value persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("quota exceeded writing {key}: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
    #[error("storage io error on {key}: {source}")]
    Io {
        key: String,
        source: std::io::Error,
    },
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Application-level error taxonomy.
///
/// `Validation` and `NotFound` are recovered inside action handlers and shown
/// as notifications. `Storage` is logged and never blocks a render.
/// `FetchFailed` and `RateLimited` end up in the retryable error view.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("fetch failed: {message}")]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("rate limited until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Errors the user caused and can fix without retrying.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::RateLimited { .. })
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Failed(failure) => AppError::FetchFailed {
                status: failure.status(),
                message: failure.to_string(),
            },
            FetchError::RateLimited { reset_at } => AppError::RateLimited { reset_at },
        }
    }
}

/// UI-facing error record kept in the store's transient flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    pub retryable: bool,
}

impl ErrorInfo {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }
}
