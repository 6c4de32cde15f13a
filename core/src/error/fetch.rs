use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailureKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl FetchFailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network, HTTP status or JSON decode failure from a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    kind: FetchFailureKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
}

impl FetchFailure {
    pub fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            url: None,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FetchFailureKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            FetchFailureKind::Timeout
        } else if err.is_connect() {
            FetchFailureKind::Connect
        } else if err.is_request() {
            FetchFailureKind::Request
        } else if err.is_body() {
            FetchFailureKind::Body
        } else if err.is_decode() {
            FetchFailureKind::Decode
        } else {
            FetchFailureKind::Unknown
        };
        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: Some(url),
            message: err.to_string(),
        }
    }

    pub fn status_error(status: u16, url: String, preview: String) -> Self {
        Self {
            kind: FetchFailureKind::Status,
            status: Some(status),
            url: Some(url),
            message: preview,
        }
    }

    pub fn decode_error(status: u16, url: String, detail: impl fmt::Display, preview: String) -> Self {
        Self {
            kind: FetchFailureKind::Decode,
            status: Some(status),
            url: Some(url),
            message: format!("failed to decode response body: {} | body={}", detail, preview),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Discriminated failure returned by every data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("fetch failed {0}")]
    Failed(FetchFailure),
    #[error("rate limited until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },
}

impl From<FetchFailure> for FetchError {
    fn from(failure: FetchFailure) -> Self {
        FetchError::Failed(failure)
    }
}
