//! # Error Types
//!
//! Typed errors for the two external collaborators (LLM and search) and for the
//! interactive session. The research stages never propagate `LlmError` or
//! `SearchError`: they degrade to empty results and record what went wrong.

use thiserror::Error;

/// Errors from a text-generation provider.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check the LLM API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider returned no choices")]
    EmptyResponse,

    #[error("Provider error: {0}")]
    Provider(String),
}

impl LlmError {
    /// Map a transport failure from reqwest onto a typed variant.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_connect() {
            LlmError::Connection(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => LlmError::Unauthorized,
            429 => LlmError::RateLimited,
            500..=599 => LlmError::ServerError(status, body),
            _ => LlmError::HttpError(status, body),
        }
    }
}

/// Errors from a web-search provider.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check the search API key")]
    Unauthorized,

    #[error("Rate limited by search provider, please wait")]
    RateLimited,

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl SearchError {
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Connection(e.to_string())
        } else {
            SearchError::Network(e.to_string())
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => SearchError::Unauthorized,
            429 => SearchError::RateLimited,
            500..=599 => SearchError::ServerError(status, body),
            _ => SearchError::HttpError(status, body),
        }
    }
}

/// Errors surfaced by the interactive session.
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A research turn aborted unexpectedly. The session reports it and keeps going.
    #[error("Research turn failed: {0}")]
    TurnFailed(String),
}
