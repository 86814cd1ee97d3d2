//! # Search Module
//!
//! Web search and content retrieval behind the [`SearchClient`] trait, plus the
//! Source Filter that turns raw documents into bounded [`Source`] records.
//!
//! [`Source`]: crate::research::Source

pub mod exa;
pub mod filter;

pub use exa::ExaClient;
pub use filter::{filter_sources, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// A candidate document returned by a search provider.
///
/// Providers may omit the title or the extracted text; the Source Filter
/// decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl SearchDocument {
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: url.into(),
            text: Some(text.into()),
        }
    }
}

/// Sends a query to a web-search/content-retrieval service.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Return up to `num_results` documents, each with at most `max_chars`
    /// characters of text.
    async fn search(
        &self,
        query: &str,
        num_results: usize,
        max_chars: usize,
    ) -> Result<Vec<SearchDocument>, SearchError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
