//! Exa search client.
//!
//! Uses Exa's `search` endpoint with `type: "auto"` and inline text contents,
//! so one round-trip returns both the hits and their extracted text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{SearchClient, SearchDocument};
use crate::error::SearchError;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Exa web search client.
pub struct ExaClient {
    api_key: String,
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl ExaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    search_type: &'static str,
    num_results: usize,
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: ExaTextOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextOptions {
    max_characters: usize,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<SearchDocument>,
}

#[async_trait]
impl SearchClient for ExaClient {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
        max_chars: usize,
    ) -> Result<Vec<SearchDocument>, SearchError> {
        let request = ExaRequest {
            query,
            search_type: "auto",
            num_results,
            contents: ExaContents {
                text: ExaTextOptions {
                    max_characters: max_chars,
                },
            },
        };

        debug!(query = %query, num_results, max_chars, "Sending Exa search request");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(SearchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::from_status(status.as_u16(), body));
        }

        let parsed: ExaResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        info!(query = %query, count = parsed.results.len(), "Search completed");

        Ok(parsed.results)
    }

    fn name(&self) -> &str {
        "exa"
    }
}
