//! Web search backing the `/api/ask` fallback
//!
//! Queries arrive already scoped with `site:` by the answer service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{BaseSearchService, SearchResult};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Search client holding one API key and a pooled HTTP client
pub struct TavilyClient {
    api_key: String,
    client: reqwest::Client,
}

/// Only the cheap depth is used; snippets are enough for answer context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
enum SearchDepth {
    Basic,
}

/// Body of `POST /search`
#[derive(Debug, Serialize)]
struct TavilyRequest {
    api_key: String,
    query: String,
    search_depth: SearchDepth,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

/// One hit; older responses omit `score`
#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    #[serde(default)]
    score: f64,
}

impl TavilyClient {
    /// Fails only if the HTTP client cannot be built
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }
}

impl From<TavilyResult> for SearchResult {
    fn from(hit: TavilyResult) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            content: hit.content,
            score: hit.score,
        }
    }
}

#[async_trait]
impl BaseSearchService for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = TavilyRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            search_depth: SearchDepth::Basic,
            max_results,
        };

        tracing::debug!(query = %query, max_results, "Searching the web");

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&request)
            .send()
            .await
            .context("Web search request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Search API returned {}: {}", status, body);
        }

        let body: TavilyResponse = response
            .json()
            .await
            .context("Unreadable search response")?;

        let results = body
            .results
            .into_iter()
            .take(max_results)
            .map(SearchResult::from)
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = TavilyRequest {
            api_key: "tvly-test".to_string(),
            query: "site:example.edu parking permits".to_string(),
            search_depth: SearchDepth::Basic,
            max_results: 5,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["search_depth"], "basic");
        assert_eq!(json["max_results"], 5);
    }

    #[test]
    fn test_response_tolerates_missing_score() {
        let response: TavilyResponse = serde_json::from_str(
            r#"{"results": [{"title": "Parking", "url": "https://example.edu/parking", "content": "Permits..."}]}"#,
        )
        .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].score, 0.0);
    }

    #[test]
    fn test_hit_maps_to_search_result() {
        let hit = TavilyResult {
            title: "Parking".to_string(),
            url: "https://example.edu/parking".to_string(),
            content: "Permits are required.".to_string(),
            score: 0.7,
        };

        let result = SearchResult::from(hit);
        assert_eq!(result.url, "https://example.edu/parking");
        assert_eq!(result.score, 0.7);
    }
}
