// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (what to scrape, what to prompt for) lives in domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BasePageFetcher)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a user prompt under a system instruction (returns raw text response)
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

// =============================================================================
// Web Search Trait (Infrastructure)
// =============================================================================

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
}

#[async_trait]
pub trait BaseSearchService: Send + Sync {
    /// Search the web, returning at most `max_results` hits ordered by relevance
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// =============================================================================
// Page Fetcher Trait (Infrastructure - HTTP GET of raw HTML)
// =============================================================================

/// Raw HTML returned by a fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub html: String,
}

#[async_trait]
pub trait BasePageFetcher: Send + Sync {
    /// Fetch a page; network errors, timeouts and non-2xx statuses are errors
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// =============================================================================
// Page Sink Trait (Infrastructure - where accepted pages go)
// =============================================================================

use crate::domains::policies::models::ScrapedPage;

#[async_trait]
pub trait BasePageSink: Send + Sync {
    /// Persist one accepted page (upsert by identifier)
    async fn store(&self, page: &ScrapedPage) -> Result<()>;
}
