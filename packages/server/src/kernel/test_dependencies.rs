// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    AnswerSettings, BaseAI, BasePageFetcher, BasePageSink, BaseSearchService, FetchedPage,
    SearchResult, ServerDeps,
};
use crate::domains::policies::models::ScrapedPage;

// =============================================================================
// Mock Page Fetcher
// =============================================================================

/// Serves canned HTML by URL; unknown URLs fail like a 404
pub struct MockPageFetcher {
    pages: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error.to_string()));
        self
    }

    /// URLs fetched, in call order
    pub fn fetch_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());

        match self.pages.lock().unwrap().get(url) {
            Some(Ok(html)) => Ok(FetchedPage {
                url: url.to_string(),
                html: html.clone(),
            }),
            Some(Err(error)) => Err(anyhow!(error.clone())),
            None => Err(anyhow!("HTTP 404 Not Found for {}", url)),
        }
    }
}

// =============================================================================
// Mock AI
// =============================================================================

/// One recorded completion request
#[derive(Debug, Clone)]
pub struct AICall {
    pub system_prompt: String,
    pub user_prompt: String,
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<AICall>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(Ok(response.into()));
        self
    }

    /// Queue a failed completion
    pub fn with_error(self, error: &str) -> Self {
        self.responses.lock().unwrap().push(Err(error.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<AICall> {
        self.calls.lock().unwrap().clone()
    }

    /// The last user prompt sent to the AI
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|c| c.user_prompt.clone())
    }

    /// Check if a user prompt containing the given text was sent
    pub fn was_called_with(&self, text: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.user_prompt.contains(text))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(AICall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok("Mock AI response".to_string());
        }
        responses.remove(0).map_err(|e| anyhow!(e))
    }
}

// =============================================================================
// Mock Search Service
// =============================================================================

pub struct MockSearchService {
    responses: Arc<Mutex<Vec<Vec<SearchResult>>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_results(self, results: Vec<SearchResult>) -> Self {
        self.responses.lock().unwrap().push(results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSearchService for MockSearchService {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.queries.lock().unwrap().push(query.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(vec![]);
        }
        let mut results = responses.remove(0);
        results.truncate(max_results);
        Ok(results)
    }
}

// =============================================================================
// In-memory page sink
// =============================================================================

/// Collects stored pages, upserting by identifier like the database does
pub struct MemoryPageSink {
    pages: Arc<Mutex<Vec<ScrapedPage>>>,
    failing_identifiers: Vec<String>,
}

impl MemoryPageSink {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(Mutex::new(Vec::new())),
            failing_identifiers: Vec::new(),
        }
    }

    /// Make `store` fail for this identifier
    pub fn failing_on(mut self, identifier: &str) -> Self {
        self.failing_identifiers.push(identifier.to_string());
        self
    }

    pub fn pages(&self) -> Vec<ScrapedPage> {
        self.pages.lock().unwrap().clone()
    }
}

impl Default for MemoryPageSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePageSink for MemoryPageSink {
    async fn store(&self, page: &ScrapedPage) -> Result<()> {
        if self.failing_identifiers.contains(&page.identifier) {
            return Err(anyhow!("storage unavailable for {}", page.identifier));
        }

        let mut pages = self.pages.lock().unwrap();
        match pages.iter_mut().find(|p| p.identifier == page.identifier) {
            Some(existing) => *existing = page.clone(),
            None => pages.push(page.clone()),
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub ai: Arc<MockAI>,
    pub fetcher: Arc<MockPageFetcher>,
    pub search_service: Option<Arc<MockSearchService>>,
    pub answer_settings: AnswerSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            ai: Arc::new(MockAI::new()),
            fetcher: Arc::new(MockPageFetcher::new()),
            search_service: None,
            answer_settings: AnswerSettings::default(),
        }
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock page fetcher
    pub fn mock_fetcher(mut self, fetcher: MockPageFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Enable the web search fallback with a mock search service
    pub fn mock_search(mut self, service: MockSearchService) -> Self {
        self.search_service = Some(Arc::new(service));
        self
    }

    pub fn answer_settings(mut self, settings: AnswerSettings) -> Self {
        self.answer_settings = settings;
        self
    }

    /// Convert into ServerDeps for testing (no scrape delay)
    pub fn into_deps(self, db_pool: PgPool) -> ServerDeps {
        let web_searcher = self
            .search_service
            .map(|s| s as Arc<dyn BaseSearchService>);

        ServerDeps::new(db_pool, self.ai, self.fetcher, web_searcher)
            .with_scrape_delay(Duration::ZERO)
            .with_answer_settings(self.answer_settings)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
