//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by domain actions,
//! HTTP handlers, the scheduler and the scrape CLI. All external services use
//! trait abstractions so tests can swap in mocks.

use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::{BaseAI, BasePageFetcher, BaseSearchService};

/// Tunables for the question-answering flow
#[derive(Debug, Clone)]
pub struct AnswerSettings {
    /// Most-recently-updated active policies placed in the prompt
    pub context_limit: i64,
    /// Characters of each policy's content placed in the prompt
    pub context_chars_per_policy: usize,
    /// Domain web search is scoped to (`site:` operator)
    pub site_domain: Option<String>,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            context_limit: 5,
            context_chars_per_policy: 3_000,
            site_domain: None,
        }
    }
}

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub ai: Arc<dyn BaseAI>,
    pub fetcher: Arc<dyn BasePageFetcher>,
    /// None when no search API key is configured; disables the search fallback
    pub web_searcher: Option<Arc<dyn BaseSearchService>>,
    /// Pause between successive fetches in a batch
    pub scrape_delay: Duration,
    pub answer_settings: AnswerSettings,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        ai: Arc<dyn BaseAI>,
        fetcher: Arc<dyn BasePageFetcher>,
        web_searcher: Option<Arc<dyn BaseSearchService>>,
    ) -> Self {
        Self {
            db_pool,
            ai,
            fetcher,
            web_searcher,
            scrape_delay: Duration::from_millis(1500),
            answer_settings: AnswerSettings::default(),
        }
    }

    pub fn with_scrape_delay(mut self, delay: Duration) -> Self {
        self.scrape_delay = delay;
        self
    }

    pub fn with_answer_settings(mut self, settings: AnswerSettings) -> Self {
        self.answer_settings = settings;
        self
    }
}
