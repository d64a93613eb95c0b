use serde::{Deserialize, Serialize};

/// A page that passed extraction, on its way to persistence
///
/// Created fresh per fetched URL and handed straight to a page sink; nothing
/// keeps these around after the upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Natural key, stable across re-scrapes of the same page
    pub identifier: String,
    pub title: String,
    /// Assigned by the scrape profile from the URL, not by the extractor
    pub category: String,
    pub content: String,
    pub summary: String,
    pub source_url: String,
    pub source_name: String,
}
