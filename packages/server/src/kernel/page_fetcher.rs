//! HTTP page fetcher - plain reqwest GET with a browser-like profile
//!
//! No JavaScript rendering: pages that need a browser come back as shells and
//! fail extraction downstream, which is an expected outcome.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{BasePageFetcher, FetchedPage};

/// Per-request timeout for page fetches
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; campus-policy-assistant/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Page fetcher backed by a shared reqwest client
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Normalize URL by adding https:// if no scheme is present
    pub fn normalize_url(url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }
}

#[async_trait]
impl BasePageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = Self::normalize_url(url);
        debug!(url = %url, "Fetching page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .context("Failed to read response body")?;

        Ok(FetchedPage {
            url: final_url,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            HttpPageFetcher::normalize_url("example.edu/policies"),
            "https://example.edu/policies"
        );
        assert_eq!(
            HttpPageFetcher::normalize_url("https://example.edu"),
            "https://example.edu"
        );
        assert_eq!(
            HttpPageFetcher::normalize_url("http://example.edu"),
            "http://example.edu"
        );
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpPageFetcher::new().is_ok());
    }
}
