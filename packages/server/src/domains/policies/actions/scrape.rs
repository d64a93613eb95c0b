//! Sequential batch driver: fetch, extract, store, pause, next URL
//!
//! One page's failure never aborts the batch. Fetch and store errors are
//! logged and counted; pages that fail extraction are counted as skipped.
//! Re-running the batch is the retry mechanism.

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domains::policies::extraction::{ContentExtractor, ExtractedContent};
use crate::domains::policies::identifier::{policy_identifier, title_from_url};
use crate::domains::policies::models::ScrapedPage;
use crate::domains::policies::sources::SourceProfile;
use crate::kernel::{BasePageFetcher, BasePageSink, FetchedPage};

/// What happened to one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Stored { identifier: String },
    /// Extraction produced nothing usable
    Skipped,
    FetchFailed { error: String },
    StoreFailed { error: String },
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub profile: String,
    pub attempted: usize,
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScrapeReport {
    pub fn new(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &PageOutcome) {
        self.attempted += 1;
        match outcome {
            PageOutcome::Stored { .. } => self.stored += 1,
            PageOutcome::Skipped => self.skipped += 1,
            PageOutcome::FetchFailed { .. } | PageOutcome::StoreFailed { .. } => self.failed += 1,
        }
    }
}

/// Assemble the record for an extracted page
pub fn build_scraped_page(
    requested_url: &str,
    extracted: ExtractedContent,
    profile: &SourceProfile,
) -> ScrapedPage {
    let title = extracted
        .title
        .or_else(|| title_from_url(requested_url))
        .unwrap_or_else(|| requested_url.to_string());

    ScrapedPage {
        identifier: policy_identifier(requested_url, Some(&title)),
        category: profile.categorize(requested_url),
        title,
        content: extracted.content,
        summary: extracted.summary,
        source_url: requested_url.to_string(),
        source_name: profile.source_name.clone(),
    }
}

/// Extract and store an already fetched page
pub async fn process_page(
    requested_url: &str,
    page: &FetchedPage,
    profile: &SourceProfile,
    extractor: &ContentExtractor,
    sink: &dyn BasePageSink,
) -> PageOutcome {
    let Some(extracted) = extractor.extract(&page.html) else {
        info!(url = %requested_url, "No usable content, skipping page");
        return PageOutcome::Skipped;
    };

    let tier = extracted.tier.clone();
    let scraped = build_scraped_page(requested_url, extracted, profile);

    match sink.store(&scraped).await {
        Ok(()) => {
            info!(
                url = %requested_url,
                identifier = %scraped.identifier,
                category = %scraped.category,
                tier = %tier,
                content_length = scraped.content.chars().count(),
                "Stored policy page"
            );
            PageOutcome::Stored {
                identifier: scraped.identifier,
            }
        }
        Err(e) => {
            error!(url = %requested_url, error = %e, "Failed to store policy page");
            PageOutcome::StoreFailed {
                error: e.to_string(),
            }
        }
    }
}

/// Fetch, extract and store one URL
pub async fn scrape_url(
    url: &str,
    profile: &SourceProfile,
    extractor: &ContentExtractor,
    fetcher: &dyn BasePageFetcher,
    sink: &dyn BasePageSink,
) -> PageOutcome {
    match fetcher.fetch(url).await {
        Ok(page) => process_page(url, &page, profile, extractor, sink).await,
        Err(e) => {
            warn!(url = %url, error = %e, "Fetch failed, skipping page");
            PageOutcome::FetchFailed {
                error: e.to_string(),
            }
        }
    }
}

/// Run every URL of a profile in order, pausing `delay` between fetches
///
/// Only an invalid profile (bad selector) is an error; per-page failures are
/// reported in the returned counters.
pub async fn scrape_profile(
    profile: &SourceProfile,
    fetcher: &dyn BasePageFetcher,
    sink: &dyn BasePageSink,
    delay: Duration,
) -> Result<ScrapeReport> {
    let extractor = profile.extractor()?;
    let mut report = ScrapeReport::new(&profile.name);

    info!(
        profile = %profile.name,
        urls = profile.urls.len(),
        delay_ms = delay.as_millis() as u64,
        "Starting scrape batch"
    );

    for (index, url) in profile.urls.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = scrape_url(url, profile, &extractor, fetcher, sink).await;
        report.record(&outcome);
    }

    info!(
        profile = %report.profile,
        attempted = report.attempted,
        stored = report.stored,
        skipped = report.skipped,
        failed = report.failed,
        "Scrape batch complete"
    );

    Ok(report)
}

/// Run several profiles back to back
pub async fn scrape_profiles(
    profiles: &[SourceProfile],
    fetcher: &dyn BasePageFetcher,
    sink: &dyn BasePageSink,
    delay: Duration,
) -> Vec<ScrapeReport> {
    let mut reports = Vec::with_capacity(profiles.len());

    for profile in profiles {
        match scrape_profile(profile, fetcher, sink, delay).await {
            Ok(report) => reports.push(report),
            Err(e) => error!(profile = %profile.name, error = %e, "Scrape profile failed"),
        }
    }

    reports
}
