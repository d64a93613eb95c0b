//! Link-following scrape seeded from a single page
//!
//! Same sequential contract as the batch driver: one fetch at a time, a pause
//! between fetches, and per-page failures counted instead of propagated.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::scrape::{process_page, PageOutcome, ScrapeReport};
use crate::domains::policies::crawler::{extract_links, CrawlLimits, Frontier};
use crate::domains::policies::extraction::ContentExtractor;
use crate::domains::policies::sources::SourceProfile;
use crate::kernel::{BasePageFetcher, BasePageSink};

/// Fetch one frontier entry, store its content and queue its links
async fn crawl_step(
    frontier: Frontier,
    profile: &SourceProfile,
    extractor: &ContentExtractor,
    fetcher: &dyn BasePageFetcher,
    sink: &dyn BasePageSink,
    limits: &CrawlLimits,
) -> (Option<PageOutcome>, Frontier) {
    let (next, frontier) = frontier.pop();
    let Some(entry) = next else {
        return (None, frontier);
    };

    debug!(url = %entry.url, depth = entry.depth, "Crawling page");

    let page = match fetcher.fetch(&entry.url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %entry.url, error = %e, "Fetch failed, skipping page");
            return (
                Some(PageOutcome::FetchFailed {
                    error: e.to_string(),
                }),
                frontier,
            );
        }
    };

    // Relative links resolve against where the fetch ended up, not where it started
    let links = extract_links(&page.html, &page.url);
    let frontier = frontier.enqueue_links(&entry, links, limits);

    let outcome = process_page(&entry.url, &page, profile, extractor, sink).await;
    (Some(outcome), frontier)
}

/// Crawl from `seed` until the frontier empties or `max_pages` is reached
pub async fn crawl(
    seed: &str,
    profile: &SourceProfile,
    fetcher: &dyn BasePageFetcher,
    sink: &dyn BasePageSink,
    limits: CrawlLimits,
    delay: Duration,
) -> Result<ScrapeReport> {
    let extractor = profile.extractor()?;
    let mut frontier = Frontier::seed(seed)?;
    let mut report = ScrapeReport::new(&profile.name);

    info!(
        seed = %seed,
        max_pages = limits.max_pages,
        max_depth = limits.max_depth,
        "Starting crawl"
    );

    while report.attempted < limits.max_pages && !frontier.is_empty() {
        if report.attempted > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (outcome, next) =
            crawl_step(frontier, profile, &extractor, fetcher, sink, &limits).await;
        frontier = next;

        match outcome {
            Some(outcome) => report.record(&outcome),
            None => break,
        }
    }

    info!(
        seed = %seed,
        attempted = report.attempted,
        stored = report.stored,
        skipped = report.skipped,
        failed = report.failed,
        remaining = frontier.queued(),
        "Crawl complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{MemoryPageSink, MockPageFetcher};

    fn page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect();
        format!(
            "<html><body><nav>{}</nav><main><h1>{}</h1><p>{}</p></main></body></html>",
            anchors,
            title,
            "Residents are responsible for the conduct of their guests at all times. ".repeat(3)
        )
    }

    fn profile() -> SourceProfile {
        SourceProfile::new("crawl", "Campus Life", vec![]).unwrap()
    }

    #[tokio::test]
    async fn test_crawl_follows_links_breadth_first() {
        let fetcher = MockPageFetcher::new()
            .with_page(
                "https://x.edu/housing",
                &page("Housing", &["/housing/guests", "/housing/quiet-hours", "/athletics"]),
            )
            .with_page("https://x.edu/housing/guests", &page("Guests", &["/housing/pets"]))
            .with_page("https://x.edu/housing/quiet-hours", &page("Quiet Hours", &[]))
            .with_page("https://x.edu/housing/pets", &page("Pets", &["/housing"]));
        let sink = MemoryPageSink::new();

        let report = crawl(
            "https://x.edu/housing",
            &profile(),
            &fetcher,
            &sink,
            CrawlLimits::default(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(report.attempted, 4);
        assert_eq!(report.stored, 4);
        assert_eq!(
            fetcher.fetch_calls(),
            vec![
                "https://x.edu/housing",
                "https://x.edu/housing/guests",
                "https://x.edu/housing/quiet-hours",
                "https://x.edu/housing/pets",
            ]
        );
        assert!(sink.pages().iter().all(|p| p.category == "housing"));
    }

    #[tokio::test]
    async fn test_crawl_stops_at_max_pages() {
        let fetcher = MockPageFetcher::new().with_page(
            "https://x.edu/policies",
            &page("Index", &["/policies/a", "/policies/b", "/policies/c"]),
        );
        let sink = MemoryPageSink::new();

        let report = crawl(
            "https://x.edu/policies",
            &profile(),
            &fetcher,
            &sink,
            CrawlLimits {
                max_pages: 2,
                max_depth: 3,
            },
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(fetcher.fetch_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_crawl_counts_unreachable_seed() {
        let fetcher = MockPageFetcher::new();
        let sink = MemoryPageSink::new();

        let report = crawl(
            "https://x.edu/missing",
            &profile(),
            &fetcher,
            &sink,
            CrawlLimits::default(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(report.attempted, 1);
        assert_eq!(report.failed, 1);
        assert!(sink.pages().is_empty());
    }
}
