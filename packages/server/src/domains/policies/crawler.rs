//! Breadth-first crawl frontier
//!
//! The frontier owns both the queue and the visited set. It is moved into
//! every crawl step and handed back out, so the batch driver is the only
//! owner of crawl state between steps.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Stop conditions for a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    /// Pages fetched, successful or not
    pub max_pages: usize,
    /// Link hops from the seed
    pub max_depth: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: 50,
            max_depth: 3,
        }
    }
}

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    pub url: String,
    pub depth: usize,
}

/// Queue plus visited set for one crawl
#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    visited: HashSet<String>,
    /// Same host, path starting with the seed's directory
    host: String,
    path_prefix: String,
}

impl Frontier {
    /// Frontier holding only `seed`, scoped to the seed's host and directory
    pub fn seed(seed: &str) -> Result<Self> {
        let url = Url::parse(seed).with_context(|| format!("Invalid seed URL {}", seed))?;
        let host = url
            .host_str()
            .with_context(|| format!("Seed URL has no host: {}", seed))?
            .to_string();

        let path = url.path();
        let path_prefix = match path.rfind('/') {
            Some(idx) if path[idx + 1..].contains('.') => path[..=idx].to_string(),
            _ => path.trim_end_matches('/').to_string(),
        };

        let normalized = normalize_link(&url);
        let mut visited = HashSet::new();
        visited.insert(normalized.clone());

        Ok(Self {
            queue: VecDeque::from([QueuedUrl {
                url: normalized,
                depth: 0,
            }]),
            visited,
            host,
            path_prefix,
        })
    }

    /// Take the next URL in breadth-first order
    pub fn pop(mut self) -> (Option<QueuedUrl>, Self) {
        let next = self.queue.pop_front();
        (next, self)
    }

    /// Queue unseen in-scope links found on `from`
    ///
    /// Links past `max_depth` are dropped without being marked visited, so a
    /// shallower path can still reach them later.
    pub fn enqueue_links(mut self, from: &QueuedUrl, links: Vec<String>, limits: &CrawlLimits) -> Self {
        let depth = from.depth + 1;
        if depth > limits.max_depth {
            return self;
        }

        for link in links {
            if !self.in_scope(&link) || self.visited.contains(&link) {
                continue;
            }
            self.visited.insert(link.clone());
            self.queue.push_back(QueuedUrl { url: link, depth });
        }

        self
    }

    fn in_scope(&self, link: &str) -> bool {
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        if url.host_str() != Some(self.host.as_str()) {
            return false;
        }

        // Match whole segments so `/housing` does not admit `/housing-archive`
        let prefix = self.path_prefix.trim_end_matches('/');
        let path = url.path();
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}

/// Remove query, fragment and trailing slash
fn normalize_link(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    let path = normalized.path().trim_end_matches('/').to_string();
    normalized.set_path(if path.is_empty() { "/" } else { &path });
    normalized.to_string()
}

/// Check if a path should be skipped (assets, auth, feeds, etc.)
pub fn is_skip_path(path: &str) -> bool {
    let skip_patterns = [
        "/login",
        "/logout",
        "/signin",
        "/auth",
        "/search",
        "/calendar",
        "/feed",
        "/rss",
        "/sitemap",
        "/cdn-cgi/",
        ".pdf",
        ".doc",
        ".docx",
        ".xls",
        ".jpg",
        ".jpeg",
        ".png",
        ".gif",
        ".svg",
        ".css",
        ".js",
        ".xml",
        ".json",
        ".zip",
    ];

    let path_lower = path.to_lowercase();
    skip_patterns
        .iter()
        .any(|pattern| path_lower.contains(pattern))
}

/// Same-host http(s) links of a page, normalized, in document order
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return vec![];
    };
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return vec![];
    };

    let document = Html::parse_document(html);
    let base_host = base.host_str().unwrap_or("");
    let mut seen = HashSet::new();

    document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| !href.starts_with("mailto:") && !href.starts_with("tel:"))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| {
            url.host_str() == Some(base_host)
                && (url.scheme() == "http" || url.scheme() == "https")
                && !is_skip_path(url.path())
        })
        .map(|url| normalize_link(&url))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
