//! Layered content extraction
//!
//! Turns a fetched HTML document into one cleaned, length-bounded text block.
//! Boilerplate is stripped first, then an ordered list of tiers is tried:
//! every candidate selector in priority order, then a paragraph/list-item
//! fallback over the whole body. The first tier whose text exceeds the
//! minimum length wins. When none does, the page yields no result, which is
//! a normal outcome for navigation-only pages and redirect shells.

pub mod text;

use scraper::{Html, Selector};
use thiserror::Error;

use crate::common::utils::{char_len, clean_text, generate_summary, truncate_chars, TextMode};
use text::{
    element_text, extract_title, outermost, select_attached, strip_elements,
    BOILERPLATE_SELECTORS,
};

pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_000;
pub const DEFAULT_MAX_SUMMARY_LENGTH: usize = 200;
pub const DEFAULT_PARAGRAPH_FLOOR: usize = 20;

/// Container selectors tried when a profile does not supply its own
pub const DEFAULT_CANDIDATE_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#main-content",
    "#content",
    ".main-content",
    ".content",
    ".entry-content",
    ".page-content",
];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Thresholds and normalization for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Text must be strictly longer than this to be accepted
    pub min_content_length: usize,
    /// Stored content is hard-cut to this many characters
    pub max_content_length: usize,
    pub max_summary_length: usize,
    /// Paragraph-fallback nodes must be strictly longer than this
    pub paragraph_floor: usize,
    pub mode: TextMode,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_summary_length: DEFAULT_MAX_SUMMARY_LENGTH,
            paragraph_floor: DEFAULT_PARAGRAPH_FLOOR,
            mode: TextMode::Collapse,
        }
    }
}

/// One fallback level of the extraction chain
#[derive(Debug, Clone)]
pub enum ExtractionTier {
    /// Text of every (outermost) node matching a candidate container selector
    Container { raw: String, selector: Selector },
    /// Qualifying `p`/`li` nodes of the body joined in document order
    Paragraphs,
}

impl ExtractionTier {
    /// Short label for logs
    pub fn label(&self) -> &str {
        match self {
            ExtractionTier::Container { raw, .. } => raw,
            ExtractionTier::Paragraphs => "paragraphs",
        }
    }

    /// Normalized text if it clears the minimum length
    fn apply(&self, document: &Html, options: &ExtractionOptions) -> Option<String> {
        let text = match self {
            ExtractionTier::Container { selector, .. } => {
                let nodes = outermost(select_attached(document, selector).collect());
                if nodes.is_empty() {
                    return None;
                }
                let raw = nodes
                    .into_iter()
                    .map(element_text)
                    .collect::<Vec<_>>()
                    .join("\n");
                clean_text(&raw, options.mode)
            }
            ExtractionTier::Paragraphs => paragraph_text(document, options),
        };

        (char_len(&text) > options.min_content_length).then_some(text)
    }
}

/// Paragraph and list-item text of the body, skipping short fragments
fn paragraph_text(document: &Html, options: &ExtractionOptions) -> String {
    let Ok(selector) = Selector::parse("body p, body li") else {
        return String::new();
    };

    let separator = match options.mode {
        TextMode::Collapse => "\n\n",
        TextMode::PreserveParagraphs => "\n",
    };

    outermost(select_attached(document, &selector).collect())
        .into_iter()
        .map(|node| clean_text(&element_text(node), options.mode))
        .filter(|text| char_len(text) > options.paragraph_floor)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// First `h1` or `<title>` after boilerplate removal
    pub title: Option<String>,
    /// Cleaned text, at most `max_content_length` characters
    pub content: String,
    pub summary: String,
    /// Label of the tier that produced the content
    pub tier: String,
}

/// Extractor configured with an ordered tier list
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    tiers: Vec<ExtractionTier>,
    boilerplate: Vec<Selector>,
    options: ExtractionOptions,
}

fn parse_selector(raw: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(raw).map_err(|e| ExtractionError::InvalidSelector {
        selector: raw.to_string(),
        message: e.to_string(),
    })
}

impl ContentExtractor {
    /// Build an extractor; selectors are tried in the order given
    pub fn new<S: AsRef<str>>(
        candidate_selectors: &[S],
        options: ExtractionOptions,
    ) -> Result<Self, ExtractionError> {
        let mut tiers = candidate_selectors
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                parse_selector(raw).map(|selector| ExtractionTier::Container {
                    raw: raw.to_string(),
                    selector,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        tiers.push(ExtractionTier::Paragraphs);

        let boilerplate = BOILERPLATE_SELECTORS
            .iter()
            .map(|raw| parse_selector(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tiers,
            boilerplate,
            options,
        })
    }

    /// Extractor with the default candidate selectors
    pub fn with_defaults(options: ExtractionOptions) -> Result<Self, ExtractionError> {
        Self::new(DEFAULT_CANDIDATE_SELECTORS, options)
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    pub fn tiers(&self) -> &[ExtractionTier] {
        &self.tiers
    }

    /// Extract the main text of `html`, or `None` when no tier qualifies
    pub fn extract(&self, html: &str) -> Option<ExtractedContent> {
        let mut document = Html::parse_document(html);
        strip_elements(&mut document, &self.boilerplate);

        let (tier, text) = self
            .tiers
            .iter()
            .find_map(|tier| tier.apply(&document, &self.options).map(|text| (tier, text)))?;

        let content = truncate_chars(&text, self.options.max_content_length);
        let summary = generate_summary(&content, self.options.max_summary_length);

        Some(ExtractedContent {
            title: extract_title(&document),
            content,
            summary,
            tier: tier.label().to_string(),
        })
    }
}
