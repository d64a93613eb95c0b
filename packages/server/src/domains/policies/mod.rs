pub mod actions;
pub mod crawler;
pub mod extraction;
pub mod identifier;
pub mod models;
pub mod sources;

pub use actions::{crawl, scrape_profile, scrape_profiles, ScrapeReport};
pub use extraction::{ContentExtractor, ExtractedContent, ExtractionOptions};
pub use models::{Policy, ScrapedPage};
pub use sources::{builtin_profiles, find_profile, SourceProfile};
