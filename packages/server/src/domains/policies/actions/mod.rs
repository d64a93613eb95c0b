pub mod crawl;
pub mod manage;
pub mod scrape;

pub use crawl::crawl;
pub use manage::{prepare_new_policy, prepare_update, CreatePolicyInput, UpdatePolicyInput};
pub use scrape::{
    build_scraped_page, process_page, scrape_profile, scrape_profiles, scrape_url, PageOutcome,
    ScrapeReport,
};
