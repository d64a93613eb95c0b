//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use policy_core::domains::policies::models::{Policy, ScrapedPage};
use sqlx::PgPool;
use uuid::Uuid;

/// Suffix that keeps rows from parallel tests apart
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub fn scraped_page(identifier: &str, category: &str, content: &str) -> ScrapedPage {
    ScrapedPage {
        identifier: identifier.to_string(),
        title: format!("Policy {}", identifier),
        category: category.to_string(),
        content: content.to_string(),
        summary: content.chars().take(200).collect(),
        source_url: format!("https://www.example.edu/policies/{}", identifier),
        source_name: "Test Source".to_string(),
    }
}

/// Insert a scraped policy with the given title and content
pub async fn create_test_policy(
    pool: &PgPool,
    category: &str,
    title: &str,
    content: &str,
) -> Result<Policy> {
    let mut page = scraped_page(&unique("policy"), category, content);
    page.title = title.to_string();
    Policy::upsert(&page, pool).await
}
