//! Manual policy entry and edits made through the HTTP API

use serde::Deserialize;

use crate::common::utils::{generate_summary, truncate_chars};
use crate::domains::policies::extraction::{DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_SUMMARY_LENGTH};
use crate::domains::policies::identifier::{policy_identifier, slugify};
use crate::domains::policies::models::{NewPolicy, PolicyUpdate};
use crate::domains::policies::sources::DEFAULT_CATEGORY;

/// Source name recorded on hand-entered policies
pub const MANUAL_SOURCE_NAME: &str = "Manual entry";

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePolicyInput {
    pub identifier: Option<String>,
    pub title: String,
    pub category: Option<String>,
    pub content: String,
    pub summary: Option<String>,
    pub source_url: String,
    pub source_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePolicyInput {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub source_url: Option<String>,
    pub is_active: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Hand-entered summaries get the same bound as derived ones
fn bounded_summary(summary: Option<String>) -> Option<String> {
    non_empty(summary).map(|s| generate_summary(&s, DEFAULT_MAX_SUMMARY_LENGTH))
}

fn require(field: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(value.to_string())
}

/// Validate a create request and fill in derived fields
///
/// The identifier is slugified when given, else derived from the URL and
/// title the same way scraped pages are keyed. The summary is derived from
/// the content when absent.
pub fn prepare_new_policy(input: CreatePolicyInput) -> Result<NewPolicy, String> {
    let title = require("title", &input.title)?;
    let source_url = require("source_url", &input.source_url)?;
    let content = truncate_chars(&require("content", &input.content)?, DEFAULT_MAX_CONTENT_LENGTH);

    let identifier = match non_empty(input.identifier) {
        Some(given) => slugify(&given),
        None => policy_identifier(&source_url, Some(&title)),
    };
    if identifier.is_empty() {
        return Err("identifier must contain letters or digits".to_string());
    }

    let summary = bounded_summary(input.summary)
        .unwrap_or_else(|| generate_summary(&content, DEFAULT_MAX_SUMMARY_LENGTH));

    Ok(NewPolicy {
        identifier,
        title,
        category: non_empty(input.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        content,
        summary,
        source_url,
        source_name: non_empty(input.source_name)
            .unwrap_or_else(|| MANUAL_SOURCE_NAME.to_string()),
    })
}

/// Validate an update request; new content without a summary re-derives it
pub fn prepare_update(input: UpdatePolicyInput) -> Result<PolicyUpdate, String> {
    for (field, value) in [
        ("title", &input.title),
        ("category", &input.category),
        ("content", &input.content),
        ("source_url", &input.source_url),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(format!("{} must not be empty", field));
        }
    }

    let content = input
        .content
        .map(|c| truncate_chars(c.trim(), DEFAULT_MAX_CONTENT_LENGTH));
    let summary = bounded_summary(input.summary).or_else(|| {
        content
            .as_deref()
            .map(|c| generate_summary(c, DEFAULT_MAX_SUMMARY_LENGTH))
    });

    Ok(PolicyUpdate {
        title: input.title.map(|t| t.trim().to_string()),
        category: input.category.map(|c| c.trim().to_string()),
        content,
        summary,
        source_url: input.source_url.map(|u| u.trim().to_string()),
        is_active: input.is_active,
    })
}
