use serde::{Deserialize, Serialize};

use crate::domains::policies::identifier::policy_identifier;
use crate::domains::policies::models::Policy;
use crate::kernel::SearchResult;

/// Category recorded on citations that come from web search hits
pub const WEB_CITATION_CATEGORY: &str = "web";

/// Where an answer's context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Policies,
    WebSearch,
}

/// A document the answer draws on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub category: String,
    pub identifier: String,
}

impl From<&Policy> for Citation {
    fn from(policy: &Policy) -> Self {
        Self {
            title: policy.title.clone(),
            url: policy.source_url.clone(),
            category: policy.category.clone(),
            identifier: policy.identifier.clone(),
        }
    }
}

impl From<&SearchResult> for Citation {
    fn from(result: &SearchResult) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            category: WEB_CITATION_CATEGORY.to_string(),
            identifier: policy_identifier(&result.url, Some(&result.title)),
        }
    }
}

/// Response body of the ask endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub disclaimer: String,
    pub source: AnswerSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AnswerSource::WebSearch).unwrap(),
            "\"web_search\""
        );
        assert_eq!(
            serde_json::to_string(&AnswerSource::Policies).unwrap(),
            "\"policies\""
        );
    }

    #[test]
    fn test_web_citation_identifier_from_url() {
        let result = SearchResult {
            title: "Parking Regulations".to_string(),
            url: "https://www.example.edu/parking/regulations".to_string(),
            content: String::new(),
            score: 0.9,
        };
        let citation = Citation::from(&result);
        assert_eq!(citation.identifier, "parking-regulations");
        assert_eq!(citation.category, WEB_CITATION_CATEGORY);
    }
}
