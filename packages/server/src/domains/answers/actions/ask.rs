//! Answer a question from stored policies, falling back to web search
//!
//! ```text
//! question ─► recent active policies ─► LLM ─► answer + citations
//!                    │ none                 │ INSUFFICIENT_CONTEXT
//!                    └──────────┬───────────┘
//!                               ▼
//!              web search (site-scoped) ─► LLM summary
//!                               │ no searcher / no hits
//!                               ▼
//!                      fixed "could not find" answer
//! ```

use thiserror::Error;
use tracing::{info, warn};

use crate::common::utils::char_len;
use crate::domains::answers::data::{Answer, AnswerSource, Citation};
use crate::domains::answers::prompts::{
    build_policy_prompt, build_search_prompt, is_insufficient, search_query, ANSWER_PREAMBLE,
    DISCLAIMER, NOT_FOUND_ANSWER, SUMMARIZE_PREAMBLE,
};
use crate::domains::policies::models::Policy;
use crate::kernel::{AnswerSettings, BaseAI, BaseSearchService, ServerDeps};

pub const MAX_QUESTION_LENGTH: usize = 1_000;
pub const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("{0}")]
    InvalidQuestion(String),

    #[error("web search is not configured")]
    SearchUnavailable,

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Trimmed question, or an error when it is empty or too long
pub fn validate_question(question: &str) -> Result<String, AnswerError> {
    let question = question.trim();

    if question.is_empty() {
        return Err(AnswerError::InvalidQuestion(
            "question must not be empty".to_string(),
        ));
    }
    if char_len(question) > MAX_QUESTION_LENGTH {
        return Err(AnswerError::InvalidQuestion(format!(
            "question must be at most {} characters",
            MAX_QUESTION_LENGTH
        )));
    }

    Ok(question.to_string())
}

fn not_found(source: AnswerSource) -> Answer {
    Answer {
        answer: NOT_FOUND_ANSWER.to_string(),
        citations: vec![],
        disclaimer: DISCLAIMER.to_string(),
        source,
    }
}

/// Policies the answer names by title; all context policies when it names none
fn cited_policies(answer: &str, policies: &[Policy]) -> Vec<Citation> {
    let lowered = answer.to_lowercase();
    let named: Vec<Citation> = policies
        .iter()
        .filter(|p| lowered.contains(&p.title.to_lowercase()))
        .map(Citation::from)
        .collect();

    if named.is_empty() {
        policies.iter().map(Citation::from).collect()
    } else {
        named
    }
}

/// Ask the model about `policies`
///
/// `Ok(None)` means the policies could not answer: either there were none or
/// the model replied with the sentinel.
pub async fn answer_from_policies(
    ai: &dyn BaseAI,
    question: &str,
    policies: &[Policy],
    settings: &AnswerSettings,
) -> Result<Option<Answer>, AnswerError> {
    if policies.is_empty() {
        info!("No active policies available for context");
        return Ok(None);
    }

    let prompt = build_policy_prompt(question, policies, settings.context_chars_per_policy);
    let reply = ai
        .complete(ANSWER_PREAMBLE, &prompt)
        .await
        .map_err(|e| AnswerError::Upstream(format!("{:#}", e)))?;

    if is_insufficient(&reply) {
        info!(policies = policies.len(), "Policies did not cover the question");
        return Ok(None);
    }

    let answer = reply.trim().to_string();
    Ok(Some(Answer {
        citations: cited_policies(&answer, policies),
        answer,
        disclaimer: DISCLAIMER.to_string(),
        source: AnswerSource::Policies,
    }))
}

/// Search the web and have the model summarize the hits
pub async fn answer_from_web(
    ai: &dyn BaseAI,
    searcher: &dyn BaseSearchService,
    question: &str,
    settings: &AnswerSettings,
) -> Result<Answer, AnswerError> {
    let query = search_query(question, settings.site_domain.as_deref());
    let mut results = searcher
        .search(&query, MAX_SEARCH_RESULTS)
        .await
        .map_err(|e| AnswerError::Upstream(format!("{:#}", e)))?;
    results.truncate(MAX_SEARCH_RESULTS);

    info!(query = %query, results = results.len(), "Web search complete");

    if results.is_empty() {
        return Ok(not_found(AnswerSource::WebSearch));
    }

    let prompt = build_search_prompt(question, &results, settings.context_chars_per_policy);
    let reply = ai
        .complete(SUMMARIZE_PREAMBLE, &prompt)
        .await
        .map_err(|e| AnswerError::Upstream(format!("{:#}", e)))?;

    Ok(Answer {
        answer: reply.trim().to_string(),
        citations: results.iter().map(Citation::from).collect(),
        disclaimer: DISCLAIMER.to_string(),
        source: AnswerSource::WebSearch,
    })
}

/// Policy answer first, then the web fallback when a searcher is available
pub async fn answer_question(
    ai: &dyn BaseAI,
    searcher: Option<&dyn BaseSearchService>,
    question: &str,
    policies: &[Policy],
    settings: &AnswerSettings,
) -> Result<Answer, AnswerError> {
    if let Some(answer) = answer_from_policies(ai, question, policies, settings).await? {
        return Ok(answer);
    }

    let Some(searcher) = searcher else {
        return Ok(not_found(AnswerSource::Policies));
    };

    match answer_from_web(ai, searcher, question, settings).await {
        Ok(answer) => Ok(answer),
        Err(e) => {
            warn!(error = %e, "Web search fallback failed");
            Ok(not_found(AnswerSource::WebSearch))
        }
    }
}

/// `POST /api/ask`
pub async fn ask(
    deps: &ServerDeps,
    question: &str,
    category: Option<&str>,
) -> Result<Answer, AnswerError> {
    let question = validate_question(question)?;
    let settings = &deps.answer_settings;

    let policies =
        Policy::find_recent_active(settings.context_limit, category, &deps.db_pool).await?;

    answer_question(
        deps.ai.as_ref(),
        deps.web_searcher.as_deref(),
        &question,
        &policies,
        settings,
    )
    .await
}

/// `POST /api/ask/search`
pub async fn ask_web(deps: &ServerDeps, question: &str) -> Result<Answer, AnswerError> {
    let question = validate_question(question)?;
    let searcher = deps
        .web_searcher
        .as_deref()
        .ok_or(AnswerError::SearchUnavailable)?;

    answer_from_web(deps.ai.as_ref(), searcher, &question, &deps.answer_settings).await
}
