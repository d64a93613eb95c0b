//! Fixed instructions and prompt builders for the answer flow

use crate::common::utils::truncate_chars;
use crate::domains::policies::models::Policy;
use crate::kernel::SearchResult;

/// Reply the model gives when the supplied policies do not cover a question
pub const INSUFFICIENT_CONTEXT: &str = "INSUFFICIENT_CONTEXT";

pub const ANSWER_PREAMBLE: &str = "You are a campus policy assistant for university students and staff. \
Answer the question using only the policy documents provided in the user message. \
Name the title of every policy you rely on. \
Be concise and quote exact requirements, deadlines and amounts where the policy states them. \
Do not guess and do not use outside knowledge. \
If the provided policies do not answer the question, reply with exactly INSUFFICIENT_CONTEXT and nothing else.";

pub const SUMMARIZE_PREAMBLE: &str = "You are a campus policy assistant for university students and staff. \
Answer the question using only the web search results provided in the user message. \
Name the page title of every result you rely on. \
If the results do not answer the question, say that the information could not be found and suggest contacting the relevant office.";

pub const DISCLAIMER: &str = "This answer was generated automatically from published university policies \
and may be incomplete or out of date. Check the linked sources or contact the responsible office before acting on it.";

pub const NOT_FOUND_ANSWER: &str = "I could not find information about this in the published university policies. \
Please contact the relevant office directly for help with your question.";

/// User prompt listing each policy's title, URL and (truncated) content, then the question
pub fn build_policy_prompt(question: &str, policies: &[Policy], chars_per_policy: usize) -> String {
    let mut prompt = String::from("Policies:\n");

    for (i, policy) in policies.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[{}] {}\nCategory: {}\nURL: {}\n{}\n",
            i + 1,
            policy.title,
            policy.category,
            policy.source_url,
            truncate_chars(&policy.content, chars_per_policy)
        ));
    }

    prompt.push_str(&format!("\nQuestion: {}", question));
    prompt
}

/// User prompt listing search hits, then the question
pub fn build_search_prompt(question: &str, results: &[SearchResult], chars_per_result: usize) -> String {
    let mut prompt = String::from("Search results:\n");

    for (i, result) in results.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[{}] {}\nURL: {}\n{}\n",
            i + 1,
            result.title,
            result.url,
            truncate_chars(&result.content, chars_per_result)
        ));
    }

    prompt.push_str(&format!("\nQuestion: {}", question));
    prompt
}

/// True when the model signalled that the context does not cover the question
pub fn is_insufficient(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.is_empty() || trimmed.contains(INSUFFICIENT_CONTEXT)
}

/// Web search query, scoped with `site:` when a domain is known
pub fn search_query(question: &str, site_domain: Option<&str>) -> String {
    match site_domain {
        Some(domain) => format!("site:{} {}", domain, question),
        None => question.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn policy(title: &str, content: &str) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            identifier: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            category: "housing".to_string(),
            content: content.to_string(),
            summary: String::new(),
            source_url: format!("https://x.edu/{}", title.to_lowercase().replace(' ', "-")),
            source_name: "Test".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_scraped_at: None,
        }
    }

    #[test]
    fn test_policy_prompt_lists_every_policy_then_question() {
        let policies = vec![
            policy("Guest Policy", "Guests may stay three nights."),
            policy("Quiet Hours", "Quiet hours begin at 10pm."),
        ];

        let prompt = build_policy_prompt("How long can guests stay?", &policies, 3000);

        assert!(prompt.starts_with("Policies:\n"));
        assert!(prompt.contains("[1] Guest Policy\nCategory: housing\nURL: https://x.edu/guest-policy\nGuests may stay three nights."));
        assert!(prompt.contains("[2] Quiet Hours"));
        assert!(prompt.ends_with("Question: How long can guests stay?"));
    }

    #[test]
    fn test_policy_prompt_truncates_content() {
        let policies = vec![policy("Long", &"x".repeat(50))];
        let prompt = build_policy_prompt("q", &policies, 10);

        assert!(prompt.contains(&format!("\n{}\n", "x".repeat(10))));
        assert!(!prompt.contains(&"x".repeat(11)));
    }

    #[test]
    fn test_is_insufficient() {
        assert!(is_insufficient("INSUFFICIENT_CONTEXT"));
        assert!(is_insufficient("  INSUFFICIENT_CONTEXT.\n"));
        assert!(is_insufficient(""));
        assert!(!is_insufficient("Guests may stay three nights (Guest Policy)."));
    }

    #[test]
    fn test_search_query_scoping() {
        assert_eq!(
            search_query("parking permits", Some("www.example.edu")),
            "site:www.example.edu parking permits"
        );
        assert_eq!(search_query("parking permits", None), "parking permits");
    }

    #[test]
    fn test_preamble_names_sentinel() {
        assert!(ANSWER_PREAMBLE.contains(INSUFFICIENT_CONTEXT));
    }
}
