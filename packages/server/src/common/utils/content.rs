//! Pure utility functions for content manipulation
//!
//! These functions contain NO side effects - they take inputs and return outputs
//! without touching databases, making API calls, or performing I/O.
//! All lengths are counted in characters, never bytes.

/// How [`clean_text`] treats line breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Every whitespace run (newlines included) becomes one space
    #[default]
    Collapse,
    /// Lines are collapsed individually and kept as single `\n` paragraph breaks
    PreserveParagraphs,
}

/// Normalize whitespace and trim
pub fn clean_text(text: &str, mode: TextMode) -> String {
    match mode {
        TextMode::Collapse => text.split_whitespace().collect::<Vec<_>>().join(" "),
        TextMode::PreserveParagraphs => text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Hard cut to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Generate a short preview of `content`
///
/// Content no longer than `max_length` is returned unchanged. Otherwise the
/// preview ends at the last period inside the first `max_length` characters,
/// as long as that period sits beyond 70% of `max_length`. Failing that, it
/// truncates to `max_length - 3` characters and appends "...".
pub fn generate_summary(content: &str, max_length: usize) -> String {
    if char_len(content) <= max_length {
        return content.to_string();
    }

    let prefix = truncate_chars(content, max_length);
    if let Some(byte_idx) = prefix.rfind('.') {
        let period_pos = char_len(&prefix[..byte_idx]);
        if period_pos * 10 > max_length * 7 {
            return prefix[..=byte_idx].to_string();
        }
    }

    format!("{}...", truncate_chars(content, max_length.saturating_sub(3)))
}
