//! Stable natural keys and fallback titles derived from URLs

use url::Url;

/// File extensions dropped from the last path segment
const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm", ".php", ".aspx", ".asp", ".shtml"];

/// Lowercase ASCII slug: runs of anything non-alphanumeric become one `-`
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn strip_extension(segment: &str) -> &str {
    PAGE_EXTENSIONS
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
        .unwrap_or(segment)
}

/// Non-empty path segments with page extensions removed
fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| strip_extension(s).to_string())
                .filter(|s| !s.is_empty() && s != "index")
                .collect()
        })
        .unwrap_or_default()
}

/// Natural key for a page
///
/// Built from the URL path so re-scrapes of the same page map to the same row.
/// Query strings and fragments are ignored. A bare host falls back to the
/// title, then to the host itself.
pub fn policy_identifier(source_url: &str, title: Option<&str>) -> String {
    let parsed = Url::parse(source_url).ok();

    if let Some(url) = &parsed {
        let slug = slugify(&path_segments(url).join("-"));
        if !slug.is_empty() {
            return slug;
        }
    }

    if let Some(slug) = title.map(slugify).filter(|s| !s.is_empty()) {
        return slug;
    }

    parsed
        .as_ref()
        .and_then(|url| url.host_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(source_url))
}

/// Human title from the last path segment: `academic-integrity.html` -> `Academic Integrity`
pub fn title_from_url(source_url: &str) -> Option<String> {
    let url = Url::parse(source_url).ok()?;
    let last = path_segments(&url).pop()?;

    let words: Vec<String> = last
        .split(['-', '_', '+'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    (!words.is_empty()).then(|| words.join(" "))
}
