//! Tree-level helpers: boilerplate stripping, block-aware text, titles

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements removed before any text is read
pub const BOILERPLATE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "nav",
    "header",
    "footer",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    ".menu",
    ".nav",
    ".navbar",
    ".breadcrumb",
    ".breadcrumbs",
    "#breadcrumb",
    "#breadcrumbs",
    "#menu",
    ".skip-link",
];

/// Elements that start a new line in extracted text
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Detach every element matching any of `selectors` from the tree
pub fn strip_elements(document: &mut Html, selectors: &[Selector]) {
    let doc: &Html = document;
    let ids: Vec<_> = selectors
        .iter()
        .flat_map(|selector| doc.select(selector).map(|el| el.id()))
        .collect();

    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Matches of `selector` still attached to the document
///
/// `Html::select` walks the whole node arena, so elements inside a subtree
/// removed by [`strip_elements`] would otherwise still match.
pub fn select_attached<'a>(
    document: &'a Html,
    selector: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let root = document.tree.root().id();
    document
        .select(selector)
        .filter(move |el| el.ancestors().any(|ancestor| ancestor.id() == root))
}

/// Raw text of an element with a newline at every block boundary
///
/// Inline markup keeps its own spacing, so `Hello <b>world</b>` stays one line
/// while `<p>a</p><p>b</p>` becomes two.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        if let Some(el) = node.value().as_element() {
            if is_block(el.name()) {
                out.push('\n');
            }
        } else if let Some(text) = node.value().as_text() {
            let after_block = node
                .prev_sibling()
                .and_then(|sibling| sibling.value().as_element().map(|el| is_block(el.name())))
                .unwrap_or(false);
            if after_block {
                out.push('\n');
            }
            out.push_str(text);
        }
    }

    out
}

/// Drop matches that sit inside another match, keeping document order
pub fn outermost<'a>(matches: Vec<ElementRef<'a>>) -> Vec<ElementRef<'a>> {
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();
    matches
        .into_iter()
        .filter(|el| !el.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .collect()
}

/// Page title: first `h1`, then `<title>`
pub fn extract_title(document: &Html) -> Option<String> {
    ["h1", "title"].iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        let title = select_attached(document, &selector)
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|t| !t.is_empty());
        title
    })
}
