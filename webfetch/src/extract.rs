//! HTML to plain text.
//!
//! Drops `<script>`, `<style>`, and `<noscript>` subtrees, joins the remaining
//! text nodes with spaces, and collapses whitespace.

use scraper::{Html, Node, Selector};

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub title: Option<String>,
    pub text: String,
}

pub fn extract_html(html: &str) -> ExtractedText {
    let html = html.strip_prefix('\u{FEFF}').unwrap_or(html);
    let document = Html::parse_document(html);

    let mut parts: Vec<&str> = Vec::new();
    let mut stack = vec![document.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => parts.push(text),
            Node::Element(element) if SKIPPED_TAGS.contains(&element.name()) => {}
            Node::Comment(_) => {}
            _ => stack.extend(node.children().rev()),
        }
    }

    ExtractedText {
        title: extract_title(&document),
        text: collapse_whitespace(&parts.join(" ")),
    }
}

/// Plain-text bodies only need whitespace normalisation.
pub fn extract_plain(text: &str) -> ExtractedText {
    ExtractedText {
        title: None,
        text: collapse_whitespace(text),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = collapse_whitespace(&title.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
