//! Metadata read back from captured markup
//!
//! Captured markup is stored verbatim. The only thing read out of it is the
//! document title, which goes into the run report.

use scraper::{Html, Selector};

/// Extracts the page title from rendered markup
///
/// # Example
///
/// ```
/// use review_mirror::crawler::extract_title;
///
/// let html = r#"<html><head><title>Dune (2021)</title></head><body></body></html>"#;
/// assert_eq!(extract_title(html), Some("Dune (2021)".to_string()));
/// ```
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}
