//! Link extraction from rendered pages
//!
//! Anchors are read from the live DOM after rendering, so links inserted by
//! client-side code are seen too.
//!
//! # Href Rules
//!
//! **Skipped silently:**
//! - missing or empty `href`
//! - fragment-only links (`#top`)
//! - `javascript:`, `mailto:`, `tel:` and `data:` links
//! - anything that does not resolve to an HTTP(S) URL
//!
//! **Kept:** absolute URLs whose path contains the detail pattern, normalized
//! so that duplicates within a page collapse.

use crate::browser::BrowserPage;
use crate::url::{normalize_page_url, path_matches};
use crate::CaptureError;
use std::collections::BTreeSet;
use url::Url;

/// Reads every anchor on the current page and returns the matching detail URLs
///
/// # Arguments
///
/// * `page` - The page, already navigated to `current_url` and rendered
/// * `current_url` - Base for resolving relative hrefs
/// * `pattern` - Path fragment a detail URL must contain
///
/// # Returns
///
/// * `Ok(BTreeSet<Url>)` - Normalized absolute URLs, duplicates collapsed
/// * `Err(CaptureError::Extraction)` - The anchors could not be read at all
pub async fn extract_links<P: BrowserPage + ?Sized>(
    page: &mut P,
    current_url: &Url,
    pattern: &str,
) -> Result<BTreeSet<Url>, CaptureError> {
    let hrefs = page
        .query_selector_all_attr("a", "href")
        .await
        .map_err(|e| CaptureError::Extraction {
            url: current_url.to_string(),
            message: e.to_string(),
        })?;

    let anchors = hrefs.len();
    let links = filter_links(current_url, hrefs.iter().flatten().map(String::as_str), pattern);

    tracing::debug!(
        url = %current_url,
        anchors,
        matched = links.len(),
        "Extracted detail links"
    );

    Ok(links)
}

/// Resolves and filters raw hrefs against `base`
///
/// # Example
///
/// ```
/// use review_mirror::crawler::filter_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.test/alice/films/reviews/").unwrap();
/// let links = filter_links(&base, ["", "#top", "/alice/film/dune/", "https://other.test/x"], "film/");
/// let links: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
/// assert_eq!(links, vec!["https://example.test/alice/film/dune/"]);
/// ```
pub fn filter_links<'a>(
    base: &Url,
    hrefs: impl IntoIterator<Item = &'a str>,
    pattern: &str,
) -> BTreeSet<Url> {
    hrefs
        .into_iter()
        .filter_map(|href| resolve_href(base, href))
        .filter_map(|url| normalize_page_url(&url).ok())
        .filter(|url| path_matches(url, pattern))
        .collect()
}

/// Resolves a raw href to an absolute HTTP(S) URL
///
/// Returns None if the href should be skipped.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}
