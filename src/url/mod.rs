//! URL handling module for Review-Mirror
//!
//! This module provides listing URL construction, frontier normalization and
//! the URL → storage key mapping.

mod normalize;
mod paths;
mod target;

// Re-export main functions
pub use normalize::normalize_page_url;
pub use paths::{detail_key, listing_key, StorageKey};
pub use target::{listing_url, CrawlTarget, ListingPage};

/// Returns true if the URL's path contains `pattern`
///
/// Detail pages are recognised by a path fragment such as `/alice/film/`.
pub fn path_matches(url: &::url::Url, pattern: &str) -> bool {
    url.path().contains(pattern)
}
