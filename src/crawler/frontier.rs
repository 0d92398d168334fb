//! Detail-URL frontier
//!
//! Collects the detail URLs found on listing pages, keyed by their
//! normalized form, and hands the detail phase a fixed snapshot.

use crate::url::normalize_page_url;
use std::collections::HashSet;
use url::Url;

/// Set of discovered detail URLs
///
/// Entries are unique after normalization and remembered in discovery
/// order. The frontier only ever grows.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    seen: HashSet<String>,
    order: Vec<Url>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL; returns false if it (or an equivalent form) is already known
    pub fn insert(&mut self, url: &Url) -> bool {
        let normalized = match normalize_page_url(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!("Not queueing {}: {}", url, e);
                return false;
            }
        };

        if self.seen.insert(normalized.as_str().to_string()) {
            self.order.push(normalized);
            true
        } else {
            false
        }
    }

    /// Merges a batch of URLs; returns how many were new
    pub fn extend<'a>(&mut self, urls: impl IntoIterator<Item = &'a Url>) -> usize {
        urls.into_iter().filter(|url| self.insert(url)).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Copy of the current entries in discovery order
    ///
    /// Taken once at the discovery → detail transition; URLs added later
    /// are not part of the snapshot.
    pub fn snapshot(&self) -> Vec<Url> {
        self.order.clone()
    }
}
