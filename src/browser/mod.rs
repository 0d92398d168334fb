//! Browser abstraction
//!
//! The crawl engine never touches a socket or a DOM parser itself. Everything
//! it needs from a rendering engine goes through [`BrowserPage`], and the
//! lifetime of the engine is owned through [`BrowserSession`].
//!
//! - `chrome`: the production backend over headless Chromium

mod chrome;

#[cfg(test)]
pub(crate) mod scripted;

pub use chrome::{ChromePage, ChromeSession};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a browser backend
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("No element matches selector {0}")]
    ElementNotFound(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),

    #[error("Browser session is closed")]
    Closed,
}

impl BrowserError {
    /// Returns true if the error is a timeout of a bounded wait
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// A single live page (tab) of the rendering engine
///
/// One page is reused for every navigation of a run, so all methods take
/// `&mut self` and calls are strictly ordered.
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigates to `url` and waits for the load to commit
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Waits until no network activity is observed, bounded by `timeout`
    async fn wait_for_network_idle(&mut self, timeout: Duration) -> BrowserResult<()>;

    /// Evaluates a JavaScript expression and returns its JSON value
    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Returns true if at least one element matches `selector`
    async fn query_selector(&mut self, selector: &str) -> BrowserResult<bool>;

    /// Returns `attribute` of every element matching `selector`, in document order
    ///
    /// Elements without the attribute yield `None`.
    async fn query_selector_all_attr(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> BrowserResult<Vec<Option<String>>>;

    /// Clicks the first element matching `selector`
    async fn click(&mut self, selector: &str) -> BrowserResult<()>;

    /// Removes every element matching `selector` from the rendered tree
    ///
    /// Returns the number of elements removed.
    async fn remove_elements(&mut self, selector: &str) -> BrowserResult<usize>;

    /// Returns the full serialized markup of the rendered document
    async fn read_full_markup(&mut self) -> BrowserResult<String>;

    /// Scrolls the viewport to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> BrowserResult<()>;

    /// Returns the current scroll height of the document in pixels
    async fn content_height(&mut self) -> BrowserResult<u64>;

    /// Closes the page
    async fn close(&mut self) -> BrowserResult<()>;
}

/// An acquired rendering engine
///
/// A session is opened once per run and must be closed once at the end,
/// whatever the outcome of the run.
#[async_trait]
pub trait BrowserSession: Send {
    type Page: BrowserPage;

    /// Opens a fresh blank page
    async fn open_page(&mut self) -> BrowserResult<Self::Page>;

    /// Releases the engine
    async fn close(&mut self) -> BrowserResult<()>;
}
