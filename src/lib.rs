//! Review-Mirror: an offline mirror of a reviewer's rendered pages
//!
//! This crate drives a headless browser through a user's paginated review
//! listings, renders every review detail page linked from them, and writes
//! the fully rendered markup to a deterministic location on disk.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for Review-Mirror runs
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser session error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("None of the {attempted} listing pages could be captured")]
    NoListingCaptured { attempted: u32 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL has no path segments to map: {0}")]
    EmptyPath(String),
}

/// Failures of a single page capture
///
/// `IdleTimeout` and `ConsentHandling` are soft: they are logged where they
/// happen and the capture carries on. `Extraction` never fails a listing
/// capture. The remaining variants abort the capture of one URL only.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        source: browser::BrowserError,
    },

    #[error("Network did not go idle on {url} within {timeout:?}")]
    IdleTimeout { url: String, timeout: Duration },

    #[error("Consent overlay handling failed: {0}")]
    ConsentHandling(String),

    #[error("Link extraction failed for {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Could not read rendered markup of {url}: {source}")]
    Render {
        url: String,
        source: browser::BrowserError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: storage::StorageError,
    },

    #[error("No storage key for {url}: {source}")]
    StorageKey { url: String, source: UrlError },
}

impl CaptureError {
    /// Returns true for errors that must not abort a capture
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::IdleTimeout { .. } | Self::ConsentHandling(_) | Self::Extraction { .. }
        )
    }
}

/// Result type alias for Review-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for single page captures
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

// Re-export commonly used types
pub use config::Config;
pub use output::CrawlReport;
pub use state::{CrawlPhase, PageState};
pub use url::{normalize_page_url, StorageKey};
