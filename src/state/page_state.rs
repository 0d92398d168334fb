/// Page state definitions for tracking crawl progress
///
/// This module defines every state a page can be in during a run, and the
/// phase of the run that attempted it.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page URL is known (listing URL built or detail URL discovered)
    Discovered,

    /// Page is being rendered and written
    Capturing,

    // ===== Terminal Success States =====
    /// Rendered markup was written to its storage key
    Captured,

    // ===== Terminal Error States =====
    /// Navigation failed (unreachable host, TLS error, load timeout)
    NavigationFailed,

    /// Page loaded but its markup could not be read, or it has no storage key
    RenderFailed,

    /// Markup could not be written to disk
    WriteFailed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Discovered | Self::Capturing)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Captured)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::NavigationFailed | Self::RenderFailed | Self::WriteFailed
        )
    }

    /// Stable string form used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Capturing => "capturing",
            Self::Captured => "captured",
            Self::NavigationFailed => "navigation_failed",
            Self::RenderFailed => "render_failed",
            Self::WriteFailed => "write_failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Discovered,
            Self::Capturing,
            Self::Captured,
            Self::NavigationFailed,
            Self::RenderFailed,
            Self::WriteFailed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two sequential phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrawlPhase {
    /// Listing pages are captured and link-extracted
    Discovery,

    /// Frontier snapshot of detail pages is captured
    Detail,
}

impl CrawlPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
