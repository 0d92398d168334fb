//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks the state of individual pages (discovered, capturing, captured, failed)
//! - `CrawlPhase`: Which of the two sequential phases attempted a page

mod page_state;

// Re-export main types
pub use page_state::{CrawlPhase, PageState};
