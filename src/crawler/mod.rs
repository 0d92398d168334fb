//! Crawler module for rendering and capturing pages
//!
//! This module contains the core crawling logic, including:
//! - Consent overlay dismissal and lazy-load exhaustion
//! - Link extraction and the detail-URL frontier
//! - Single page capture
//! - Overall crawl coordination

mod capture;
mod consent;
mod coordinator;
mod frontier;
mod lazy_load;
mod links;
mod markup;

pub use capture::{capture_page, CapturePolicy, CapturedPage};
pub use consent::{dismiss_consent, ConsentOutcome};
pub use coordinator::{run_crawl, run_session, Coordinator};
pub use frontier::Frontier;
pub use lazy_load::{exhaust_lazy_loading, LazyLoadOutcome};
pub use links::{extract_links, filter_links, resolve_href};
pub use markup::extract_title;
