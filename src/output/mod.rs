//! Output module for run reports
//!
//! This module handles:
//! - Recording the outcome of every attempted URL
//! - Printing the per-URL report to stdout
//! - Writing the same report as markdown

mod markdown;
mod report;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use report::{failure_state, print_report, CrawlReport, PageOutcome};
