//! Per-run report
//!
//! One [`PageOutcome`] is recorded for every URL the run attempted, in
//! attempt order. Counts are derived from the outcomes, never stored.

use crate::crawler::CapturedPage;
use crate::state::{CrawlPhase, PageState};
use crate::url::StorageKey;
use crate::CaptureError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Result of one attempted URL
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub url: String,
    pub phase: CrawlPhase,

    /// Always a terminal state
    pub state: PageState,

    /// None if no key could be derived from the URL
    pub storage_key: Option<StorageKey>,

    /// Where the markup was written, for captured pages
    pub path: Option<PathBuf>,

    pub bytes: usize,
    pub title: Option<String>,
    pub error: Option<String>,
}

impl PageOutcome {
    pub fn captured(phase: CrawlPhase, page: &CapturedPage) -> Self {
        Self {
            url: page.source_url.to_string(),
            phase,
            state: PageState::Captured,
            storage_key: Some(page.storage_key.clone()),
            path: Some(page.path.clone()),
            bytes: page.markup.len(),
            title: page.title.clone(),
            error: None,
        }
    }

    pub fn failed(
        phase: CrawlPhase,
        url: &str,
        storage_key: Option<StorageKey>,
        error: &CaptureError,
    ) -> Self {
        Self {
            url: url.to_string(),
            phase,
            state: failure_state(error),
            storage_key,
            path: None,
            bytes: 0,
            title: None,
            error: Some(error.to_string()),
        }
    }
}

/// Maps a hard capture failure to the terminal state it leaves the page in
pub fn failure_state(error: &CaptureError) -> PageState {
    match error {
        CaptureError::Navigation { .. } => PageState::NavigationFailed,
        CaptureError::Write { .. } => PageState::WriteFailed,
        CaptureError::Render { .. }
        | CaptureError::StorageKey { .. }
        | CaptureError::IdleTimeout { .. }
        | CaptureError::ConsentHandling(_)
        | CaptureError::Extraction { .. } => PageState::RenderFailed,
    }
}

/// Everything a finished run has to say about itself
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,
    pub account: String,

    /// Listing pages the target was built with
    pub listing_pages: u32,

    /// Unique detail URLs discovered during the discovery phase
    pub frontier_size: usize,

    pub outcomes: Vec<PageOutcome>,
}

impl CrawlReport {
    pub fn new(account: &str, listing_pages: u32, config_hash: &str) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            account: account.to_string(),
            listing_pages,
            frontier_size: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: PageOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn captured(&self) -> usize {
        self.outcomes.iter().filter(|o| o.state.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.state.is_error()).count()
    }

    /// (captured, failed) for one phase
    pub fn phase_counts(&self, phase: CrawlPhase) -> (usize, usize) {
        self.outcomes
            .iter()
            .filter(|o| o.phase == phase)
            .fold((0, 0), |(ok, err), o| {
                if o.state.is_success() {
                    (ok + 1, err)
                } else {
                    (ok, err + 1)
                }
            })
    }

    /// Returns true if at least one listing page was captured
    pub fn listing_captured(&self) -> bool {
        self.phase_counts(CrawlPhase::Discovery).0 > 0
    }

    /// Number of outcomes per terminal state, in lifecycle order
    pub fn state_counts(&self) -> Vec<(PageState, usize)> {
        PageState::all_states()
            .into_iter()
            .filter(|state| state.is_terminal())
            .map(|state| {
                let count = self.outcomes.iter().filter(|o| o.state == state).count();
                (state, count)
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PageOutcome> {
        self.outcomes.iter().filter(|o| o.state.is_error())
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            (self.captured() as f64 / self.outcomes.len() as f64) * 100.0
        }
    }
}

/// Prints the per-URL report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Review Mirror Report ===\n");

    println!("Account: {}", report.account);
    println!("Config hash: {}", report.config_hash);
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    for phase in [CrawlPhase::Discovery, CrawlPhase::Detail] {
        let (ok, err) = report.phase_counts(phase);
        println!("{} phase: {} captured, {} failed", phase, ok, err);

        for outcome in report.outcomes.iter().filter(|o| o.phase == phase) {
            match (&outcome.path, &outcome.error) {
                (Some(path), _) => {
                    println!("  ✓ {} -> {}", outcome.url, path.display())
                }
                (None, Some(error)) => {
                    println!("  ✗ {} [{}] {}", outcome.url, outcome.state, error)
                }
                (None, None) => println!("  ? {} [{}]", outcome.url, outcome.state),
            }
        }
        println!();
    }

    println!("Frontier: {} unique detail URLs", report.frontier_size);
    println!(
        "Success Rate: {:.1}% ({} / {} pages captured)",
        report.success_rate(),
        report.captured(),
        report.attempted()
    );
}
