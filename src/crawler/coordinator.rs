//! Crawler coordinator - main crawl orchestration logic
//!
//! A run has two sequential phases and never re-enters one:
//!
//! 1. **Discovery**: every listing page of the target is captured and its
//!    anchors are merged into the frontier.
//! 2. **Detail**: the frontier is snapshotted and every URL in the snapshot
//!    is captured once.
//!
//! Failures are caught per URL, logged with the URL and phase, and recorded
//! in the report. Only acquiring or releasing the browser session can fail
//! a whole run.

use crate::browser::{BrowserPage, BrowserSession, ChromeSession};
use crate::config::Config;
use crate::crawler::capture::{capture_page, CapturePolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::links::extract_links;
use crate::output::{CrawlReport, PageOutcome};
use crate::state::{CrawlPhase, PageState};
use crate::storage::{FsStore, PageStore};
use crate::url::{detail_key, normalize_page_url, CrawlTarget};
use crate::{CaptureError, MirrorError};
use std::collections::HashMap;
use url::Url;

/// Main crawler coordinator structure
///
/// Owns the frontier and the report for one run. The page and the store are
/// borrowed for the duration of [`Coordinator::run`].
pub struct Coordinator {
    target: CrawlTarget,
    detail_pattern: String,
    policy: CapturePolicy,
    frontier: Frontier,
    report: CrawlReport,

    /// Lifecycle of every URL seen this run, keyed by normalized URL
    states: HashMap<String, PageState>,
}

impl Coordinator {
    /// Creates a coordinator for the target described by `config`
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `config_hash` - Hash of the configuration file, carried into the report
    pub fn new(config: &Config, config_hash: &str) -> Result<Self, MirrorError> {
        let base_url = Url::parse(&config.target.base_url)?;
        let target = CrawlTarget::new(&base_url, &config.target.account, config.target.pages)?;

        Ok(Self {
            report: CrawlReport::new(target.account(), config.target.pages, config_hash),
            target,
            detail_pattern: config.target.detail_pattern(),
            policy: CapturePolicy::from_config(config),
            frontier: Frontier::new(),
            states: HashMap::new(),
        })
    }

    /// Runs both phases to completion on `page`, writing into `store`
    ///
    /// Never fails: every per-URL error ends up in the returned report.
    pub async fn run<P, S>(mut self, page: &mut P, store: &mut S) -> CrawlReport
    where
        P: BrowserPage + ?Sized,
        S: PageStore + ?Sized,
    {
        tracing::info!(
            account = %self.target.account(),
            listings = self.target.len(),
            pattern = %self.detail_pattern,
            "Starting crawl"
        );

        self.discover(page, store).await;

        let snapshot = self.frontier.snapshot();
        self.report.frontier_size = snapshot.len();

        self.capture_details(page, store, &snapshot).await;

        self.report.finish();
        tracing::info!(
            captured = self.report.captured(),
            failed = self.report.failed(),
            "Crawl completed"
        );
        self.report
    }

    /// Discovery phase: capture each listing page and grow the frontier
    async fn discover<P, S>(&mut self, page: &mut P, store: &mut S)
    where
        P: BrowserPage + ?Sized,
        S: PageStore + ?Sized,
    {
        let phase = CrawlPhase::Discovery;
        let listings = self.target.listings().to_vec();

        for listing in &listings {
            self.set_state(&listing.url, PageState::Discovered);
        }

        for listing in &listings {
            if !self.begin_capture(&listing.url) {
                continue;
            }
            tracing::debug!(
                phase = %phase,
                url = %listing.url,
                state = %PageState::Capturing,
                "Listing page {}/{}",
                listing.index,
                listings.len()
            );

            let outcome =
                match capture_page(page, store, &listing.url, &listing.key, &self.policy).await {
                    Ok(captured) => {
                        match extract_links(page, &listing.url, &self.detail_pattern).await {
                            Ok(links) => {
                                let added = self.frontier.extend(&links);
                                for link in &links {
                                    self.discovered(link);
                                }
                                tracing::info!(
                                    phase = %phase,
                                    url = %listing.url,
                                    found = links.len(),
                                    added,
                                    frontier = self.frontier.len(),
                                    "Merged detail links"
                                );
                            }
                            Err(e) => log_failure(phase, &listing.url, &e),
                        }
                        PageOutcome::captured(phase, &captured)
                    }
                    Err(e) => {
                        log_failure(phase, &listing.url, &e);
                        PageOutcome::failed(phase, listing.url.as_str(), Some(listing.key.clone()), &e)
                    }
                };

            self.set_state(&listing.url, outcome.state);
            self.report.record(outcome);
        }
    }

    /// Detail phase: capture each URL of the frontier snapshot once
    async fn capture_details<P, S>(&mut self, page: &mut P, store: &mut S, snapshot: &[Url])
    where
        P: BrowserPage + ?Sized,
        S: PageStore + ?Sized,
    {
        let phase = CrawlPhase::Detail;
        tracing::info!(phase = %phase, urls = snapshot.len(), "Starting detail phase");

        for (position, url) in snapshot.iter().enumerate() {
            if !self.begin_capture(url) {
                tracing::debug!(phase = %phase, url = %url, "Already captured this run");
                continue;
            }

            let key = match detail_key(url) {
                Ok(key) => key,
                Err(source) => {
                    let e = CaptureError::StorageKey {
                        url: url.to_string(),
                        source,
                    };
                    log_failure(phase, url, &e);
                    let outcome = PageOutcome::failed(phase, url.as_str(), None, &e);
                    self.set_state(url, outcome.state);
                    self.report.record(outcome);
                    continue;
                }
            };

            tracing::debug!(
                phase = %phase,
                url = %url,
                key = %key,
                "Detail page {}/{}",
                position + 1,
                snapshot.len()
            );

            let outcome = match capture_page(page, store, url, &key, &self.policy).await {
                Ok(captured) => PageOutcome::captured(phase, &captured),
                Err(e) => {
                    log_failure(phase, url, &e);
                    PageOutcome::failed(phase, url.as_str(), Some(key), &e)
                }
            };

            self.set_state(url, outcome.state);
            self.report.record(outcome);
        }
    }

    fn set_state(&mut self, url: &Url, state: PageState) {
        self.states.insert(state_key(url), state);
    }

    /// Records a frontier URL unless it already has a state
    fn discovered(&mut self, url: &Url) {
        self.states
            .entry(state_key(url))
            .or_insert(PageState::Discovered);
    }

    /// Moves `url` to `Capturing`; returns false if it was already attempted
    fn begin_capture(&mut self, url: &Url) -> bool {
        let state = self
            .states
            .entry(state_key(url))
            .or_insert(PageState::Discovered);

        if state.is_terminal() || *state == PageState::Capturing {
            return false;
        }
        *state = PageState::Capturing;
        true
    }
}

fn state_key(url: &Url) -> String {
    normalize_page_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Logs a per-URL failure at the level its kind calls for
fn log_failure(phase: CrawlPhase, url: &Url, error: &CaptureError) {
    if error.is_soft() {
        tracing::warn!(phase = %phase, url = %url, "{}", error);
    } else {
        tracing::error!(phase = %phase, url = %url, "{}", error);
    }
}

/// Runs a crawl on an already acquired session
///
/// Opens one page, runs both phases on it, closes the page, and closes the
/// session on every path. An error opening the page or closing the session
/// is fatal to the run.
pub async fn run_session<B, S>(
    config: &Config,
    config_hash: &str,
    session: &mut B,
    store: &mut S,
) -> Result<CrawlReport, MirrorError>
where
    B: BrowserSession + ?Sized,
    S: PageStore + ?Sized,
{
    let result = crawl_on_session(config, config_hash, session, store).await;

    let closed = session.close().await;
    if let Err(e) = &closed {
        tracing::error!("Failed to close browser session: {}", e);
    }

    let report = result?;
    closed?;
    Ok(report)
}

async fn crawl_on_session<B, S>(
    config: &Config,
    config_hash: &str,
    session: &mut B,
    store: &mut S,
) -> Result<CrawlReport, MirrorError>
where
    B: BrowserSession + ?Sized,
    S: PageStore + ?Sized,
{
    let coordinator = Coordinator::new(config, config_hash)?;
    let mut page = session.open_page().await?;

    let report = coordinator.run(&mut page, store).await;

    if let Err(e) = page.close().await {
        tracing::warn!("Failed to close page: {}", e);
    }

    Ok(report)
}

/// Runs the main crawl operation
///
/// Prepares the output root, launches Chromium and hands both to
/// [`run_session`].
///
/// # Example
///
/// ```no_run
/// use review_mirror::config::load_config_with_hash;
/// use review_mirror::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("mirror.toml"))?;
/// let report = run_crawl(&config, &hash).await?;
/// println!("{} pages captured", report.captured());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<CrawlReport, MirrorError> {
    let mut store = FsStore::new(&config.output.root, config.output.extension.as_str());
    store.ensure_root()?;

    tracing::info!(root = %store.root().display(), "Writing pages under output root");

    let mut session = ChromeSession::launch(&config.browser).await?;
    run_session(config, config_hash, &mut session, &mut store).await
}
