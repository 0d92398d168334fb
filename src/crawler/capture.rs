//! Single page capture
//!
//! Renders one URL completely and persists its markup:
//! navigate → wait for network idle → dismiss consent → exhaust lazy
//! loading → read markup → write under the storage key.
//!
//! Only navigation, markup read and write failures abort a capture. An idle
//! timeout, a stubborn consent overlay or a scroll failure are logged and
//! the page is captured as it stands.

use crate::browser::BrowserPage;
use crate::config::{CaptureConfig, Config, ConsentConfig};
use crate::crawler::consent::{dismiss_consent, ConsentOutcome};
use crate::crawler::lazy_load::{exhaust_lazy_loading, LazyLoadOutcome};
use crate::crawler::markup::extract_title;
use crate::storage::PageStore;
use crate::url::StorageKey;
use crate::{CaptureError, CaptureResult};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Timing and selector settings applied to every capture
#[derive(Debug, Clone)]
pub struct CapturePolicy {
    pub idle_timeout: Duration,
    pub lazy_load: CaptureConfig,
    pub consent: ConsentConfig,
}

impl CapturePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            idle_timeout: config.browser.idle_timeout(),
            lazy_load: config.capture.clone(),
            consent: config.consent.clone(),
        }
    }
}

/// A successfully rendered and persisted page
///
/// Never mutated after creation. A later capture of the same URL produces a
/// new value with the same storage key and overwrites the same file.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub source_url: Url,
    pub storage_key: StorageKey,
    pub markup: Vec<u8>,

    /// Where the store put the markup
    pub path: PathBuf,

    pub title: Option<String>,
    pub consent: ConsentOutcome,
    pub lazy_load: LazyLoadOutcome,

    /// False if the network-idle wait timed out
    pub idle_reached: bool,
}

/// Fully renders `url` in `page` and writes its markup under `key`
pub async fn capture_page<P, S>(
    page: &mut P,
    store: &mut S,
    url: &Url,
    key: &StorageKey,
    policy: &CapturePolicy,
) -> CaptureResult<CapturedPage>
where
    P: BrowserPage + ?Sized,
    S: PageStore + ?Sized,
{
    tracing::debug!(url = %url, key = %key, "Capturing page");

    page.navigate(url.as_str())
        .await
        .map_err(|source| CaptureError::Navigation {
            url: url.to_string(),
            source,
        })?;

    let idle_reached = match page.wait_for_network_idle(policy.idle_timeout).await {
        Ok(()) => true,
        Err(e) if e.is_timeout() => {
            let soft = CaptureError::IdleTimeout {
                url: url.to_string(),
                timeout: policy.idle_timeout,
            };
            tracing::warn!("{}; capturing what has rendered", soft);
            false
        }
        Err(e) => {
            tracing::warn!(url = %url, "Network idle wait failed: {}", e);
            false
        }
    };

    let consent = dismiss_consent(page, &policy.consent).await;
    if !consent.is_cleared() {
        tracing::warn!(url = %url, "Consent overlay could not be cleared; capturing anyway");
    }

    let lazy_load = exhaust_lazy_loading(page, &policy.lazy_load).await;

    let html = page
        .read_full_markup()
        .await
        .map_err(|source| CaptureError::Render {
            url: url.to_string(),
            source,
        })?;

    let title = extract_title(&html);
    let markup = html.into_bytes();

    let path = store
        .write(key, &markup)
        .map_err(|source| CaptureError::Write {
            path: store.location(key),
            source,
        })?;

    tracing::info!(
        url = %url,
        path = %path.display(),
        bytes = markup.len(),
        scrolls = lazy_load.iterations,
        "Captured page"
    );

    Ok(CapturedPage {
        source_url: url.clone(),
        storage_key: key.clone(),
        markup,
        path,
        title,
        consent,
        lazy_load,
        idle_reached,
    })
}
