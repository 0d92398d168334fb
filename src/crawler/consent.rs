//! Consent interstitial dismissal
//!
//! Some pages are covered by a consent overlay that hides or blocks the
//! content. Dismissal is best-effort: the goal is that content is reachable,
//! not that a choice was recorded. Nothing here returns an error.

use crate::browser::BrowserPage;
use crate::config::ConsentConfig;
use crate::CaptureError;
use tokio::time::{sleep, Instant};

/// Re-enables scrolling that consent widgets commonly lock
const UNLOCK_SCROLL_SCRIPT: &str = "(() => { for (const el of [document.documentElement, document.body]) { if (el) { el.style.overflow = ''; el.style.position = ''; } } return true; })()";

/// What happened to the consent overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// No overlay appeared within the timeout
    Absent,

    /// The decline control was activated and the overlay went away
    Declined,

    /// The overlay was removed from the rendered tree
    Removed { elements: usize },

    /// The overlay is still there; capture proceeds regardless
    Unresolved { reason: String },
}

impl ConsentOutcome {
    /// Returns true if content should now be reachable
    pub fn is_cleared(&self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}

/// Detects and dismisses the consent overlay on the current page
///
/// 1. Wait up to `config.timeout` for the overlay selector to match
/// 2. Click the decline control inside the overlay and let the page settle
/// 3. If the control is missing, the click fails, or the overlay survives,
///    remove the overlay elements outright
///
/// Safe to call repeatedly: with no overlay present it only probes.
pub async fn dismiss_consent<P: BrowserPage + ?Sized>(
    page: &mut P,
    config: &ConsentConfig,
) -> ConsentOutcome {
    if !wait_for_overlay(page, config).await {
        tracing::debug!("No consent overlay present");
        return ConsentOutcome::Absent;
    }

    tracing::debug!(selector = %config.overlay_selector, "Consent overlay detected");

    match decline(page, config).await {
        Ok(()) => {
            tracing::info!("Consent overlay declined");
            return ConsentOutcome::Declined;
        }
        Err(e) => tracing::warn!("{}; removing overlay instead", e),
    }

    match remove_overlay(page, config).await {
        Ok(elements) => {
            tracing::info!(elements, "Consent overlay removed");
            ConsentOutcome::Removed { elements }
        }
        Err(e) => {
            tracing::warn!("{}", e);
            ConsentOutcome::Unresolved {
                reason: e.to_string(),
            }
        }
    }
}

/// Polls for the overlay until it appears or the timeout elapses
async fn wait_for_overlay<P: BrowserPage + ?Sized>(page: &mut P, config: &ConsentConfig) -> bool {
    let deadline = Instant::now() + config.timeout();

    loop {
        match page.query_selector(&config.overlay_selector).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => tracing::debug!("Consent overlay probe failed: {}", e),
        }

        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(config.poll_interval().min(deadline - now)).await;
    }
}

async fn decline<P: BrowserPage + ?Sized>(
    page: &mut P,
    config: &ConsentConfig,
) -> Result<(), CaptureError> {
    let control = config.decline_control_selector();

    let found = page
        .query_selector(&control)
        .await
        .map_err(|e| CaptureError::ConsentHandling(format!("decline control probe failed: {}", e)))?;

    if !found {
        return Err(CaptureError::ConsentHandling(format!(
            "decline control {} not found",
            control
        )));
    }

    page.click(&control)
        .await
        .map_err(|e| CaptureError::ConsentHandling(format!("decline click failed: {}", e)))?;

    sleep(config.settle()).await;

    match page.query_selector(&config.overlay_selector).await {
        Ok(false) => Ok(()),
        Ok(true) => Err(CaptureError::ConsentHandling(
            "overlay still present after decline".to_string(),
        )),
        Err(e) => Err(CaptureError::ConsentHandling(format!(
            "overlay re-check failed: {}",
            e
        ))),
    }
}

async fn remove_overlay<P: BrowserPage + ?Sized>(
    page: &mut P,
    config: &ConsentConfig,
) -> Result<usize, CaptureError> {
    let elements = page
        .remove_elements(&config.overlay_selector)
        .await
        .map_err(|e| CaptureError::ConsentHandling(format!("overlay removal failed: {}", e)))?;

    if let Err(e) = page.evaluate(UNLOCK_SCROLL_SCRIPT).await {
        tracing::debug!("Could not unlock scrolling: {}", e);
    }

    if elements == 0 {
        return Err(CaptureError::ConsentHandling(
            "overlay matched but nothing was removed".to_string(),
        ));
    }

    Ok(elements)
}
