//! Lazy-load exhaustion
//!
//! Scroll-driven pages only insert more content when the viewport reaches
//! the bottom. We scroll, wait, and re-measure until the document height
//! stops changing. The iteration cap makes this a bounded approximation:
//! a page that keeps growing is captured as it stands when the cap is hit.

use crate::browser::BrowserPage;
use crate::config::CaptureConfig;
use tokio::time::sleep;

/// Summary of one exhaustion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyLoadOutcome {
    /// Scroll rounds performed
    pub iterations: u32,

    /// Last height reading in pixels
    pub final_height: u64,

    /// True if two consecutive readings matched before the cap
    pub stabilized: bool,
}

/// Scrolls until the content height reaches a fixed point or the cap is hit
///
/// A browser error ends the pass early; it is logged and the page is
/// captured as it stands.
pub async fn exhaust_lazy_loading<P: BrowserPage + ?Sized>(
    page: &mut P,
    config: &CaptureConfig,
) -> LazyLoadOutcome {
    let mut outcome = LazyLoadOutcome {
        iterations: 0,
        final_height: 0,
        stabilized: false,
    };

    let mut previous = match page.content_height().await {
        Ok(height) => height,
        Err(e) => {
            tracing::warn!("Could not measure content height: {}", e);
            return outcome;
        }
    };
    outcome.final_height = previous;

    while outcome.iterations < config.max_scroll_iterations {
        outcome.iterations += 1;

        if let Err(e) = page.scroll_to_bottom().await {
            tracing::warn!("Scroll failed: {}", e);
            return outcome;
        }

        sleep(config.settle()).await;

        let current = match page.content_height().await {
            Ok(height) => height,
            Err(e) => {
                tracing::warn!("Could not measure content height: {}", e);
                return outcome;
            }
        };
        outcome.final_height = current;

        tracing::debug!(
            iteration = outcome.iterations,
            previous,
            current,
            "Scrolled to bottom"
        );

        if current == previous {
            outcome.stabilized = true;
            return outcome;
        }
        previous = current;
    }

    tracing::warn!(
        iterations = outcome.iterations,
        height = outcome.final_height,
        "Content height still changing at scroll cap"
    );
    outcome
}
