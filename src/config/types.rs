use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default account when none is configured
pub const DEFAULT_ACCOUNT: &str = "default_username";

/// Main configuration structure for Review-Mirror
///
/// Every section and key is optional; missing values take the defaults
/// below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub browser: BrowserConfig,
    pub capture: CaptureConfig,
    pub consent: ConsentConfig,
    pub output: OutputConfig,
}

/// What to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Account whose review pages are mirrored
    pub account: String,

    /// Site root the listing URLs are built under
    pub base_url: String,

    /// Number of listing pages to crawl
    pub pages: u32,

    /// Path fragment identifying detail pages (defaults to `/<account>/film/`)
    pub detail_pattern: Option<String>,
}

impl TargetConfig {
    /// Returns the configured detail pattern or the per-account default
    pub fn detail_pattern(&self) -> String {
        self.detail_pattern
            .clone()
            .unwrap_or_else(|| format!("/{}/film/", self.account))
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            base_url: "https://letterboxd.com".to_string(),
            pages: 3,
            detail_pattern: None,
        }
    }
}

/// Headless browser settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    pub headless: bool,

    /// Chrome/Chromium executable (auto-detected when unset)
    pub chrome_path: Option<PathBuf>,

    pub window_width: u32,
    pub window_height: u32,

    /// Bound on a single navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Bound on the network-idle wait after navigation (milliseconds)
    pub idle_timeout_ms: u64,
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 800,
            navigation_timeout_ms: 30_000,
            idle_timeout_ms: 15_000,
        }
    }
}

/// Lazy-load exhaustion settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CaptureConfig {
    /// Wait after each scroll for content insertion (milliseconds)
    pub settle_ms: u64,

    /// Upper bound on scroll rounds per page
    pub max_scroll_iterations: u32,
}

impl CaptureConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_ms: 1_000,
            max_scroll_iterations: 20,
        }
    }
}

/// Consent interstitial selectors and timings
///
/// The selectors are tied to the third-party consent widget's markup and
/// are only ever read from here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConsentConfig {
    /// Root element of the blocking overlay
    pub overlay_selector: String,

    /// "Do not consent" control, matched only inside the overlay
    pub decline_selector: String,

    /// How long to wait for the overlay to appear (milliseconds)
    pub timeout_ms: u64,

    /// Interval between overlay probes (milliseconds)
    pub poll_ms: u64,

    /// Wait after activating the decline control (milliseconds)
    pub settle_ms: u64,
}

impl ConsentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Decline selector scoped to descendants of the overlay
    ///
    /// Both selectors must be single compound selectors; a selector list
    /// (`a, b`) would only be scoped in its first branch.
    pub fn decline_control_selector(&self) -> String {
        format!("{} {}", self.overlay_selector.trim(), self.decline_selector.trim())
    }
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            overlay_selector: ".fc-consent-root".to_string(),
            decline_selector: ".fc-cta-do-not-consent".to_string(),
            timeout_ms: 10_000,
            poll_ms: 250,
            settle_ms: 1_000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory every storage key is written under
    pub root: PathBuf,

    /// Extension appended to the final `index` component
    pub extension: String,

    /// Where to write the markdown run report, if anywhere
    pub summary_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/html"),
            extension: "html".to_string(),
            summary_path: None,
        }
    }
}
