//! In-memory page used by unit tests

use crate::browser::{BrowserError, BrowserPage, BrowserResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// How a consent overlay behaves on a scripted document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Decline control present and clicking it dismisses the overlay
    Declinable,
    /// Decline control present but clicking it leaves the overlay in place
    Sticky,
    /// Overlay without a decline control
    NoDecline,
}

#[derive(Debug, Clone)]
pub struct ScriptedDoc {
    pub markup: String,
    pub hrefs: Vec<Option<String>>,
    /// Successive `content_height` readings; the last one repeats
    pub heights: Vec<u64>,
    pub overlay: Overlay,
    pub idle: bool,
}

impl ScriptedDoc {
    pub fn new(markup: &str) -> Self {
        Self {
            markup: markup.to_string(),
            hrefs: Vec::new(),
            heights: vec![1000],
            overlay: Overlay::None,
            idle: true,
        }
    }

    pub fn hrefs(mut self, hrefs: &[&str]) -> Self {
        self.hrefs = hrefs.iter().map(|h| Some(h.to_string())).collect();
        self
    }

    pub fn heights(mut self, heights: &[u64]) -> Self {
        self.heights = heights.to_vec();
        self
    }

    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn never_idle(mut self) -> Self {
        self.idle = false;
        self
    }
}

pub const OVERLAY: &str = ".consent";
pub const DECLINE: &str = ".decline";

/// The decline control as addressed from inside the overlay
const SCOPED_DECLINE: &str = ".consent .decline";

#[derive(Debug, Default)]
pub struct ScriptedPage {
    docs: HashMap<String, ScriptedDoc>,
    unreachable: HashSet<String>,
    current: Option<String>,
    overlay_present: bool,
    height_reads: usize,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub clicks: usize,
    pub removed: usize,
    pub scripts: Vec<String>,
    pub closed: bool,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, url: &str, doc: ScriptedDoc) -> Self {
        self.docs.insert(url.to_string(), doc);
        self
    }

    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// Loads `url` without going through `navigate`
    pub fn load(url: &str, doc: ScriptedDoc) -> Self {
        let mut page = Self::new().with_doc(url, doc);
        page.open(url);
        page
    }

    pub fn overlay_present(&self) -> bool {
        self.overlay_present
    }

    fn open(&mut self, url: &str) {
        self.overlay_present = self
            .docs
            .get(url)
            .map(|d| d.overlay != Overlay::None)
            .unwrap_or(false);
        self.height_reads = 0;
        self.current = Some(url.to_string());
    }

    fn doc(&self) -> BrowserResult<&ScriptedDoc> {
        self.current
            .as_ref()
            .and_then(|url| self.docs.get(url))
            .ok_or(BrowserError::Closed)
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.navigations.push(url.to_string());
        if self.unreachable.contains(url) || !self.docs.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.open(url);
        Ok(())
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> BrowserResult<()> {
        if self.doc()?.idle {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(BrowserError::Timeout {
                operation: "network idle",
                timeout,
            })
        }
    }

    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value> {
        self.scripts.push(script.to_string());
        Ok(serde_json::Value::Null)
    }

    async fn query_selector(&mut self, selector: &str) -> BrowserResult<bool> {
        let overlay = self.doc()?.overlay;
        Ok(match selector {
            OVERLAY => self.overlay_present,
            SCOPED_DECLINE => {
                self.overlay_present && matches!(overlay, Overlay::Declinable | Overlay::Sticky)
            }
            _ => false,
        })
    }

    async fn query_selector_all_attr(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> BrowserResult<Vec<Option<String>>> {
        if selector == "a" && attribute == "href" {
            Ok(self.doc()?.hrefs.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        let present = self.query_selector(selector).await?;
        if !present {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }
        self.clicks += 1;
        if selector == SCOPED_DECLINE && self.doc()?.overlay == Overlay::Declinable {
            self.overlay_present = false;
        }
        Ok(())
    }

    async fn remove_elements(&mut self, selector: &str) -> BrowserResult<usize> {
        if selector == OVERLAY && self.overlay_present {
            self.overlay_present = false;
            self.removed += 1;
            return Ok(1);
        }
        Ok(0)
    }

    async fn read_full_markup(&mut self) -> BrowserResult<String> {
        Ok(self.doc()?.markup.clone())
    }

    async fn scroll_to_bottom(&mut self) -> BrowserResult<()> {
        self.doc()?;
        self.scrolls += 1;
        Ok(())
    }

    async fn content_height(&mut self) -> BrowserResult<u64> {
        let heights = &self.doc()?.heights;
        let height = heights
            .get(self.height_reads)
            .or_else(|| heights.last())
            .copied()
            .unwrap_or(0);
        self.height_reads += 1;
        Ok(height)
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.closed = true;
        Ok(())
    }
}
