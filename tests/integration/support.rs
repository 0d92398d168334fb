//! In-memory site and browser session for end-to-end tests
//!
//! Pages are fixture HTML keyed by URL. Selector queries run against the
//! fixture with `scraper`, so anchors seen by the crawler are exactly the
//! ones written in the fixture.

use async_trait::async_trait;
use review_mirror::browser::{BrowserError, BrowserPage, BrowserResult, BrowserSession};
use review_mirror::config::Config;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "https://example.test";

/// Configuration pointing at the fake site with short waits
pub fn test_config(account: &str, pages: u32) -> Config {
    let mut config = Config::default();
    config.target.account = account.to_string();
    config.target.base_url = BASE.to_string();
    config.target.pages = pages;
    config.capture.settle_ms = 10;
    config.consent.timeout_ms = 100;
    config.consent.poll_ms = 50;
    config.consent.settle_ms = 10;
    config
}

pub fn listing(account: &str, index: u32) -> String {
    format!("{}/{}/films/reviews/page/{}/", BASE, account, index)
}

/// Builds a listing fixture linking to `hrefs`
pub fn listing_html(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">review</a>\n", href))
        .collect();
    format!(
        "<html><head><title>Reviews</title></head><body>{}</body></html>",
        anchors
    )
}

pub fn detail_html(title: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><p>review of {}</p></body></html>",
        title, title
    )
}

#[derive(Default)]
struct SiteState {
    pages: HashMap<String, String>,
    unreachable: HashSet<String>,
    navigations: Vec<String>,
}

/// Shared fixture site; clones observe the same state
#[derive(Clone, Default)]
pub struct FakeSite {
    state: Arc<Mutex<SiteState>>,
    session_closes: Arc<AtomicUsize>,
    page_closes: Arc<AtomicUsize>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.set_page(url, html);
        self
    }

    pub fn with_unreachable(self, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .unreachable
            .insert(url.to_string());
        self
    }

    pub fn set_page(&self, url: &str, html: &str) {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.to_string());
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn navigations_to(&self, url: &str) -> usize {
        self.navigations().iter().filter(|u| *u == url).count()
    }

    pub fn session_closes(&self) -> usize {
        self.session_closes.load(Ordering::SeqCst)
    }

    pub fn page_closes(&self) -> usize {
        self.page_closes.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            site: self.clone(),
            fail_open: false,
        }
    }

    /// A session whose `open_page` always fails
    pub fn broken_session(&self) -> FakeSession {
        FakeSession {
            site: self.clone(),
            fail_open: true,
        }
    }
}

pub struct FakeSession {
    site: FakeSite,
    fail_open: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn open_page(&mut self) -> BrowserResult<FakePage> {
        if self.fail_open {
            return Err(BrowserError::Protocol("target crashed".to_string()));
        }
        Ok(FakePage {
            site: self.site.clone(),
            markup: None,
        })
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.site.session_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    site: FakeSite,
    markup: Option<String>,
}

impl FakePage {
    fn markup(&self) -> BrowserResult<&str> {
        self.markup.as_deref().ok_or(BrowserError::Closed)
    }

    fn select<T>(
        &self,
        selector: &str,
        project: impl Fn(scraper::ElementRef<'_>) -> T,
    ) -> BrowserResult<Vec<T>> {
        let selector =
            Selector::parse(selector).map_err(|e| BrowserError::Script(format!("{:?}", e)))?;
        let document = Html::parse_document(self.markup()?);
        let found = document.select(&selector).map(project).collect();
        Ok(found)
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        let mut state = self.site.state.lock().unwrap();
        state.navigations.push(url.to_string());

        if state.unreachable.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }

        match state.pages.get(url) {
            Some(html) => {
                self.markup = Some(html.clone());
                Ok(())
            }
            None => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn wait_for_network_idle(&mut self, _timeout: Duration) -> BrowserResult<()> {
        self.markup().map(|_| ())
    }

    async fn evaluate(&mut self, _script: &str) -> BrowserResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn query_selector(&mut self, selector: &str) -> BrowserResult<bool> {
        Ok(!self.select(selector, |_| ())?.is_empty())
    }

    async fn query_selector_all_attr(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> BrowserResult<Vec<Option<String>>> {
        self.select(selector, |el| el.value().attr(attribute).map(String::from))
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        if self.select(selector, |_| ())?.is_empty() {
            return Err(BrowserError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }

    async fn remove_elements(&mut self, selector: &str) -> BrowserResult<usize> {
        Ok(self.select(selector, |_| ())?.len())
    }

    async fn read_full_markup(&mut self) -> BrowserResult<String> {
        self.markup().map(String::from)
    }

    async fn scroll_to_bottom(&mut self) -> BrowserResult<()> {
        self.markup().map(|_| ())
    }

    async fn content_height(&mut self) -> BrowserResult<u64> {
        self.markup().map(|m| m.len() as u64)
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.site.page_closes.fetch_add(1, Ordering::SeqCst);
        self.markup = None;
        Ok(())
    }
}
