//! Headless Chromium backend
//!
//! Drives Chromium over the DevTools protocol with `chromiumoxide`. The CDP
//! event handler is drained on its own tokio task for the lifetime of the
//! session.

use crate::browser::{BrowserError, BrowserPage, BrowserResult, BrowserSession};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Quiet period after which the network is considered idle (milliseconds)
const NETWORK_IDLE_WINDOW_MS: u64 = 500;

/// Polling interval of the network-idle heuristic (milliseconds)
const NETWORK_IDLE_POLL_MS: u64 = 100;

const SCROLL_TO_BOTTOM_SCRIPT: &str = "(() => { window.scrollTo(0, document.body ? document.body.scrollHeight : document.documentElement.scrollHeight); return true; })()";

const CONTENT_HEIGHT_SCRIPT: &str = "(() => Math.max(document.body ? document.body.scrollHeight : 0, document.documentElement ? document.documentElement.scrollHeight : 0))()";

const OUTER_HTML_SCRIPT: &str = "document.documentElement.outerHTML";

/// A launched Chromium process
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// Launches Chromium according to `config`
    pub async fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        let mut builder = CdpBrowserConfig::builder()
            .window_size(config.window_width, config.window_height)
            .request_timeout(config.navigation_timeout())
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--mute-audio");

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref chrome_path) = config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let cdp_config = builder.build().map_err(BrowserError::Launch)?;

        tracing::info!(headless = config.headless, "Launching headless browser");

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            navigation_timeout: config.navigation_timeout(),
            closed: false,
        })
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    async fn open_page(&mut self) -> BrowserResult<ChromePage> {
        if self.closed {
            return Err(BrowserError::Closed);
        }

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;

        Ok(ChromePage {
            page: Some(page),
            navigation_timeout: self.navigation_timeout,
        })
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()));

        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();

        tracing::info!("Headless browser closed");
        closed.map(|_| ())
    }
}

/// A Chromium tab
pub struct ChromePage {
    page: Option<Page>,
    navigation_timeout: Duration,
}

impl ChromePage {
    fn page(&self) -> BrowserResult<&Page> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }

    async fn eval_value(&self, script: String) -> BrowserResult<serde_json::Value> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}

/// Quotes a string as a JavaScript literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        let page = self.page()?;

        match tokio::time::timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(BrowserError::Timeout {
                operation: "navigation",
                timeout: self.navigation_timeout,
            }),
        }
    }

    async fn wait_for_network_idle(&mut self, timeout: Duration) -> BrowserResult<()> {
        // No network-idle lifecycle wait in CDP bindings; poll resource
        // timing entries until they stop growing for a quiet window.
        let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;
        let script = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = {idle_ms};
                const interval = {poll_ms};
                const start = Date.now();
                const count = () => {{
                    try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return 0; }}
                }};
                let last = count();
                let stable = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const current = count();
                    if (document.readyState === 'complete' && current === last) {{
                        stable += interval;
                        if (stable >= idleMs) {{ return {{ ok: true }}; }}
                    }} else {{
                        stable = 0;
                    }}
                    last = current;
                }}
                return {{ ok: false }};
            }})()"#,
            timeout_ms = timeout_ms,
            idle_ms = NETWORK_IDLE_WINDOW_MS,
            poll_ms = NETWORK_IDLE_POLL_MS,
        );

        let guard = timeout + Duration::from_secs(1);
        let value = match tokio::time::timeout(guard, self.eval_value(script)).await {
            Ok(value) => value?,
            Err(_) => {
                return Err(BrowserError::Timeout {
                    operation: "network idle",
                    timeout,
                })
            }
        };

        if value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                operation: "network idle",
                timeout,
            })
        }
    }

    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value> {
        self.eval_value(script.to_string()).await
    }

    async fn query_selector(&mut self, selector: &str) -> BrowserResult<bool> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let value = self.eval_value(script).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn query_selector_all_attr(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> BrowserResult<Vec<Option<String>>> {
        let script = format!(
            "Array.from(document.querySelectorAll({}), el => el.getAttribute({}))",
            js_string(selector),
            js_string(attribute)
        );
        let value = self.eval_value(script).await?;

        serde_json::from_value(value).map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;

        Ok(())
    }

    async fn remove_elements(&mut self, selector: &str) -> BrowserResult<usize> {
        let script = format!(
            "(() => {{ const els = document.querySelectorAll({}); els.forEach(el => el.remove()); return els.length; }})()",
            js_string(selector)
        );
        let value = self.eval_value(script).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn read_full_markup(&mut self) -> BrowserResult<String> {
        if let Ok(serde_json::Value::String(html)) =
            self.eval_value(OUTER_HTML_SCRIPT.to_string()).await
        {
            if !html.is_empty() {
                return Ok(html);
            }
        }

        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn scroll_to_bottom(&mut self) -> BrowserResult<()> {
        self.eval_value(SCROLL_TO_BOTTOM_SCRIPT.to_string()).await?;
        Ok(())
    }

    async fn content_height(&mut self) -> BrowserResult<u64> {
        let value = self.eval_value(CONTENT_HEIGHT_SCRIPT.to_string()).await?;
        value
            .as_f64()
            .map(|h| h.max(0.0) as u64)
            .ok_or_else(|| BrowserError::Script(format!("unexpected height value: {}", value)))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        }
        Ok(())
    }
}
