//! Live page driver speaking CDP to a headless Chromium via chromiumoxide.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::driver::{DriverFactory, PageDriver};
use crate::error::{EngineError, Result};

/// How often polling waits re-probe the page.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches one Chromium process per automation run.
pub struct CdpLauncher {
    pub headless: bool,
}

impl CdpLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl DriverFactory for CdpLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(EngineError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| EngineError::BrowserLaunch(e.to_string()))?;

        // The CDP event stream must be drained for the browser to function.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::BrowserLaunch(e.to_string()))?;

        debug!(target = "salabot", "chromium launched");
        Ok(Box::new(CdpDriver {
            browser,
            page,
            handler_task,
        }))
    }
}

/// One Chromium instance and one page context, exclusively owned by the run
/// that launched it.
pub struct CdpDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl CdpDriver {
    fn timeout_error(timeout: Duration, condition: impl Into<String>) -> EngineError {
        EngineError::Timeout {
            ms: timeout.as_millis() as u64,
            condition: condition.into(),
        }
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(EngineError::Navigation {
                url: url.to_string(),
                message: err.to_string(),
            }),
            Err(_) => Err(Self::timeout_error(timeout, format!("navigation to {url}"))),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let waited = tokio::time::timeout(timeout, async {
            while self.page.find_element(selector).await.is_err() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;
        waited.map_err(|_| Self::timeout_error(timeout, selector.to_string()))
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| EngineError::Page(format!("{selector}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| EngineError::Page(format!("{selector}: {e}")))?;
        element
            .type_str(value)
            .await
            .map_err(|e| EngineError::Page(format!("{selector}: {e}")))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| EngineError::Page(format!("{selector}: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| EngineError::Page(format!("{selector}: {e}")))?;
        Ok(())
    }

    async fn click_item_with_text(&mut self, text: &str) -> Result<()> {
        let escaped = escape_js(text);
        let script = format!(
            "(() => {{\
                const item = Array.from(document.querySelectorAll('li'))\
                    .find(el => (el.textContent || '').includes('{escaped}'));\
                if (!item) return false;\
                item.click();\
                return true;\
            }})()"
        );
        let clicked: bool = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| EngineError::Page(e.to_string()))?
            .into_value()
            .map_err(|e| EngineError::Page(e.to_string()))?;
        if clicked {
            Ok(())
        } else {
            Err(EngineError::Page(format!("no list entry containing {text:?}")))
        }
    }

    async fn wait_for_text_containing(&mut self, marker: &str, timeout: Duration) -> Result<String> {
        let escaped = escape_js(marker);
        let script = format!(
            "(() => {{\
                const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT);\
                while (walker.nextNode()) {{\
                    const node = walker.currentNode;\
                    if (node.nodeValue && node.nodeValue.includes('{escaped}')) {{\
                        return node.parentElement ? node.parentElement.innerText : node.nodeValue;\
                    }}\
                }}\
                return null;\
            }})()"
        );

        let found = tokio::time::timeout(timeout, async {
            loop {
                // Evaluate fails transiently while the post-submit navigation
                // swaps documents; treat that the same as not-found.
                if let Ok(result) = self.page.evaluate(script.as_str()).await {
                    if let Ok(Some(text)) = result.into_value::<Option<String>>() {
                        return text;
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        found.map_err(|_| Self::timeout_error(timeout, format!("text containing {marker:?}")))
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        let closed = self.browser.close().await;
        self.handler_task.abort();
        closed
            .map(|_| ())
            .map_err(|e| EngineError::Page(format!("browser close failed: {e}")))
    }
}

fn escape_js(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_js_quotes_and_backslashes() {
        assert_eq!(escape_js("SP"), "SP");
        assert_eq!(escape_js("O'Brien"), "O\\'Brien");
        assert_eq!(escape_js("a\\b"), "a\\\\b");
    }

    #[test]
    fn timeout_error_carries_millis() {
        let err = CdpDriver::timeout_error(Duration::from_secs(20), "text containing \"Olá,\"");
        match err {
            EngineError::Timeout { ms, condition } => {
                assert_eq!(ms, 20_000);
                assert_eq!(condition, "text containing \"Olá,\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
