//! Page driver seam between the login script and the browser engine.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// One page context inside an exclusively-owned browser session.
///
/// Every waiting operation takes an explicit timeout and reports
/// [`EngineError::Timeout`](crate::EngineError::Timeout) when it elapses;
/// nothing here is exception-for-control-flow. `close` consumes the driver so
/// a session can only be released once.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate and wait for the page to finish loading.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches an element.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Focus the element matched by `selector` and type `value` into it.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Click the element matched by `selector`.
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Click the list entry whose visible text contains `text`.
    async fn click_item_with_text(&mut self, text: &str) -> Result<()>;

    /// Wait until some text node contains `marker` and return the enclosing
    /// element's text.
    async fn wait_for_text_containing(&mut self, marker: &str, timeout: Duration) -> Result<String>;

    /// Release the browser session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Produces one fresh, exclusively-owned [`PageDriver`] per automation run.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageDriver>>;
}
