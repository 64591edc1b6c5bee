//! Fake page driver for testing the login workflow without a browser.
//!
//! Provides a scriptable in-memory [`PageDriver`] plus a handle for
//! inspecting what the workflow did to it.
//!
//! # Example
//!
//! ```ignore
//! let (driver, handle) = FakeDriverBuilder::new()
//!     .greeting("Olá, João Pereira")
//!     .build();
//! let launcher = FakeLauncher::with_driver(driver);
//!
//! run_login("session@0", &credentials, &launcher, &sink, &config).await;
//! assert_eq!(handle.close_count(), 1);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::driver::{DriverFactory, PageDriver};
use crate::error::{EngineError, Result};

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    closes: usize,
}

/// Builder for scripting a fake driver's behavior.
///
/// By default every operation succeeds and the confirmation greeting reads
/// "Olá, João Pereira". Failure injection replaces the outcome of a single
/// named operation.
pub struct FakeDriverBuilder {
    goto_error: Option<EngineError>,
    selector_error: Option<EngineError>,
    fill_error: Option<EngineError>,
    click_error: Option<EngineError>,
    item_error: Option<EngineError>,
    greeting: std::result::Result<String, EngineError>,
}

impl FakeDriverBuilder {
    pub fn new() -> Self {
        Self {
            goto_error: None,
            selector_error: None,
            fill_error: None,
            click_error: None,
            item_error: None,
            greeting: Ok("Olá, João Pereira".to_string()),
        }
    }

    /// Text the confirmation wait resolves to.
    pub fn greeting(mut self, text: impl Into<String>) -> Self {
        self.greeting = Ok(text.into());
        self
    }

    /// The confirmation wait elapses instead of resolving.
    pub fn greeting_times_out(mut self) -> Self {
        self.greeting = Err(EngineError::Timeout {
            ms: 20_000,
            condition: "text containing \"Olá,\"".into(),
        });
        self
    }

    pub fn goto_fails(mut self, error: EngineError) -> Self {
        self.goto_error = Some(error);
        self
    }

    pub fn selector_wait_fails(mut self, error: EngineError) -> Self {
        self.selector_error = Some(error);
        self
    }

    pub fn fill_fails(mut self, error: EngineError) -> Self {
        self.fill_error = Some(error);
        self
    }

    pub fn click_fails(mut self, error: EngineError) -> Self {
        self.click_error = Some(error);
        self
    }

    pub fn click_item_fails(mut self, error: EngineError) -> Self {
        self.item_error = Some(error);
        self
    }

    pub fn build(self) -> (FakeDriver, FakeDriverHandle) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        let driver = FakeDriver {
            state: Arc::clone(&state),
            goto_error: Mutex::new(self.goto_error),
            selector_error: Mutex::new(self.selector_error),
            fill_error: Mutex::new(self.fill_error),
            click_error: Mutex::new(self.click_error),
            item_error: Mutex::new(self.item_error),
            greeting: Mutex::new(Some(self.greeting)),
        };
        (driver, FakeDriverHandle { state })
    }
}

impl Default for FakeDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for inspecting calls made against a [`FakeDriver`], including after
/// the driver itself has been consumed by `close`.
#[derive(Clone)]
pub struct FakeDriverHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriverHandle {
    /// Every operation invoked, in order, rendered as "op arg arg".
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// How many times the session was released.
    pub fn close_count(&self) -> usize {
        self.state.lock().closes
    }
}

/// Scriptable in-memory [`PageDriver`].
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
    goto_error: Mutex<Option<EngineError>>,
    selector_error: Mutex<Option<EngineError>>,
    fill_error: Mutex<Option<EngineError>>,
    click_error: Mutex<Option<EngineError>>,
    item_error: Mutex<Option<EngineError>>,
    greeting: Mutex<Option<std::result::Result<String, EngineError>>>,
}

impl FakeDriver {
    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.record(format!("goto {url}"));
        match self.goto_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> Result<()> {
        self.record(format!("wait_for_selector {selector}"));
        match self.selector_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        self.record(format!("fill {selector} {value}"));
        match self.fill_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.record(format!("click {selector}"));
        match self.click_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn click_item_with_text(&mut self, text: &str) -> Result<()> {
        self.record(format!("click_item {text}"));
        match self.item_error.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn wait_for_text_containing(&mut self, marker: &str, _timeout: Duration) -> Result<String> {
        self.record(format!("wait_for_text {marker}"));
        self.greeting
            .lock()
            .take()
            .expect("confirmation wait scripted for a single call")
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Factory handing out one pre-built [`FakeDriver`], or failing to launch.
pub struct FakeLauncher {
    driver: Mutex<Option<FakeDriver>>,
    launch_error: Mutex<Option<EngineError>>,
}

impl FakeLauncher {
    pub fn with_driver(driver: FakeDriver) -> Self {
        Self {
            driver: Mutex::new(Some(driver)),
            launch_error: Mutex::new(None),
        }
    }

    /// Launcher whose single launch attempt fails with `error`.
    pub fn failing(error: EngineError) -> Self {
        Self {
            driver: Mutex::new(None),
            launch_error: Mutex::new(Some(error)),
        }
    }
}

#[async_trait]
impl DriverFactory for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageDriver>> {
        if let Some(err) = self.launch_error.lock().take() {
            return Err(err);
        }
        let driver = self
            .driver
            .lock()
            .take()
            .expect("fake launcher scripted for a single launch");
        Ok(Box::new(driver))
    }
}
