//! Automation engine for the Sala do Futuro student login.
//!
//! The engine executes one fixed login script per activation: navigate to the
//! portal, fill the credential form, submit, and read the greeting that
//! confirms the student's identity. Progress is reported through an injected
//! [`EventSink`]; page interactions go through an injected [`PageDriver`], so
//! the whole workflow is unit-testable without a browser.
//!
//! The live driver ([`CdpDriver`]) speaks CDP to a headless Chromium via
//! chromiumoxide. The server shell that wires sinks to WebSocket clients
//! lives in `salabot-server`.

pub mod cdp;
pub mod driver;
pub mod engine;
pub mod error;
pub mod fake_driver;
pub mod sink;

pub use cdp::{CdpDriver, CdpLauncher};
pub use driver::{DriverFactory, PageDriver};
pub use engine::{EngineConfig, first_name_from_greeting, run_login};
pub use error::{EngineError, Result};
pub use sink::{Event, EventSink, RecordingSink};
