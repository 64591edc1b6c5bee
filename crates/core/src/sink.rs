//! Event sink seam between the engine and the transport shell.
//!
//! The engine never talks to a socket directly; it emits [`Event`]s into an
//! injected sink. The server installs a channel-backed sink per client
//! connection, tests install a [`RecordingSink`].

use parking_lot::Mutex;
use std::sync::Arc;

/// One observable step of an automation run.
///
/// A run emits zero or more `Progress` events, exactly one terminal outcome
/// (`Success` xor `Failure`), and one final `Progress` for the
/// connection-closed notice after the browser is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Progress { message: String },
    Success { first_name: String },
    Failure { reason: String },
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure { .. })
    }
}

/// Destination for run events, keyed to one client session at construction.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Sink that stores every emitted event for later assertion.
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// The terminal events (success/failure) emitted so far.
    pub fn outcomes(&self) -> Vec<Event> {
        self.events.lock().iter().filter(|e| e.is_terminal()).cloned().collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
