//! Session registry: one entry per live WebSocket connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use salabot_core::sink::{Event, EventSink};
use salabot_protocol::ServerEvent;
use tokio::sync::mpsc;

pub type SessionId = String;

/// Maps session ids to the outbound channel of the owning connection.
///
/// Delivery is best-effort push: events for a session that has disconnected
/// are dropped, never replayed.
#[derive(Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh session id and its outbound channel.
    pub fn register(&self) -> (SessionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = format!("session@{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.lock().insert(id.clone(), tx);
        (id, rx)
    }

    pub fn unregister(&self, session_id: &str) {
        self.sessions.lock().remove(session_id);
    }

    /// Queue `event` for the one connection owning `session_id`.
    pub fn send(&self, session_id: &str, event: ServerEvent) {
        if let Some(tx) = self.sessions.lock().get(session_id) {
            let _ = tx.send(event);
        }
    }
}

/// Adapts one registry entry to the engine's [`EventSink`] seam.
pub struct ChannelSink {
    registry: Arc<SessionRegistry>,
    session_id: SessionId,
}

impl ChannelSink {
    pub fn new(registry: Arc<SessionRegistry>, session_id: SessionId) -> Self {
        Self {
            registry,
            session_id,
        }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        let frame = match event {
            Event::Progress { message } => ServerEvent::NewLog { message },
            Event::Success { first_name } => ServerEvent::LoginSuccess { name: first_name },
            Event::Failure { reason } => ServerEvent::AutomationError { message: reason },
        };
        self.registry.send(&self.session_id, frame);
    }
}
