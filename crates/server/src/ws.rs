//! HTTP routes and the per-connection WebSocket loop.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{Html, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use salabot_core::driver::DriverFactory;
use salabot_core::engine::{EngineConfig, run_login};
use salabot_protocol::ClientEvent;
use tracing::{debug, info, warn};

use crate::state::{ChannelSink, SessionRegistry};

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub engine: Arc<EngineConfig>,
    pub launcher: Arc<dyn DriverFactory>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One loop per client connection: register a session, forward queued events
/// to the socket in order, and spawn a detached automation run for each
/// `start_automation` frame.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (session_id, mut events) = state.registry.register();
    info!(target = "salabot", %session_id, "client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    let send_session = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(target = "salabot", session_id = %send_session, error = %err, "dropping unserializable event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                // Client went away; remaining events for this run are dropped.
                break;
            }
        }
    });

    while let Some(Ok(frame)) = ws_rx.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(ClientEvent::StartAutomation { credentials }) => {
                    info!(target = "salabot", %session_id, "automation requested");
                    let sink = ChannelSink::new(Arc::clone(&state.registry), session_id.clone());
                    let engine = Arc::clone(&state.engine);
                    let launcher = Arc::clone(&state.launcher);
                    let run_id = session_id.clone();
                    // Fire-and-forget: the run outlives this request cycle and
                    // reports only through the sink.
                    tokio::spawn(async move {
                        run_login(&run_id, &credentials, launcher.as_ref(), &sink, &engine).await;
                    });
                }
                Err(err) => {
                    debug!(target = "salabot", %session_id, error = %err, "ignoring unrecognized frame");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.registry.unregister(&session_id);
    send_task.abort();
    let _ = send_task.await;
    info!(target = "salabot", %session_id, "client disconnected");
}
