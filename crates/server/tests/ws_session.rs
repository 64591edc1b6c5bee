//! End-to-end WebSocket sessions against a live listener, with the browser
//! faked at the driver seam.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, Stream, StreamExt};
use salabot_core::driver::DriverFactory;
use salabot_core::engine::EngineConfig;
use salabot_core::fake_driver::{FakeDriverBuilder, FakeLauncher};
use salabot_protocol::ServerEvent;
use salabot_server::state::SessionRegistry;
use salabot_server::ws::{AppState, router};
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

const CLOSING_NOTICE: &str = "🔌 Conexão finalizada.";

async fn spawn_server(launcher: Arc<dyn DriverFactory>) -> SocketAddr {
    let state = AppState {
        registry: Arc::new(SessionRegistry::new()),
        engine: Arc::new(EngineConfig {
            pacing: Duration::ZERO,
            ..EngineConfig::default()
        }),
        launcher,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

fn start_frame() -> String {
    json!({
        "type": "start_automation",
        "ra": "123456",
        "digito": "7",
        "uf": "sp",
        "senha": "secret"
    })
    .to_string()
}

/// Read frames until the run's closing notice arrives.
async fn collect_run(
    ws: &mut (impl Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("run should finish promptly")
            .expect("socket should stay open")
            .expect("frame should be readable");
        if let Message::Text(text) = frame {
            let event: ServerEvent = serde_json::from_str(&text).unwrap();
            let done = matches!(&event, ServerEvent::NewLog { message } if message == CLOSING_NOTICE);
            events.push(event);
            if done {
                return events;
            }
        }
    }
}

fn terminals(events: &[ServerEvent]) -> Vec<&ServerEvent> {
    events
        .iter()
        .filter(|e| matches!(e, ServerEvent::LoginSuccess { .. } | ServerEvent::AutomationError { .. }))
        .collect()
}

#[tokio::test]
async fn nominal_session_streams_progress_and_success() {
    let (driver, handle) = FakeDriverBuilder::new().greeting("Olá, João Pereira").build();
    let addr = spawn_server(Arc::new(FakeLauncher::with_driver(driver))).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws.send(Message::Text(start_frame())).await.unwrap();

    let events = collect_run(&mut ws).await;

    assert!(
        events.contains(&ServerEvent::LoginSuccess { name: "João".into() }),
        "events: {events:?}"
    );
    assert_eq!(terminals(&events).len(), 1);
    assert!(matches!(events.first(), Some(ServerEvent::NewLog { .. })));
    assert_eq!(
        events.last(),
        Some(&ServerEvent::NewLog {
            message: CLOSING_NOTICE.into()
        })
    );
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn bad_credentials_session_streams_the_timeout_failure() {
    let (driver, handle) = FakeDriverBuilder::new().greeting_times_out().build();
    let addr = spawn_server(Arc::new(FakeLauncher::with_driver(driver))).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws.send(Message::Text(start_frame())).await.unwrap();

    let events = collect_run(&mut ws).await;

    assert!(
        events.contains(&ServerEvent::AutomationError {
            message: "Tempo de espera esgotado.".into()
        }),
        "events: {events:?}"
    );
    assert!(!events.iter().any(|e| matches!(e, ServerEvent::LoginSuccess { .. })));
    assert_eq!(terminals(&events).len(), 1);
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn unrecognized_frames_are_ignored_and_the_session_stays_usable() {
    let (driver, _handle) = FakeDriverBuilder::new().build();
    let addr = spawn_server(Arc::new(FakeLauncher::with_driver(driver))).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws.send(Message::Text("{\"type\":\"bogus\"}".into())).await.unwrap();
    ws.send(Message::Text("not json at all".into())).await.unwrap();
    ws.send(Message::Text(start_frame())).await.unwrap();

    let events = collect_run(&mut ws).await;
    assert_eq!(terminals(&events).len(), 1);
}
