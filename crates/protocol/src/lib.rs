//! Wire types for the salabot WebSocket protocol.
//!
//! This crate contains the serde-serializable types exchanged between the
//! browser client and the server over the push channel. These types represent
//! the "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with the wire: Field and tag names match the frames the client
//!   front-end sends and subscribes to (`start_automation`, `new_log`,
//!   `login_success`, `automation_error`)
//! * Stable: Changes only when the wire protocol changes
//!
//! The automation engine built on top of these types lives in `salabot-core`.

use serde::{Deserialize, Serialize};

/// Portal credentials supplied by the client with an activation request.
///
/// All four fields are required; no validation is performed before use -
/// malformed values are left to the remote portal to reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Student registration number (RA).
    pub ra: String,
    /// RA check digit.
    pub digito: String,
    /// Two-letter state code; matched case-insensitively against the portal's
    /// uppercase selector entries.
    pub uf: String,
    /// Portal password.
    pub senha: String,
}

/// Frames sent by the client over the WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Kick off one automation run with the given credentials.
    StartAutomation {
        #[serde(flatten)]
        credentials: Credentials,
    },
}

/// Frames pushed by the server to the client that activated a run.
///
/// Per run the client observes zero or more `NewLog` frames followed by
/// exactly one of `LoginSuccess` / `AutomationError`, then one trailing
/// `NewLog` for the connection-closed notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Human-readable progress line, display-only.
    NewLog { message: String },
    /// Terminal: the run confirmed the student's identity.
    LoginSuccess { name: String },
    /// Terminal: the run failed; `message` is operator-facing free text.
    AutomationError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_automation_deserializes_from_flat_payload() {
        let frame = r#"{"type":"start_automation","ra":"123456","digito":"7","uf":"sp","senha":"secret"}"#;
        let event: ClientEvent = serde_json::from_str(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::StartAutomation {
                credentials: Credentials {
                    ra: "123456".into(),
                    digito: "7".into(),
                    uf: "sp".into(),
                    senha: "secret".into(),
                },
            }
        );
    }

    #[test]
    fn start_automation_rejects_missing_fields() {
        let frame = r#"{"type":"start_automation","ra":"123456"}"#;
        assert!(serde_json::from_str::<ClientEvent>(frame).is_err());
    }

    #[test]
    fn server_events_serialize_with_wire_tags() {
        let log = serde_json::to_value(ServerEvent::NewLog {
            message: "🔑 Autenticando...".into(),
        })
        .unwrap();
        assert_eq!(log, json!({"type": "new_log", "message": "🔑 Autenticando..."}));

        let success = serde_json::to_value(ServerEvent::LoginSuccess { name: "João".into() }).unwrap();
        assert_eq!(success, json!({"type": "login_success", "name": "João"}));

        let error = serde_json::to_value(ServerEvent::AutomationError {
            message: "Tempo de espera esgotado.".into(),
        })
        .unwrap();
        assert_eq!(
            error,
            json!({"type": "automation_error", "message": "Tempo de espera esgotado."})
        );
    }

    #[test]
    fn server_events_round_trip() {
        let event = ServerEvent::LoginSuccess { name: "Maria".into() };
        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
    }
}
