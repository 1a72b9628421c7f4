//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.
//! The companion UI owns the platform speech plugin; transcripts and
//! permission outcomes flow in as requests, assistant events flow out as
//! notifications to subscribed clients.

use serde::{Deserialize, Serialize};

use crate::events::AssistantEvent;

/// Requests from UI to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Subscribe to assistant event notifications
    Subscribe,

    /// Start a capture session; `None` uses the configured locale
    StartListening { locale: Option<String> },

    /// Stop the active capture session
    StopListening,

    /// Deliver one recognition result: ordered candidate transcripts,
    /// best first
    Transcript { alternatives: Vec<String> },

    /// Report the outcome of the platform microphone permission dialog
    PermissionResult { granted: bool },
}

/// Responses from daemon to UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Subscription confirmed
    Subscribed,

    /// Request was forwarded to the session for processing
    Accepted,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification from daemon to UI (for subscribed clients)
///
/// Externally tagged so the wrapped event keeps its own "type" field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    /// An assistant event occurred
    Event(AssistantEvent),
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Whether a capture session is active
    pub listening: bool,

    /// Locale used for recognition
    pub locale: String,

    /// Most recent recognized transcript
    pub last_transcript: Option<String>,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl DaemonStatus {
    pub fn new(locale: String) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            listening: false,
            locale,
            last_transcript: None,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::StartListening {
            locale: Some("ru-RU".to_string()),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("start_listening"));
        assert!(json.contains("ru-RU"));
    }

    #[test]
    fn test_transcript_request_roundtrip() {
        let json = r#"{"type":"transcript","alternatives":["позвони маме","позвони Маше"]}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        match req {
            Request::Transcript { alternatives } => {
                assert_eq!(alternatives.len(), 2);
                assert_eq!(alternatives[0], "позвони маме");
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus::new("en-US".to_string()));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("status"));
        assert!(json.contains("en-US"));
    }

    #[test]
    fn test_notification_serialization() {
        let notif = Notification::Event(AssistantEvent::ListeningStopped);
        let json = serde_json::to_string(&notif).unwrap();
        assert!(json.contains("event"));
        assert!(json.contains("listening_stopped"));
    }
}
