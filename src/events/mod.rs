//! Events broadcast by the capture session
//!
//! Every observable outcome of a voice interaction becomes an event:
//! session state changes, recognized transcripts, dispatched intents, and
//! user-facing alerts. Subscribed IPC clients receive each one as a push
//! notification.

use serde::{Deserialize, Serialize};

use crate::interpreter::Intent;

/// Events emitted while the assistant is running
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantEvent {
    /// A capture session was started; the UI should begin platform
    /// speech recognition with this locale
    ListeningStarted {
        /// BCP-47-like locale tag, e.g. "en-US"
        locale: String,
    },

    /// The capture session was stopped
    ListeningStopped,

    /// A transcript was recognized and accepted
    TranscriptRecognized { text: String },

    /// An intent was derived and handed to the executor
    IntentDispatched {
        intent: Intent,
        /// URI that was opened, if the intent maps to one
        uri: Option<String>,
        /// User-visible notice when the intent has no OS action yet
        notice: Option<String>,
    },

    /// A user-facing alert; never fatal, never retried
    Alert(Alert),
}

impl std::fmt::Display for AssistantEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantEvent::ListeningStarted { locale } => {
                write!(f, "LISTENING_STARTED ({})", locale)
            }
            AssistantEvent::ListeningStopped => write!(f, "LISTENING_STOPPED"),
            AssistantEvent::TranscriptRecognized { text } => {
                write!(f, "TRANSCRIPT_RECOGNIZED ({})", text)
            }
            AssistantEvent::IntentDispatched { intent, .. } => {
                write!(f, "INTENT_DISPATCHED ({})", intent)
            }
            AssistantEvent::Alert(alert) => write!(f, "ALERT ({})", alert.code()),
        }
    }
}

/// User-facing alert taxonomy
///
/// All failures of a voice interaction end up here and are shown to the
/// user; the user re-issues the command, nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    #[error("microphone permission was not granted")]
    PermissionDenied,

    #[error("speech recognition could not be started: {reason}")]
    RecognitionStartFailure { reason: String },

    #[error("speech recognition could not be stopped: {reason}")]
    RecognitionStopFailure { reason: String },

    #[error("say who to call")]
    MissingArgument,

    #[error("app \"{name}\" is not supported")]
    UnsupportedApp { name: String },

    #[error("could not open {uri}: {reason}")]
    ExternalLinkFailure { uri: String, reason: String },

    #[error("command not recognized")]
    UnrecognizedCommand,
}

impl Alert {
    /// Stable identifier for UI-side handling
    pub fn code(&self) -> &'static str {
        match self {
            Alert::PermissionDenied => "permission_denied",
            Alert::RecognitionStartFailure { .. } => "recognition_start_failure",
            Alert::RecognitionStopFailure { .. } => "recognition_stop_failure",
            Alert::MissingArgument => "missing_argument",
            Alert::UnsupportedApp { .. } => "unsupported_app",
            Alert::ExternalLinkFailure { .. } => "external_link_failure",
            Alert::UnrecognizedCommand => "unrecognized_command",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = AssistantEvent::ListeningStarted {
            locale: "en-US".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("listening_started"));
        assert!(json.contains("en-US"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"listening_stopped"}"#;
        let event: AssistantEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, AssistantEvent::ListeningStopped));
    }

    #[test]
    fn test_alert_serialization() {
        let alert = Alert::UnsupportedApp {
            name: "телеграм".to_string(),
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("unsupported_app"));
        assert!(json.contains("телеграм"));
    }

    #[test]
    fn test_alert_messages_are_user_facing() {
        let alert = Alert::PermissionDenied;
        assert_eq!(alert.to_string(), "microphone permission was not granted");
        assert_eq!(alert.code(), "permission_denied");
    }
}
