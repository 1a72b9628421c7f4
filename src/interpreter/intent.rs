//! Intent and known-app definitions
//!
//! An `Intent` is the structured classification of one transcript. It is
//! produced once per recognition result and consumed immediately by the
//! executor; nothing is persisted.

use serde::{Deserialize, Serialize};

/// The closed set of commands the assistant understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Place a call to the spoken target
    Call { target: String },

    /// Launch one of the known apps via its URI scheme
    OpenApp { app: KnownApp },

    /// Run a web search for the spoken query (may be empty)
    Search { query: String },

    /// Read out unread messages
    ReadMessages,

    /// Transcript matched no trigger
    Unknown,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Call { target } => write!(f, "call({})", target),
            Intent::OpenApp { app } => write!(f, "open_app({})", app),
            Intent::Search { query } => write!(f, "search({})", query),
            Intent::ReadMessages => write!(f, "read_messages"),
            Intent::Unknown => write!(f, "unknown"),
        }
    }
}

/// Apps the open command can launch, with their fixed launch URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownApp {
    Instagram,
    Facebook,
    Whatsapp,
}

impl KnownApp {
    /// Look up an app by its spoken name (already lower-cased)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "instagram" => Some(KnownApp::Instagram),
            "facebook" => Some(KnownApp::Facebook),
            "whatsapp" => Some(KnownApp::Whatsapp),
            _ => None,
        }
    }

    /// Custom URI scheme that launches the app
    pub fn launch_uri(&self) -> &'static str {
        match self {
            KnownApp::Instagram => "instagram://app",
            KnownApp::Facebook => "fb://",
            KnownApp::Whatsapp => "whatsapp://send",
        }
    }
}

impl std::fmt::Display for KnownApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnownApp::Instagram => write!(f, "instagram"),
            KnownApp::Facebook => write!(f, "facebook"),
            KnownApp::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

/// Interpretation failures that must be surfaced to the user
///
/// These are per-utterance signals, not fatal errors; the next transcript
/// starts from a clean slate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("call command is missing a target")]
    MissingTarget,

    #[error("unknown app: {0}")]
    UnknownApp(String),
}
