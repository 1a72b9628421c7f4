//! Recognizer boundary to the platform speech plugin
//!
//! The daemon never touches the microphone itself. The companion UI owns
//! the platform speech-recognition plugin; this trait is the seam between
//! the session and that external collaborator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Boundary to the platform speech-recognition backend
pub trait Recognizer: Send {
    /// Resolve the microphone permission; `Ok(false)` means denied
    fn request_permission(&self) -> Result<bool, CaptureError>;

    /// Begin a recognition session for the given locale
    fn start(&self, locale: &str) -> Result<(), CaptureError>;

    /// End the active recognition session
    fn stop(&self) -> Result<(), CaptureError>;
}

/// Failures crossing the recognizer boundary
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("recognizer backend unavailable: {0}")]
    Backend(String),
}

/// Shared view of the microphone permission
///
/// Seeded from configuration, overwritten whenever the UI reports the
/// outcome of the platform permission dialog over IPC.
#[derive(Debug, Clone)]
pub struct PermissionState {
    granted: Arc<AtomicBool>,
}

impl PermissionState {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}

/// Recognizer for the daemon/UI split
///
/// The UI reacts to the session's ListeningStarted/ListeningStopped
/// events by driving the actual platform plugin, so start and stop have
/// no local work beyond logging. Permission comes from the shared state
/// the UI keeps up to date.
pub struct RemoteRecognizer {
    permission: PermissionState,
}

impl RemoteRecognizer {
    pub fn new(permission: PermissionState) -> Self {
        Self { permission }
    }
}

impl Recognizer for RemoteRecognizer {
    fn request_permission(&self) -> Result<bool, CaptureError> {
        Ok(self.permission.granted())
    }

    fn start(&self, locale: &str) -> Result<(), CaptureError> {
        debug!(%locale, "recognition start relayed to UI client");
        Ok(())
    }

    fn stop(&self) -> Result<(), CaptureError> {
        debug!("recognition stop relayed to UI client");
        Ok(())
    }
}
