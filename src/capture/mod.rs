//! Capture module: listening session and recognizer boundary
//!
//! One recognition session at a time, driven by control commands from
//! the IPC server. The platform speech plugin itself lives in the
//! companion UI process behind the `Recognizer` trait.

mod recognizer;
mod session;

pub use recognizer::{CaptureError, PermissionState, Recognizer, RemoteRecognizer};
pub use session::{CaptureSession, ControlCommand, ListeningState};
