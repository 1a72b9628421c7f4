//! Capture session: the single listening state and the result path
//!
//! Owns the idle/listening flag, sequences permission, recognizer start
//! and the state flip explicitly, and feeds every accepted transcript
//! through the interpreter into the executor. All outcomes are broadcast
//! as events.

use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::events::{Alert, AssistantEvent};
use crate::executor::{ExecError, Executor, UriLauncher};
use crate::interpreter::{interpret, InterpretError};

use super::recognizer::Recognizer;

/// Commands the IPC server forwards to the session
#[derive(Debug, Clone)]
pub enum ControlCommand {
    /// Start listening; `None` uses the configured locale
    StartListening { locale: Option<String> },
    /// Stop the active session
    StopListening,
    /// Ordered candidate transcripts from the platform recognizer
    Transcript { alternatives: Vec<String> },
}

/// The two states of the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    /// No active recognition session
    #[default]
    Idle,
    /// One recognition session is active
    Listening,
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "Idle"),
            ListeningState::Listening => write!(f, "Listening"),
        }
    }
}

/// The capture session state machine
pub struct CaptureSession<R, L> {
    /// Current listening state
    state: ListeningState,
    /// Default recognition locale from configuration
    default_locale: String,
    /// Most recent recognized utterance; replaced on each result
    transcript: Option<String>,
    /// Time the active session was started
    started_at: Option<Instant>,
    recognizer: R,
    executor: Executor<L>,
    /// Channel for emitting assistant events
    event_tx: broadcast::Sender<AssistantEvent>,
}

impl<R: Recognizer, L: UriLauncher> CaptureSession<R, L> {
    pub fn new(
        default_locale: String,
        recognizer: R,
        executor: Executor<L>,
        event_tx: broadcast::Sender<AssistantEvent>,
    ) -> Self {
        Self {
            state: ListeningState::Idle,
            default_locale,
            transcript: None,
            started_at: None,
            recognizer,
            executor,
            event_tx,
        }
    }

    /// Get the current listening state
    pub fn state(&self) -> ListeningState {
        self.state
    }

    /// Get the most recent transcript
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Stop any active session; the cleanup path calls this on shutdown
    /// so the recognizer and subscribed clients see an orderly stop
    pub fn stop(&mut self) {
        self.handle_stop();
    }

    /// Run the session, processing control commands
    pub async fn run(&mut self, mut control_rx: mpsc::Receiver<ControlCommand>) {
        info!("capture session started in Idle state");

        while let Some(command) = control_rx.recv().await {
            match command {
                ControlCommand::StartListening { locale } => self.handle_start(locale),
                ControlCommand::StopListening => self.handle_stop(),
                ControlCommand::Transcript { alternatives } => {
                    self.handle_transcript(alternatives)
                }
            }
        }

        info!("capture session stopped");
    }

    /// Start listening: permission, then recognizer, then the state flip
    ///
    /// Each step is observed before the next one runs; a failure at any
    /// step leaves the session Idle.
    fn handle_start(&mut self, locale: Option<String>) {
        if self.state == ListeningState::Listening {
            warn!(state = %self.state, "start requested while already listening, ignoring");
            return;
        }

        let locale = locale.unwrap_or_else(|| self.default_locale.clone());

        match self.recognizer.request_permission() {
            Ok(true) => {}
            Ok(false) => {
                self.raise(Alert::PermissionDenied);
                return;
            }
            Err(e) => {
                self.raise(Alert::RecognitionStartFailure {
                    reason: e.to_string(),
                });
                return;
            }
        }

        if let Err(e) = self.recognizer.start(&locale) {
            self.raise(Alert::RecognitionStartFailure {
                reason: e.to_string(),
            });
            return;
        }

        self.state = ListeningState::Listening;
        self.started_at = Some(Instant::now());
        info!(%locale, "listening started");
        self.emit(AssistantEvent::ListeningStarted { locale });
    }

    /// Stop listening; a manual stop always returns the session to Idle
    fn handle_stop(&mut self) {
        if self.state == ListeningState::Idle {
            debug!("stop requested while idle, ignoring");
            return;
        }

        if let Err(e) = self.recognizer.stop() {
            self.raise(Alert::RecognitionStopFailure {
                reason: e.to_string(),
            });
        }

        let duration_ms = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.state = ListeningState::Idle;
        info!(duration_ms, "listening stopped");
        self.emit(AssistantEvent::ListeningStopped);
    }

    /// Accept a recognition result: first candidate only, then interpret
    /// and dispatch. Failures raise alerts and keep the session listening
    /// so the user can re-issue the command.
    fn handle_transcript(&mut self, alternatives: Vec<String>) {
        if self.state != ListeningState::Listening {
            warn!("transcript received while idle, dropping");
            return;
        }

        let Some(text) = alternatives.into_iter().next() else {
            debug!("empty recognition result");
            return;
        };

        info!(%text, "transcript recognized");
        self.transcript = Some(text.clone());
        self.emit(AssistantEvent::TranscriptRecognized { text: text.clone() });

        let intent = match interpret(&text) {
            Ok(intent) => intent,
            Err(InterpretError::MissingTarget) => {
                self.raise(Alert::MissingArgument);
                return;
            }
            Err(InterpretError::UnknownApp(name)) => {
                self.raise(Alert::UnsupportedApp { name });
                return;
            }
        };

        match self.executor.dispatch(&intent) {
            Ok(dispatch) => {
                info!(%intent, uri = ?dispatch.uri, "intent dispatched");
                self.emit(AssistantEvent::IntentDispatched {
                    intent,
                    uri: dispatch.uri,
                    notice: dispatch.notice.map(str::to_string),
                });
            }
            Err(ExecError::Unrecognized) => self.raise(Alert::UnrecognizedCommand),
            Err(ExecError::Launch { uri, reason }) => {
                self.raise(Alert::ExternalLinkFailure { uri, reason })
            }
        }
    }

    fn raise(&self, alert: Alert) {
        warn!(code = alert.code(), %alert, "user-facing alert");
        self.emit(AssistantEvent::Alert(alert));
    }

    fn emit(&self, event: AssistantEvent) {
        debug!(?event, "emitting event");
        let _ = self.event_tx.send(event);
    }
}
