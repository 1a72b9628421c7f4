//! voicehelper-daemon: Background daemon for the voicehelper assistant
//!
//! The companion UI owns the platform speech-recognition plugin and the
//! microphone permission dialog; this daemon provides:
//! - The capture-session state machine (one listening session at a time)
//! - The command interpreter mapping transcripts to intents
//! - Intent executors opening tel:/app/search URIs via the OS
//! - IPC server for UI communication (control, transcripts, events)

mod capture;
mod config;
mod events;
mod executor;
mod interpreter;
mod ipc;
mod lifecycle;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::capture::{CaptureSession, PermissionState, RemoteRecognizer};
use crate::config::Config;
use crate::events::AssistantEvent;
use crate::executor::{Executor, OsLauncher};
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voicehelper-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, locale = %config.locale, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // IPC server -> capture session
    let (control_tx, control_rx) = mpsc::channel(32);
    // Capture session -> IPC server (for broadcasting assistant events)
    let (event_tx, _event_rx) = broadcast::channel::<AssistantEvent>(64);

    // Microphone permission shared between recognizer and IPC server
    let permission = PermissionState::new(config.assume_mic_permission);

    // Create the capture session
    let recognizer = RemoteRecognizer::new(permission.clone());
    let executor = Executor::new(OsLauncher);
    let mut session =
        CaptureSession::new(config.locale.clone(), recognizer, executor, event_tx.clone());

    // Create IPC server
    let server = Server::new(
        &config.socket_path,
        config.locale.clone(),
        control_tx,
        permission,
        event_tx.clone(),
    )?;

    // Subscribe to assistant events for status updates
    let mut status_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the capture session (processes control commands)
        _ = session.run(control_rx) => {
            info!("capture session exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Mirror assistant events into the IPC status snapshot
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => {
                        info!(%event, "assistant event");
                        match &event {
                            AssistantEvent::ListeningStarted { .. } => {
                                server_for_events.set_listening(true).await;
                            }
                            AssistantEvent::ListeningStopped => {
                                server_for_events.set_listening(false).await;
                            }
                            AssistantEvent::TranscriptRecognized { text } => {
                                server_for_events.set_transcript(text.clone()).await;
                            }
                            AssistantEvent::IntentDispatched { .. }
                            | AssistantEvent::Alert(_) => {}
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "assistant event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("event relay exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup: stop any active session before the socket goes away
    info!("shutting down...");

    session.stop();
    server.shutdown().await;

    info!("voicehelper-daemon stopped");

    Ok(())
}
