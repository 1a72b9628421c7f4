//! Unix domain socket server for IPC
//!
//! Provides request-response communication with the companion UI and
//! push notifications of assistant events to subscribed clients.
//! Start/stop/transcript requests are forwarded to the capture session
//! over its control channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::capture::{ControlCommand, PermissionState};
use crate::events::AssistantEvent;

use super::protocol::{DaemonStatus, Notification, Request, Response};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    /// Channel for forwarding control requests to the capture session
    control_tx: mpsc::Sender<ControlCommand>,
    /// Shared microphone permission, updated from PermissionResult requests
    permission: PermissionState,
    /// Event channel cloned per subscribing client
    event_tx: broadcast::Sender<AssistantEvent>,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

impl Server {
    /// Create a new IPC server bound to the given socket path
    pub fn new(
        socket_path: &Path,
        locale: String,
        control_tx: mpsc::Sender<ControlCommand>,
        permission: PermissionState,
        event_tx: broadcast::Sender<AssistantEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::new(locale),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            shutdown_tx,
            control_tx,
            permission,
            event_tx,
        })
    }

    /// Update the listening flag in the status snapshot
    pub async fn set_listening(&self, listening: bool) {
        let mut state = self.state.write().await;
        if state.status.listening != listening {
            info!(listening, "IPC server: listening state updated");
        }
        state.status.listening = listening;
    }

    /// Record the most recent transcript in the status snapshot
    pub async fn set_transcript(&self, text: String) {
        let mut state = self.state.write().await;
        state.status.last_transcript = Some(text);
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let control_tx = self.control_tx.clone();
                    let permission = self.permission.clone();
                    let event_tx = self.event_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(
                                stream, state, control_tx, permission, event_tx
                            ) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        control_tx: mpsc::Sender<ControlCommand>,
        permission: PermissionState,
        event_tx: broadcast::Sender<AssistantEvent>,
    ) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        // Single owner of the write half; responses and notifications are
        // both framed through this channel
        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Vec<u8>>(64);
        let writer_task = tokio::spawn(async move {
            while let Some(frame) = outgoing_rx.recv().await {
                if writer.write_all(&frame).await.is_err() {
                    break;
                }
            }
        });

        let mut subscription: Option<tokio::task::JoinHandle<()>> = None;
        let mut len_buf = [0u8; 4];

        let result = loop {
            // Read message length (4-byte little-endian)
            match reader.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    break Ok(());
                }
                Err(e) => break Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > 1024 * 1024 {
                warn!(len, "message too large, disconnecting");
                break Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            if let Err(e) = reader.read_exact(&mut msg_buf).await {
                break Err(e.into());
            }

            // Parse request
            let request: Request = match serde_json::from_slice(&msg_buf) {
                Ok(request) => request,
                Err(e) => break Err(anyhow::Error::from(e).context("failed to parse request")),
            };

            debug!(?request, "received request");

            let (response, subscribe) =
                Self::process_request(request, &state, &control_tx, &permission).await;

            // The subscription receiver is created before the confirmation
            // is queued, and forwarding starts only after it: no event
            // published after the confirmation is missed, and the
            // confirmation is always first on the wire
            let pending_rx = if subscribe && subscription.is_none() {
                Some(event_tx.subscribe())
            } else {
                None
            };

            // Send response
            let frame = match Self::encode_frame(&response) {
                Ok(frame) => frame,
                Err(e) => break Err(e),
            };
            if outgoing_tx.send(frame).await.is_err() {
                break Ok(());
            }

            if let Some(mut event_rx) = pending_rx {
                let notify_tx = outgoing_tx.clone();
                subscription = Some(tokio::spawn(async move {
                    loop {
                        match event_rx.recv().await {
                            Ok(event) => {
                                let frame =
                                    match Self::encode_frame(&Notification::Event(event)) {
                                        Ok(frame) => frame,
                                        Err(e) => {
                                            warn!(?e, "failed to encode notification");
                                            continue;
                                        }
                                    };
                                if notify_tx.send(frame).await.is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                warn!(skipped = n, "notification receiver lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }));
                debug!("client subscribed to notifications");
            }
        };

        if let Some(task) = subscription {
            task.abort();
        }
        drop(outgoing_tx);
        let _ = writer_task.await;

        result
    }

    /// Encode a length-prefixed JSON message
    fn encode_frame<T: serde::Serialize>(msg: &T) -> Result<Vec<u8>> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let mut frame = Vec::with_capacity(4 + msg_bytes.len());
        frame.extend_from_slice(&(msg_bytes.len() as u32).to_le_bytes());
        frame.extend_from_slice(&msg_bytes);
        Ok(frame)
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        control_tx: &mpsc::Sender<ControlCommand>,
        permission: &PermissionState,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                (Response::Status(state.status.clone()), false)
            }

            Request::Subscribe => (Response::Subscribed, true),

            Request::StartListening { locale } => (
                Self::forward(control_tx, ControlCommand::StartListening { locale }).await,
                false,
            ),

            Request::StopListening => (
                Self::forward(control_tx, ControlCommand::StopListening).await,
                false,
            ),

            Request::Transcript { alternatives } => (
                Self::forward(control_tx, ControlCommand::Transcript { alternatives }).await,
                false,
            ),

            Request::PermissionResult { granted } => {
                info!(granted, "microphone permission reported by UI");
                permission.set(granted);
                (Response::Accepted, false)
            }
        }
    }

    /// Forward a control command to the capture session
    async fn forward(
        control_tx: &mpsc::Sender<ControlCommand>,
        command: ControlCommand,
    ) -> Response {
        match control_tx.send(command).await {
            Ok(()) => Response::Accepted,
            Err(e) => {
                error!(?e, "capture session unavailable");
                Response::Error {
                    code: "session_unavailable".to_string(),
                    message: "capture session is not running".to_string(),
                }
            }
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_frame<T, S>(stream: &mut S) -> T
    where
        T: serde::de::DeserializeOwned,
        S: AsyncReadExt + Unpin,
    {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await.unwrap();
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut msg_buf = vec![0u8; len];
        stream.read_exact(&mut msg_buf).await.unwrap();
        serde_json::from_slice(&msg_buf).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_confirmation_precedes_notifications() {
        let (mut client, server_stream) = UnixStream::pair().unwrap();
        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::new("en-US".to_string()),
            start_time: std::time::Instant::now(),
        }));
        let (control_tx, _control_rx) = mpsc::channel(8);
        let permission = PermissionState::new(true);
        let (event_tx, _event_rx) = broadcast::channel(16);

        tokio::spawn(Server::handle_client(
            server_stream,
            state,
            control_tx,
            permission,
            event_tx.clone(),
        ));

        let frame = Server::encode_frame(&Request::Subscribe).unwrap();
        client.write_all(&frame).await.unwrap();

        // The confirmation is always the first frame on the wire
        let response: Response = read_frame(&mut client).await;
        assert!(matches!(response, Response::Subscribed));

        // An event published after the confirmation reaches the client
        event_tx.send(AssistantEvent::ListeningStopped).unwrap();
        let notification: Notification = read_frame(&mut client).await;
        assert!(matches!(
            notification,
            Notification::Event(AssistantEvent::ListeningStopped)
        ));
    }

    #[test]
    fn test_encode_frame_is_length_prefixed() {
        let frame = Server::encode_frame(&Response::Pong).unwrap();
        let len = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);
        let response: Response = serde_json::from_slice(&frame[4..]).unwrap();
        assert!(matches!(response, Response::Pong));
    }

    #[tokio::test]
    async fn test_forward_reports_closed_session() {
        let (control_tx, control_rx) = mpsc::channel(1);
        drop(control_rx);

        let response = Server::forward(&control_tx, ControlCommand::StopListening).await;
        assert!(matches!(
            response,
            Response::Error { code, .. } if code == "session_unavailable"
        ));
    }
}
