//! Unix domain socket server for IPC
//!
//! Provides request-response communication for the view layer and push
//! notifications of state events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::deck::Deck;
use crate::events::StateEvent;
use crate::session::{RecognitionBatch, SessionEvent, SessionState};
use crate::state::{AppState, Input, UiAction};

use super::protocol::{DaemonStatus, Notification, Request, Response, MAX_MESSAGE_LEN};

/// Channels into the rest of the daemon
#[derive(Clone)]
pub struct Handles {
    /// Transcripts submitted over IPC
    pub session_tx: mpsc::Sender<SessionEvent>,
    /// UI actions and session control
    pub input_tx: mpsc::Sender<Input>,
    /// Source for subscriber notifications
    pub event_tx: broadcast::Sender<StateEvent>,
}

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    context: Arc<ClientContext>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Everything a client handler needs
struct ClientContext {
    state: RwLock<ServerState>,
    deck: Arc<Deck>,
    handles: Handles,
}

/// Shared server view of the daemon
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
    app: AppState,
}

/// A decoded frame from the client
#[derive(Debug)]
enum Incoming {
    Request(Request),
    Malformed(String),
}

impl Server {
    /// Create a new IPC server
    pub fn new(socket_path: &Path, deck: Arc<Deck>, status: DaemonStatus, handles: Handles) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path)
            .context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            context: Arc::new(ClientContext::new(deck, status, handles)),
            shutdown_tx,
        })
    }

    /// Update the server's snapshot of the application state
    pub async fn set_state(&self, app: AppState) {
        self.context.state.write().await.app = app;
    }

    /// Update the reported session lifecycle
    pub async fn set_session(&self, session: SessionState) {
        let mut state = self.context.state.write().await;
        if state.status.session != session {
            info!(from = %state.status.session, to = %session, "IPC server: session updated");
        }
        state.status.session = session;
    }

    /// Update the running session transcript
    pub async fn set_transcript(&self, transcript: String) {
        self.context.state.write().await.status.transcript = transcript;
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref()
            .context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let context = Arc::clone(&self.context);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, context) => {
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
    async fn handle_client(stream: UnixStream, context: Arc<ClientContext>) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();

        // Reads happen on their own task so a half-read frame is never
        // cancelled by an outgoing notification
        let (incoming_tx, mut incoming_rx) = mpsc::channel(8);
        let reader_task = tokio::spawn(async move { read_requests(&mut reader, incoming_tx).await });

        let mut notifications: Option<broadcast::Receiver<StateEvent>> = None;

        loop {
            tokio::select! {
                incoming = incoming_rx.recv() => {
                    let response = match incoming {
                        Some(Incoming::Request(request)) => {
                            debug!(?request, "received request");
                            let (response, subscribe) = context.process_request(request).await;
                            if subscribe && notifications.is_none() {
                                debug!("client subscribed to notifications");
                                notifications = Some(context.handles.event_tx.subscribe());
                            }
                            response
                        }
                        Some(Incoming::Malformed(message)) => {
                            warn!(%message, "malformed request");
                            Response::error("bad_request", message)
                        }
                        None => break,
                    };
                    send_message(&mut writer, &response).await?;
                }

                event = next_event(&mut notifications) => {
                    match event {
                        Ok(event) => {
                            send_message(&mut writer, &Notification::Event { event }).await?;
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            notifications = None;
                        }
                    }
                }
            }
        }

        reader_task.await??;
        debug!("client disconnected");
        Ok(())
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

impl ClientContext {
    fn new(deck: Arc<Deck>, status: DaemonStatus, handles: Handles) -> Self {
        let app = AppState::new(deck.slide_count());
        Self {
            state: RwLock::new(ServerState {
                status,
                start_time: std::time::Instant::now(),
                app,
            }),
            deck,
            handles,
        }
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(&self, request: Request) -> (Response, bool) {
        let response = match request {
            Request::Ping => Response::Pong,

            Request::GetStatus => {
                let mut state = self.state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                Response::Status(state.status.clone())
            }

            Request::GetState => Response::State {
                state: self.state.read().await.app.clone(),
            },

            Request::GetCommands => Response::Commands {
                commands: self.deck.commands.clone(),
            },

            Request::GetSlides => Response::Slides {
                slides: self.deck.slides.clone(),
            },

            Request::Transcript { text } => self.submit_transcript(text.trim().to_string()).await,

            Request::Recognition { results } => match RecognitionBatch::new(results).final_transcript() {
                Some(text) => self.submit_transcript(text).await,
                // Interim-only batches never reach the parser
                None => Response::Accepted,
            },

            Request::CloseModal => self.submit_input(Input::Ui(UiAction::CloseModal)).await,

            Request::Click { target } => self.submit_input(Input::Ui(UiAction::Click { target })).await,

            Request::StartListening => self.submit_input(Input::StartListening).await,

            Request::StopListening => self.submit_input(Input::StopListening).await,

            Request::Subscribe => return (Response::Subscribed, true),
        };

        (response, false)
    }

    async fn submit_transcript(&self, text: String) -> Response {
        match self.handles.session_tx.send(SessionEvent::FinalTranscript(text)).await {
            Ok(()) => Response::Accepted,
            Err(_) => Response::error("unavailable", "state machine is not running"),
        }
    }

    async fn submit_input(&self, input: Input) -> Response {
        match self.handles.input_tx.send(input).await {
            Ok(()) => Response::Accepted,
            Err(_) => Response::error("unavailable", "state machine is not running"),
        }
    }
}

/// Wait for the next notification, or forever when not subscribed
async fn next_event(
    notifications: &mut Option<broadcast::Receiver<StateEvent>>,
) -> Result<StateEvent, broadcast::error::RecvError> {
    match notifications {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Decode length-prefixed requests until EOF
async fn read_requests<R: AsyncRead + Unpin>(reader: &mut R, incoming_tx: mpsc::Sender<Incoming>) -> Result<()> {
    let mut len_buf = [0u8; 4];

    loop {
        // Read message length (4-byte little-endian)
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_LEN {
            warn!(len, "message too large, disconnecting");
            return Ok(());
        }

        // Read message body
        let mut msg_buf = vec![0u8; len];
        reader.read_exact(&mut msg_buf).await?;

        let incoming = match serde_json::from_slice::<Request>(&msg_buf) {
            Ok(request) => Incoming::Request(request),
            Err(e) => Incoming::Malformed(e.to_string()),
        };

        if incoming_tx.send(incoming).await.is_err() {
            return Ok(());
        }
    }
}

/// Send a length-prefixed JSON message
async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: serde::Serialize,
{
    let msg_bytes = serde_json::to_vec(msg)?;
    let msg_len = (msg_bytes.len() as u32).to_le_bytes();

    writer.write_all(&msg_len).await?;
    writer.write_all(&msg_bytes).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ClickTarget;

    struct Fixture {
        context: ClientContext,
        session_rx: mpsc::Receiver<SessionEvent>,
        input_rx: mpsc::Receiver<Input>,
    }

    fn fixture() -> Fixture {
        let (session_tx, session_rx) = mpsc::channel(8);
        let (input_tx, input_rx) = mpsc::channel(8);
        let (event_tx, _) = broadcast::channel(8);
        let handles = Handles { session_tx, input_tx, event_tx };
        let context = ClientContext::new(Arc::new(Deck::default()), DaemonStatus::default(), handles);
        Fixture { context, session_rx, input_rx }
    }

    fn frame(json: &str) -> Vec<u8> {
        let mut bytes = (json.len() as u32).to_le_bytes().to_vec();
        bytes.extend_from_slice(json.as_bytes());
        bytes
    }

    #[tokio::test]
    async fn test_ping_and_subscribe() {
        let f = fixture();
        assert!(matches!(f.context.process_request(Request::Ping).await, (Response::Pong, false)));
        assert!(matches!(f.context.process_request(Request::Subscribe).await, (Response::Subscribed, true)));
    }

    #[tokio::test]
    async fn test_transcript_forwarded_trimmed() {
        let mut f = fixture();
        let (response, _) = f.context
            .process_request(Request::Transcript { text: "  next slide ".into() })
            .await;
        assert!(matches!(response, Response::Accepted));
        assert_eq!(f.session_rx.recv().await, Some(SessionEvent::FinalTranscript("next slide".into())));
    }

    #[tokio::test]
    async fn test_interim_recognition_not_forwarded() {
        let mut f = fixture();
        let results = vec![crate::session::RecognitionResult::interim_text("go to")];
        let (response, _) = f.context.process_request(Request::Recognition { results }).await;
        assert!(matches!(response, Response::Accepted));
        assert!(f.session_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_click_forwarded_as_ui_action() {
        let mut f = fixture();
        f.context.process_request(Request::Click { target: ClickTarget::Content }).await;
        assert!(matches!(
            f.input_rx.recv().await,
            Some(Input::Ui(UiAction::Click { target: ClickTarget::Content }))
        ));
    }

    #[tokio::test]
    async fn test_closed_machine_reports_unavailable() {
        let f = fixture();
        drop(f.input_rx);
        let (response, _) = f.context.process_request(Request::CloseModal).await;
        assert!(matches!(response, Response::Error { code, .. } if code == "unavailable"));
    }

    #[tokio::test]
    async fn test_status_reports_transcript() {
        let f = fixture();
        f.context.state.write().await.status.transcript = "next slide".into();
        match f.context.process_request(Request::GetStatus).await {
            (Response::Status(status), false) => assert_eq!(status.transcript, "next slide"),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_state_and_commands() {
        let f = fixture();
        match f.context.process_request(Request::GetState).await {
            (Response::State { state }, false) => assert_eq!(state, AppState::new(3)),
            other => panic!("unexpected response: {other:?}"),
        }
        match f.context.process_request(Request::GetCommands).await {
            (Response::Commands { commands }, false) => assert_eq!(commands, Deck::default().commands),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_requests_decodes_frames() {
        let mut input = frame(r#"{"type":"ping"}"#);
        input.extend(frame("not json"));
        let (tx, mut rx) = mpsc::channel(8);

        read_requests(&mut input.as_slice(), tx).await.unwrap();

        assert!(matches!(rx.recv().await, Some(Incoming::Request(Request::Ping))));
        assert!(matches!(rx.recv().await, Some(Incoming::Malformed(_))));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_read_requests_rejects_oversized() {
        let input = ((MAX_MESSAGE_LEN + 1) as u32).to_le_bytes();
        let (tx, mut rx) = mpsc::channel(8);

        read_requests(&mut input.as_slice(), tx).await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_send_message_frames_json() {
        let mut out = Vec::new();
        tokio_test::block_on(send_message(&mut out, &Response::Pong)).unwrap();
        let len = u32::from_le_bytes([out[0], out[1], out[2], out[3]]) as usize;
        assert_eq!(len, out.len() - 4);
        assert_eq!(&out[4..], br#"{"type":"pong"}"#);
    }
}
