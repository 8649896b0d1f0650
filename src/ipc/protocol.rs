//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::deck::{CommandHelp, Slide};
use crate::events::StateEvent;
use crate::session::{RecognitionResult, SessionState};
use crate::state::{AppState, ClickTarget};

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Requests from the view layer to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request current daemon status
    GetStatus,

    /// Request the application state snapshot
    GetState,

    /// Command reference for the help modal
    GetCommands,

    /// Slide content
    GetSlides,

    /// Submit a final transcript captured elsewhere
    Transcript { text: String },

    /// Submit a raw recognition batch; only final results are used
    Recognition { results: Vec<RecognitionResult> },

    /// Close button on the help modal
    CloseModal,

    /// Pointer click while the help modal is shown
    Click { target: ClickTarget },

    /// Start the speech session
    StartListening,

    /// Stop the speech session
    StopListening,

    /// Subscribe to state change notifications
    Subscribe,
}

/// Responses from daemon to the view layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Application state snapshot
    State { state: AppState },

    /// Command reference entries, in display order
    Commands { commands: Vec<CommandHelp> },

    /// Slides, in display order
    Slides { slides: Vec<Slide> },

    /// Input queued for the state machine
    Accepted,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Push notification from daemon to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// State event occurred
    Event { event: StateEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Speech session lifecycle
    pub session: SessionState,

    /// Speech backend name
    pub backend: String,

    /// Recognition language
    pub language: String,

    /// Final transcripts since listening last started
    pub transcript: String,

    /// Number of slides in the deck
    pub slide_count: usize,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            session: SessionState::default(),
            backend: String::new(),
            language: String::new(),
            transcript: String::new(),
            slide_count: 0,
            uptime_secs: 0,
        }
    }
}
