//! Speech session contract
//!
//! A session turns captured speech into final transcripts and reports
//! its lifecycle. The core only starts and stops it and consumes the
//! events it sends; interim results never leave the session.

mod passive;
mod recognition;
mod state;
mod stdin;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use passive::PassiveSession;
pub use recognition::{RecognitionBatch, RecognitionResult};
pub use state::{ErrorReason, SessionState};
pub use stdin::StdinSession;

/// Events sent from a session to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Final transcript of one recognition batch, already trimmed
    FinalTranscript(String),
    /// Session lifecycle changed
    Lifecycle(SessionState),
    /// Capture failed; restart is a manual action
    Error(ErrorReason),
}

/// A source of final transcripts
pub trait SpeechSession: Send {
    /// Backend name for logs and status
    fn name(&self) -> &'static str;

    /// Begin listening
    fn start(&mut self) -> Result<(), SessionError>;

    /// Stop listening; a no-op when idle
    fn stop(&mut self);

    fn is_listening(&self) -> bool;
}

/// Errors that can occur while driving a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("speech session is already listening")]
    AlreadyListening,

    #[error("speech backend {0:?} is not supported on this system")]
    Unsupported(String),

    #[error("failed to spawn session thread: {0}")]
    ThreadSpawn(String),

    #[error("session event channel closed")]
    ChannelClosed,
}

/// Available speech backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// One transcript per stdin line
    #[default]
    Stdin,
    /// Transcripts only arrive over IPC
    Passive,
}

impl FromStr for SessionBackend {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdin" => Ok(Self::Stdin),
            "passive" | "ipc" => Ok(Self::Passive),
            other => Err(SessionError::Unsupported(other.to_string())),
        }
    }
}

/// Build the session for a backend.
///
/// Capability checks live here so the state machine only ever sees a
/// working [`SpeechSession`].
pub fn open(
    backend: SessionBackend,
    events: mpsc::Sender<SessionEvent>,
) -> Result<Box<dyn SpeechSession>, SessionError> {
    if events.is_closed() {
        return Err(SessionError::ChannelClosed);
    }

    let session: Box<dyn SpeechSession> = match backend {
        SessionBackend::Stdin => Box::new(StdinSession::new(events)),
        SessionBackend::Passive => Box::new(PassiveSession::new(events)),
    };

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("stdin".parse::<SessionBackend>().unwrap(), SessionBackend::Stdin);
        assert_eq!(" IPC ".parse::<SessionBackend>().unwrap(), SessionBackend::Passive);
        assert!(matches!(
            "webkit".parse::<SessionBackend>(),
            Err(SessionError::Unsupported(name)) if name == "webkit"
        ));
    }

    #[test]
    fn test_open_rejects_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(matches!(open(SessionBackend::Passive, tx), Err(SessionError::ChannelClosed)));
    }

    #[test]
    fn test_open_passive() {
        let (tx, _rx) = mpsc::channel(1);
        let session = open(SessionBackend::Passive, tx).unwrap();
        assert_eq!(session.name(), "passive");
        assert!(!session.is_listening());
    }
}
