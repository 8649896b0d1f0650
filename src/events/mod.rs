//! Events module for the view layer
//!
//! Every transcript, UI action and session change is reported as a
//! structured event. View adapters act on the repaint and route events;
//! `StateUpdated` carries the full snapshot after each transition.

use serde::{Deserialize, Serialize};

use crate::session::{ErrorReason, SessionState};
use crate::state::AppState;
use crate::transcript::{Command, Route};

/// Events emitted by the state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// A final transcript was interpreted
    CommandReceived { raw: String, command: Command },

    /// Repaint the page background
    BackgroundRepaint { color: String },

    /// Transition the router
    RouteChange { route: Route },

    /// Current slide moved
    SlideChanged { index: usize },

    /// Command reference modal opened
    ModalOpened,

    /// Command reference modal closed
    ModalClosed,

    /// No rule matched the transcript
    UnknownCommand { raw: String },

    /// Processing indicator switched on
    ProcessingStarted,

    /// Processing indicator switched off by a timer
    ProcessingCleared,

    /// Speech session lifecycle changed
    SessionLifecycle { state: SessionState },

    /// Speech session failed
    SessionError { reason: ErrorReason, message: String },

    /// Running transcript since the session last started
    TranscriptUpdated { transcript: String },

    /// Snapshot after a transition
    StateUpdated { state: AppState },
}

impl std::fmt::Display for StateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateEvent::CommandReceived { command, .. } => write!(f, "COMMAND_RECEIVED ({})", command),
            StateEvent::BackgroundRepaint { color } => write!(f, "BACKGROUND_REPAINT ({})", color),
            StateEvent::RouteChange { route } => write!(f, "ROUTE_CHANGE ({})", route.path()),
            StateEvent::SlideChanged { index } => write!(f, "SLIDE_CHANGED ({})", index),
            StateEvent::ModalOpened => write!(f, "MODAL_OPENED"),
            StateEvent::ModalClosed => write!(f, "MODAL_CLOSED"),
            StateEvent::UnknownCommand { raw } => write!(f, "UNKNOWN_COMMAND ({:?})", raw),
            StateEvent::ProcessingStarted => write!(f, "PROCESSING_STARTED"),
            StateEvent::ProcessingCleared => write!(f, "PROCESSING_CLEARED"),
            StateEvent::SessionLifecycle { state } => write!(f, "SESSION_LIFECYCLE ({})", state),
            StateEvent::SessionError { reason, .. } => write!(f, "SESSION_ERROR ({})", reason.code()),
            StateEvent::TranscriptUpdated { transcript } => write!(f, "TRANSCRIPT_UPDATED ({:?})", transcript),
            StateEvent::StateUpdated { .. } => write!(f, "STATE_UPDATED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = StateEvent::BackgroundRepaint { color: "blue".into() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("background_repaint"));
        assert!(json.contains("blue"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"modal_opened"}"#;
        let event: StateEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, StateEvent::ModalOpened));
    }

    #[test]
    fn test_route_change_display() {
        let event = StateEvent::RouteChange { route: Route::Contact };
        assert_eq!(event.to_string(), "ROUTE_CHANGE (/contact)");
    }
}
