//! Session without local capture; transcripts arrive over IPC

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{SessionError, SessionEvent, SessionState, SpeechSession};

pub struct PassiveSession {
    events: mpsc::Sender<SessionEvent>,
    listening: bool,
}

impl PassiveSession {
    pub fn new(events: mpsc::Sender<SessionEvent>) -> Self {
        Self { events, listening: false }
    }

    fn notify(&self, state: SessionState) {
        if self.events.try_send(SessionEvent::Lifecycle(state)).is_err() {
            warn!("failed to send lifecycle event - channel full or closed");
        }
    }
}

impl SpeechSession for PassiveSession {
    fn name(&self) -> &'static str {
        "passive"
    }

    fn start(&mut self) -> Result<(), SessionError> {
        if self.listening {
            return Err(SessionError::AlreadyListening);
        }
        self.listening = true;
        debug!("passive session listening");
        self.notify(SessionState::Listening);
        Ok(())
    }

    fn stop(&mut self) {
        if self.listening {
            self.listening = false;
            self.notify(SessionState::Idle);
        }
    }

    fn is_listening(&self) -> bool {
        self.listening
    }
}
