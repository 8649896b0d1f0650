//! Core state machine runner
//!
//! Owns the [`AppState`], feeds final transcripts through the parser
//! and the reducer one at a time, and broadcasts what happened.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::events::StateEvent;
use crate::session::{ErrorReason, SessionError, SessionEvent, SessionState, SpeechSession};
use crate::transcript::{Command, CommandParser};

use super::app::AppState;
use super::dispatcher::{apply_ui, clear_processing, receive, Effect, Transition, UiAction};
use super::processing::ProcessingIndicator;

/// Inputs that don't come from the speech session
#[derive(Debug, Clone)]
pub enum Input {
    /// Explicit UI action (modal close, outside click)
    Ui(UiAction),
    /// A processing timer fired
    ProcessingElapsed { ticket: u64 },
    /// Ask the session to start listening
    StartListening,
    /// Ask the session to stop listening
    StopListening,
}

/// The state machine that applies commands to the application state
pub struct StateMachine {
    state: AppState,
    parser: CommandParser,
    indicator: ProcessingIndicator,
    session: Box<dyn SpeechSession>,
    session_state: SessionState,
    /// Final transcripts since the session last started
    transcript: String,
    event_tx: broadcast::Sender<StateEvent>,
}

impl StateMachine {
    pub fn new(
        state: AppState,
        parser: CommandParser,
        indicator: ProcessingIndicator,
        session: Box<dyn SpeechSession>,
        event_tx: broadcast::Sender<StateEvent>,
    ) -> Self {
        Self {
            state,
            parser,
            indicator,
            session,
            session_state: SessionState::Idle,
            transcript: String::new(),
            event_tx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Run until both input channels close.
    ///
    /// Each event is handled to completion before the next is taken.
    pub async fn run(
        &mut self,
        mut session_rx: mpsc::Receiver<SessionEvent>,
        mut input_rx: mpsc::Receiver<Input>,
    ) {
        info!(
            slides = self.state.slide_count,
            session = self.session.name(),
            processing_ms = self.indicator.delay().as_millis() as u64,
            "state machine started"
        );

        loop {
            tokio::select! {
                Some(event) = session_rx.recv() => self.handle_session_event(event),
                Some(input) = input_rx.recv() => self.handle_input(input),
                else => break,
            }
        }

        info!("state machine stopped");
    }

    /// Start the session.
    ///
    /// Already listening is a silent no-op. Other failures are reported
    /// to the view layer like any capture error.
    pub fn start_listening(&mut self) {
        if self.session.is_listening() {
            debug!(session = self.session.name(), "already listening");
            return;
        }

        match self.session.start() {
            Ok(()) => {
                info!(session = self.session.name(), "listening");
                self.set_transcript(String::new());
            }
            Err(SessionError::AlreadyListening) => {
                debug!(session = self.session.name(), "already listening");
            }
            Err(e) => {
                warn!(%e, "failed to start speech session");
                self.handle_session_event(SessionEvent::Error(ErrorReason::start_failed(&e)));
            }
        }
    }

    /// Stop the session
    pub fn stop_listening(&mut self) {
        self.session.stop();
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::FinalTranscript(raw) => {
                self.append_transcript(&raw);
                self.handle_transcript(&raw);
            }
            SessionEvent::Lifecycle(state) => {
                info!(from = %self.session_state, to = %state, "session lifecycle");
                self.session_state = state.clone();
                self.emit(StateEvent::SessionLifecycle { state });
            }
            SessionEvent::Error(reason) => {
                let message = reason.message();
                warn!(code = reason.code(), %message, "speech session error");
                self.session_state = SessionState::Error { reason: reason.clone() };
                self.emit(StateEvent::SessionError { reason, message });
            }
        }
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Ui(action) => {
                let transition = apply_ui(&self.state, action);
                self.apply(transition);
            }
            Input::ProcessingElapsed { ticket } => {
                // Any timer clears the flag, stale ones included
                if self.state.is_processing {
                    debug!(ticket, "processing cleared");
                    self.state = clear_processing(&self.state);
                    self.emit(StateEvent::ProcessingCleared);
                    self.emit_snapshot();
                }
            }
            Input::StartListening => self.start_listening(),
            Input::StopListening => self.stop_listening(),
        }
    }

    fn append_transcript(&mut self, text: &str) {
        let mut transcript = std::mem::take(&mut self.transcript);
        if !transcript.is_empty() && !text.is_empty() {
            transcript.push(' ');
        }
        transcript.push_str(text);
        self.set_transcript(transcript);
    }

    fn set_transcript(&mut self, transcript: String) {
        self.transcript = transcript;
        self.emit(StateEvent::TranscriptUpdated { transcript: self.transcript.clone() });
    }

    /// Interpret one final transcript and apply it
    fn handle_transcript(&mut self, raw: &str) {
        let command = self.parser.interpret(raw);
        info!(raw, %command, "command received");

        self.emit(StateEvent::CommandReceived {
            raw: raw.to_string(),
            command: command.clone(),
        });

        if let Command::Unknown { raw } = &command {
            warn!(raw = %raw, "unknown command");
            self.emit(StateEvent::UnknownCommand { raw: raw.clone() });
        }

        let was_processing = self.state.is_processing;
        let transition = receive(&self.state, raw, &command);
        if !was_processing {
            self.emit(StateEvent::ProcessingStarted);
        }
        self.indicator.arm();
        self.apply(transition);
    }

    /// Commit a transition and report what changed
    fn apply(&mut self, transition: Transition) {
        let Transition { state, effects } = transition;
        let old = std::mem::replace(&mut self.state, state);

        for effect in effects {
            let event = match effect {
                Effect::RepaintBackground { color } => StateEvent::BackgroundRepaint { color },
                Effect::Navigate { route } => {
                    info!(from = %old.route, to = %route, "route change");
                    StateEvent::RouteChange { route }
                }
            };
            self.emit(event);
        }

        if old.current_slide != self.state.current_slide {
            info!(
                from = old.current_slide,
                to = self.state.current_slide,
                "slide change"
            );
            self.emit(StateEvent::SlideChanged { index: self.state.current_slide });
        }

        match (old.modal_open, self.state.modal_open) {
            (false, true) => self.emit(StateEvent::ModalOpened),
            (true, false) => self.emit(StateEvent::ModalClosed),
            _ => {}
        }

        self.emit_snapshot();
    }

    fn emit_snapshot(&self) {
        self.emit(StateEvent::StateUpdated { state: self.state.clone() });
    }

    fn emit(&self, event: StateEvent) {
        debug!(%event, "emitting event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
