//! Line-oriented speech session reading from stdin
//!
//! Each line is one recognition batch holding a single result:
//! - `~text` is an interim result and is dropped
//! - `!code` reports a recognizer error (e.g. `!no-speech`)
//! - anything else is a final transcript
//!
//! Runs on a dedicated thread since stdin reads block.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::recognition::{RecognitionBatch, RecognitionResult};
use super::{ErrorReason, SessionError, SessionEvent, SessionState, SpeechSession};

/// What a single input line carries
#[derive(Debug, Clone, PartialEq)]
enum LineInput {
    Batch(RecognitionBatch),
    Error(ErrorReason),
}

fn parse_line(line: &str) -> LineInput {
    if let Some(code) = line.strip_prefix('!') {
        LineInput::Error(ErrorReason::from_code(code.trim()))
    } else if let Some(interim) = line.strip_prefix('~') {
        LineInput::Batch(RecognitionBatch::new(vec![RecognitionResult::interim_text(interim)]))
    } else {
        LineInput::Batch(RecognitionBatch::new(vec![RecognitionResult::final_text(line)]))
    }
}

pub struct StdinSession {
    events: mpsc::Sender<SessionEvent>,
    listening: Arc<AtomicBool>,
    reader_alive: Arc<AtomicBool>,
}

impl StdinSession {
    pub fn new(events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            events,
            listening: Arc::new(AtomicBool::new(false)),
            reader_alive: Arc::new(AtomicBool::new(false)),
        }
    }

    fn spawn_reader(&self) -> Result<(), SessionError> {
        if self.reader_alive.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let events = self.events.clone();
        let listening = Arc::clone(&self.listening);
        let reader_alive = Arc::clone(&self.reader_alive);

        thread::Builder::new()
            .name("speech-session".to_string())
            .spawn(move || {
                info!("stdin session thread started");
                read_lines(std::io::stdin().lock(), &events, &listening);
                listening.store(false, Ordering::SeqCst);
                reader_alive.store(false, Ordering::SeqCst);
                info!("stdin session thread stopped");
            })
            .map_err(|e| {
                self.reader_alive.store(false, Ordering::SeqCst);
                SessionError::ThreadSpawn(e.to_string())
            })?;

        Ok(())
    }
}

impl SpeechSession for StdinSession {
    fn name(&self) -> &'static str {
        "stdin"
    }

    fn start(&mut self) -> Result<(), SessionError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyListening);
        }

        if let Err(e) = self.spawn_reader() {
            self.listening.store(false, Ordering::SeqCst);
            return Err(e);
        }

        if self.events.try_send(SessionEvent::Lifecycle(SessionState::Listening)).is_err() {
            self.listening.store(false, Ordering::SeqCst);
            return Err(SessionError::ChannelClosed);
        }

        Ok(())
    }

    fn stop(&mut self) {
        // The reader keeps draining stdin but forwards nothing while stopped
        if self.listening.swap(false, Ordering::SeqCst) {
            let _ = self.events.try_send(SessionEvent::Lifecycle(SessionState::Idle));
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

/// Forward lines until EOF, a read error, or the channel closes
fn read_lines(reader: impl BufRead, events: &mpsc::Sender<SessionEvent>, listening: &AtomicBool) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "stdin read failed");
                listening.store(false, Ordering::SeqCst);
                let _ = events.blocking_send(SessionEvent::Error(ErrorReason::AudioCapture));
                return;
            }
        };

        if !listening.load(Ordering::SeqCst) {
            debug!("session stopped, dropping line");
            continue;
        }

        let event = match parse_line(&line) {
            LineInput::Batch(batch) => match batch.final_transcript() {
                Some(text) => SessionEvent::FinalTranscript(text),
                None => continue,
            },
            LineInput::Error(reason) => {
                listening.store(false, Ordering::SeqCst);
                SessionEvent::Error(reason)
            }
        };

        if events.blocking_send(event).is_err() {
            warn!("failed to send session event - channel closed?");
            return;
        }
    }

    debug!("stdin reached EOF");
    if listening.swap(false, Ordering::SeqCst) {
        let _ = events.blocking_send(SessionEvent::Lifecycle(SessionState::Idle));
    }
}
