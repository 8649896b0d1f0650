//! Fixed-delay processing indicator
//!
//! Every received transcript arms its own timer. Timers are never
//! cancelled or coalesced: whichever fires clears the flag, including
//! a stale one from an earlier command.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::machine::Input;

/// Default time the indicator stays on after a command
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Schedules `Input::ProcessingElapsed` back into the state machine
pub struct ProcessingIndicator {
    delay: Duration,
    input_tx: mpsc::Sender<Input>,
    next_ticket: u64,
}

impl ProcessingIndicator {
    pub fn new(delay: Duration, input_tx: mpsc::Sender<Input>) -> Self {
        Self {
            delay,
            input_tx,
            next_ticket: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start an independent timer and return its ticket
    pub fn arm(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let delay = self.delay;
        let input_tx = self.input_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(ticket, "processing timer fired");
            // Machine may already be gone at shutdown
            let _ = input_tx.send(Input::ProcessingElapsed { ticket }).await;
        });

        ticket
    }
}
