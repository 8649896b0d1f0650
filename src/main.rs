//! voice-deck-daemon: turns spoken transcripts into slide deck actions
//!
//! The daemon provides:
//! - A speech session that delivers final transcripts
//! - An ordered rule parser from transcript to command
//! - A state machine holding slide, background, route and modal state
//! - IPC server for the view layer (snapshots, actions, notifications)
//!
//! Rendering and route transitions are left to the view layer, which
//! acts on the events broadcast here.

mod config;
mod deck;
mod events;
mod ipc;
mod lifecycle;
mod session;
mod state;
mod transcript;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::StateEvent;
use crate::ipc::{DaemonStatus, Handles, Server};
use crate::lifecycle::ShutdownSignal;
use crate::state::{AppState, ProcessingIndicator, StateMachine};
use crate::transcript::CommandParser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "voice-deck-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, session = ?config.session, "configuration loaded");

    let deck = Arc::new(config.load_deck()?);

    // Create shutdown signal handler
    let mut shutdown = ShutdownSignal::new()?;

    // Create channels for inter-component communication
    // Speech session / IPC transcripts -> State machine
    let (session_tx, session_rx) = mpsc::channel(32);
    // UI actions, session control and timers -> State machine
    let (input_tx, input_rx) = mpsc::channel(32);
    // State machine -> IPC server (for broadcasting state events)
    let (event_tx, _event_rx) = broadcast::channel::<StateEvent>(64);

    let speech = session::open(config.session, session_tx.clone())?;
    let backend = speech.name();

    // Create the state machine
    let indicator = ProcessingIndicator::new(config.processing_delay, input_tx.clone());
    let mut state_machine = StateMachine::new(
        AppState::new(deck.slide_count()),
        CommandParser::new(deck.route_table()),
        indicator,
        speech,
        event_tx.clone(),
    );

    // Start listening right away; failures leave the session idle
    state_machine.start_listening();

    // Create IPC server
    let status = DaemonStatus {
        backend: backend.to_string(),
        language: config.language.clone(),
        slide_count: deck.slide_count(),
        ..DaemonStatus::default()
    };
    let handles = Handles {
        session_tx,
        input_tx,
        event_tx: event_tx.clone(),
    };
    let server = Server::new(&config.socket_path, Arc::clone(&deck), status, handles)?;

    // Subscribe to state events for IPC updates
    let mut ipc_event_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the state machine (processes transcripts and UI actions)
        _ = state_machine.run(session_rx, input_rx) => {
            info!("state machine exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Keep the IPC server's snapshot in sync
        _ = async {
            loop {
                match ipc_event_rx.recv().await {
                    Ok(StateEvent::StateUpdated { state }) => {
                        server_for_events.set_state(state).await;
                    }
                    Ok(StateEvent::SessionLifecycle { state }) => {
                        server_for_events.set_session(state).await;
                    }
                    Ok(StateEvent::TranscriptUpdated { transcript }) => {
                        server_for_events.set_transcript(transcript).await;
                    }
                    Ok(StateEvent::SessionError { reason, message }) => {
                        warn!(%message, "speech session stopped");
                        server_for_events.set_session(session::SessionState::Error { reason }).await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("state event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    state_machine.stop_listening();
    server.shutdown().await;

    info!(
        session = %state_machine.session_state(),
        slide = state_machine.state().current_slide,
        last_command = %state_machine.state().last_command,
        transcript = state_machine.transcript(),
        "final state"
    );

    info!("voice-deck-daemon stopped");

    Ok(())
}
