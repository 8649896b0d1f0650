//! Application state module
//!
//! - app: the state record and its invariants
//! - dispatcher: pure reducer from commands and UI actions to new state
//! - processing: fixed-delay "command just handled" indicator
//! - machine: async runner that owns the state and emits events

mod app;
mod dispatcher;
mod machine;
mod processing;

pub use app::AppState;
pub use dispatcher::{ClickTarget, UiAction};
pub use machine::{Input, StateMachine};
pub use processing::{ProcessingIndicator, DEFAULT_DELAY as DEFAULT_PROCESSING_DELAY};
