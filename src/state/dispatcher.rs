//! Pure reducer over [`AppState`]
//!
//! `dispatch` never touches the outside world. Requests for the view
//! layer (repaint, route transition) come back as [`Effect`]s.

use serde::{Deserialize, Serialize};

use crate::transcript::{Command, Route};

use super::app::{AppState, DEFAULT_BACKGROUND};

/// Instructions for the view-layer adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Repaint the page background with this color
    RepaintBackground { color: String },
    /// Transition the router to this route
    Navigate { route: Route },
}

/// Result of a reducer step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// Where a pointer click landed while the help modal is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The dimmed area around the modal
    Overlay,
    /// Inside the modal content; never closes it
    Content,
}

/// Explicit UI actions that don't come from a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiAction {
    CloseModal,
    Click { target: ClickTarget },
}

/// Apply a command to the state
pub fn dispatch(state: &AppState, command: &Command) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match command {
        Command::ChangeBackgroundColor { color } => {
            next.background_color = color.clone();
            effects.push(Effect::RepaintBackground { color: color.clone() });
        }
        Command::NextSlide => {
            if next.slide_count > 0 {
                next.current_slide = (next.current_slide + 1) % next.slide_count;
            }
        }
        Command::PreviousSlide => {
            if next.slide_count > 0 {
                next.current_slide = (next.current_slide + next.slide_count - 1) % next.slide_count;
            }
        }
        Command::GoToSlide { index } => {
            if let Ok(index) = usize::try_from(*index) {
                if index < next.slide_count {
                    next.current_slide = index;
                }
            }
        }
        Command::Navigate { route } => {
            next.route = *route;
            effects.push(Effect::Navigate { route: *route });
        }
        Command::ResetBackground => {
            next.background_color = DEFAULT_BACKGROUND.to_string();
            effects.push(Effect::RepaintBackground {
                color: DEFAULT_BACKGROUND.to_string(),
            });
        }
        Command::ShowCommandsHelp => {
            next.modal_open = true;
        }
        Command::Unknown { .. } | Command::Noop => return Transition::unchanged(state),
    }

    Transition { state: next, effects }
}

/// Per-transcript bookkeeping followed by [`dispatch`]
pub fn receive(state: &AppState, raw: &str, command: &Command) -> Transition {
    let mut received = state.clone();
    received.last_command = raw.to_string();
    received.is_processing = true;
    dispatch(&received, command)
}

/// Apply an explicit UI action
pub fn apply_ui(state: &AppState, action: UiAction) -> Transition {
    match action {
        UiAction::CloseModal | UiAction::Click { target: ClickTarget::Overlay } => {
            let mut next = state.clone();
            next.modal_open = false;
            Transition { state: next, effects: Vec::new() }
        }
        UiAction::Click { target: ClickTarget::Content } => Transition::unchanged(state),
    }
}

/// Processing timer fired
pub fn clear_processing(state: &AppState) -> AppState {
    let mut next = state.clone();
    next.is_processing = false;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::CommandParser;

    fn state_at(slide_count: usize, current_slide: usize) -> AppState {
        let mut state = AppState::new(slide_count);
        state.current_slide = current_slide;
        state
    }

    #[test]
    fn test_change_background() {
        let command = CommandParser::default().interpret("Change Background Color To blue");
        let t = dispatch(&AppState::new(3), &command);
        assert_eq!(t.state.background_color, "blue");
        assert_eq!(t.effects, vec![Effect::RepaintBackground { color: "blue".into() }]);
    }

    #[test]
    fn test_invalid_color_passes_through() {
        let t = dispatch(
            &AppState::new(1),
            &Command::ChangeBackgroundColor { color: "not a color".into() },
        );
        assert_eq!(t.state.background_color, "not a color");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = AppState::new(2);
        state.background_color = "red".into();
        let once = dispatch(&state, &Command::ResetBackground).state;
        let twice = dispatch(&once, &Command::ResetBackground).state;
        assert_eq!(once.background_color, DEFAULT_BACKGROUND);
        assert_eq!(once.background_color, twice.background_color);
    }

    #[test]
    fn test_reset_requests_repaint() {
        let t = dispatch(&AppState::new(2), &Command::ResetBackground);
        assert_eq!(t.effects, vec![Effect::RepaintBackground { color: "white".into() }]);
    }

    #[test]
    fn test_next_slide_wraps_around() {
        let n = 4;
        let start = state_at(n, 2);
        let mut state = start.clone();
        for _ in 0..n {
            state = dispatch(&state, &Command::NextSlide).state;
        }
        assert_eq!(state.current_slide, start.current_slide);
    }

    #[test]
    fn test_previous_slide_wraps_from_zero() {
        let t = dispatch(&state_at(3, 0), &Command::PreviousSlide);
        assert_eq!(t.state.current_slide, 2);
    }

    #[test]
    fn test_slide_commands_with_no_slides() {
        let empty = AppState::new(0);
        for command in [Command::NextSlide, Command::PreviousSlide, Command::GoToSlide { index: 0 }] {
            assert_eq!(dispatch(&empty, &command).state, empty);
        }
    }

    #[test]
    fn test_go_to_slide_in_bounds() {
        let t = dispatch(&state_at(3, 0), &Command::GoToSlide { index: 2 });
        assert_eq!(t.state.current_slide, 2);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_go_to_slide_out_of_bounds() {
        let state = state_at(3, 1);
        for index in [-1, 3, 100, i64::MIN, i64::MAX] {
            let t = dispatch(&state, &Command::GoToSlide { index });
            assert_eq!(t.state.current_slide, 1, "index {index}");
        }
    }

    #[test]
    fn test_navigate() {
        let t = dispatch(&AppState::new(1), &Command::Navigate { route: Route::About });
        assert_eq!(t.state.route, Route::About);
        assert_eq!(t.effects, vec![Effect::Navigate { route: Route::About }]);
    }

    #[test]
    fn test_show_commands_then_close() {
        let opened = dispatch(&AppState::new(1), &Command::ShowCommandsHelp).state;
        assert!(opened.modal_open);
        let closed = apply_ui(&opened, UiAction::CloseModal).state;
        assert!(!closed.modal_open);
    }

    #[test]
    fn test_click_inside_content_keeps_modal_open() {
        let opened = dispatch(&AppState::new(1), &Command::ShowCommandsHelp).state;
        let t = apply_ui(&opened, UiAction::Click { target: ClickTarget::Content });
        assert!(t.state.modal_open);
        let t = apply_ui(&t.state, UiAction::Click { target: ClickTarget::Overlay });
        assert!(!t.state.modal_open);
    }

    #[test]
    fn test_unknown_and_noop_leave_state_untouched() {
        let state = state_at(3, 1);
        let unknown = CommandParser::default().interpret("banana");
        assert_eq!(unknown, Command::Unknown { raw: "banana".into() });
        assert_eq!(dispatch(&state, &unknown), Transition::unchanged(&state));
        assert_eq!(dispatch(&state, &Command::Noop), Transition::unchanged(&state));
    }

    #[test]
    fn test_receive_records_transcript() {
        let state = AppState::new(3);
        let t = receive(&state, "banana", &Command::Unknown { raw: "banana".into() });
        assert_eq!(t.state.last_command, "banana");
        assert!(t.state.is_processing);
        assert_eq!(t.state.current_slide, 0);
        assert_eq!(t.state.background_color, state.background_color);
    }

    #[test]
    fn test_clear_processing() {
        let t = receive(&AppState::new(1), "next slide", &Command::NextSlide);
        assert!(!clear_processing(&t.state).is_processing);
    }
}
