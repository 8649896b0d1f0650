//! The application state record

use serde::{Deserialize, Serialize};

use crate::transcript::Route;

/// Background color restored by "reset"
pub const DEFAULT_BACKGROUND: &str = "white";

/// Everything the view layer renders from.
///
/// `current_slide < slide_count` holds whenever `slide_count > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Fixed at startup from the deck
    pub slide_count: usize,
    pub current_slide: usize,
    /// Free-form color token, never validated
    pub background_color: String,
    pub route: Route,
    pub modal_open: bool,
    /// Last raw transcript received
    pub last_command: String,
    pub is_processing: bool,
}

impl AppState {
    pub fn new(slide_count: usize) -> Self {
        Self {
            slide_count,
            current_slide: 0,
            background_color: DEFAULT_BACKGROUND.to_string(),
            route: Route::Home,
            modal_open: false,
            last_command: String::new(),
            is_processing: false,
        }
    }
}
