//! Typed commands produced from transcripts

use serde::{Deserialize, Serialize};

/// Application views reachable by voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Home,
    About,
    Contact,
}

impl Route {
    /// Path the router should transition to
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Contact => "/contact",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "home"),
            Route::About => write!(f, "about"),
            Route::Contact => write!(f, "contact"),
        }
    }
}

/// The closed set of actions a transcript can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Set background to a literal color token
    ChangeBackgroundColor { color: String },
    /// Advance one slide, wrapping
    NextSlide,
    /// Go back one slide, wrapping
    PreviousSlide,
    /// Jump to a 0-based slide index (may be out of range)
    GoToSlide { index: i64 },
    /// Request a route change
    Navigate { route: Route },
    /// Restore the default background
    ResetBackground,
    /// Open the command reference modal
    ShowCommandsHelp,
    /// No rule matched
    Unknown { raw: String },
    /// A rule matched but carried no usable payload
    Noop,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::ChangeBackgroundColor { color } => write!(f, "CHANGE_BACKGROUND_COLOR ({})", color),
            Command::NextSlide => write!(f, "NEXT_SLIDE"),
            Command::PreviousSlide => write!(f, "PREVIOUS_SLIDE"),
            Command::GoToSlide { index } => write!(f, "GO_TO_SLIDE ({})", index),
            Command::Navigate { route } => write!(f, "NAVIGATE ({})", route),
            Command::ResetBackground => write!(f, "RESET_BACKGROUND"),
            Command::ShowCommandsHelp => write!(f, "SHOW_COMMANDS_HELP"),
            Command::Unknown { raw } => write!(f, "UNKNOWN ({:?})", raw),
            Command::Noop => write!(f, "NOOP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::GoToSlide { index: 1 };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("go_to_slide"));
        assert!(json.contains("\"index\":1"));
    }

    #[test]
    fn test_navigate_deserialization() {
        let json = r#"{"type":"navigate","route":"contact"}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(cmd, Command::Navigate { route: Route::Contact });
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::About.path(), "/about");
        assert_eq!(Route::Contact.path(), "/contact");
    }
}
