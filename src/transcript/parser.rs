//! Ordered rule-based command parser
//!
//! Rules are tried in a fixed priority order and the first match wins.
//! Several rules share prefixes ("go to slide" / "go to"), so the order
//! below is part of the contract:
//!
//! 1. contains "change background color to"
//! 2. starts with "next slide"
//! 3. starts with "previous slide"
//! 4. starts with "go to slide"
//! 5. starts with "go to"
//! 6. contains "reset"
//! 7. equals "show commands"
//! 8. anything else is Unknown

use std::collections::HashMap;

use tracing::debug;

use super::command::{Command, Route};
use super::normalize::normalize;

const CHANGE_BACKGROUND: &str = "change background color to";
const NEXT_SLIDE: &str = "next slide";
const PREVIOUS_SLIDE: &str = "previous slide";
const GO_TO_SLIDE: &str = "go to slide";
const GO_TO: &str = "go to";
const GO_TO_SEPARATOR: &str = "go to ";
const RESET: &str = "reset";
const SHOW_COMMANDS: &str = "show commands";

/// Keyword lookup for the "go to <page>" rule
#[derive(Debug, Clone)]
pub struct RouteTable {
    keywords: HashMap<String, Route>,
}

impl RouteTable {
    /// Table with the built-in keywords: home, about, contact
    pub fn new() -> Self {
        let keywords = [
            ("home", Route::Home),
            ("about", Route::About),
            ("contact", Route::Contact),
        ]
        .into_iter()
        .map(|(k, r)| (k.to_string(), r))
        .collect();

        Self { keywords }
    }

    /// Register an additional keyword (e.g. "presentation" for Home)
    pub fn with_alias(mut self, keyword: impl Into<String>, route: Route) -> Self {
        self.insert(keyword, route);
        self
    }

    pub fn insert(&mut self, keyword: impl Into<String>, route: Route) {
        self.keywords.insert(normalize(&keyword.into()), route);
    }

    /// Exact keyword match
    pub fn resolve(&self, keyword: &str) -> Option<Route> {
        self.keywords.get(keyword).copied()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps normalized transcripts to exactly one [`Command`]
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    routes: RouteTable,
}

impl CommandParser {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// Normalize a raw transcript and parse it.
    ///
    /// `Unknown` carries the raw transcript as received.
    pub fn interpret(&self, raw: &str) -> Command {
        match self.parse(&normalize(raw)) {
            Command::Unknown { .. } => Command::Unknown { raw: raw.to_string() },
            command => command,
        }
    }

    /// Parse already-normalized text
    pub fn parse(&self, normalized: &str) -> Command {
        self.match_rules(normalized)
            .unwrap_or_else(|| Command::Unknown { raw: normalized.to_string() })
    }

    /// Returns `None` only when the transcript should become `Unknown`
    fn match_rules(&self, text: &str) -> Option<Command> {
        let command = if let Some(pos) = text.find(CHANGE_BACKGROUND) {
            Self::background_color(&text[pos + CHANGE_BACKGROUND.len()..])
        } else if text.starts_with(NEXT_SLIDE) {
            Command::NextSlide
        } else if text.starts_with(PREVIOUS_SLIDE) {
            Command::PreviousSlide
        } else if let Some(rest) = text.strip_prefix(GO_TO_SLIDE) {
            Self::slide_index(rest)
        } else if text.starts_with(GO_TO) {
            let page = text.strip_prefix(GO_TO_SEPARATOR)?;
            match self.routes.resolve(page) {
                Some(route) => Command::Navigate { route },
                None => {
                    debug!(page, "unknown page");
                    return None;
                }
            }
        } else if text.contains(RESET) {
            Command::ResetBackground
        } else if text == SHOW_COMMANDS {
            Command::ShowCommandsHelp
        } else {
            return None;
        };

        Some(command)
    }

    fn background_color(rest: &str) -> Command {
        // Drop the single space separating the phrase from the color
        let color = rest.strip_prefix(' ').unwrap_or(rest);
        if color.is_empty() {
            Command::Noop
        } else {
            Command::ChangeBackgroundColor { color: color.to_string() }
        }
    }

    /// First run of ASCII digits, converted to a 0-based index
    fn slide_index(rest: &str) -> Command {
        let digits: String = rest
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        match digits.parse::<i64>() {
            Ok(number) => Command::GoToSlide { index: number - 1 },
            Err(_) => Command::Noop,
        }
    }
}
