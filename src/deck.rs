//! Deck content: slides, command reference and route aliases
//!
//! Loaded once at startup and never mutated by commands.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::transcript::{Route, RouteTable};

/// One unit of presentation content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Entry shown by the help modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHelp {
    pub command: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("failed to read deck file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid deck file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default = "default_commands")]
    pub commands: Vec<CommandHelp>,
    /// Extra "go to" keywords on top of home/about/contact
    #[serde(default)]
    pub route_aliases: BTreeMap<String, Route>,
}

impl Deck {
    /// Read a JSON deck file
    pub fn from_file(path: &Path) -> Result<Self, DeckError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DeckError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Route keywords for the parser
    pub fn route_table(&self) -> RouteTable {
        self.route_aliases
            .iter()
            .fold(RouteTable::new(), |table, (keyword, route)| table.with_alias(keyword.as_str(), *route))
    }
}

impl Default for Deck {
    fn default() -> Self {
        let slide = |title: &str, content: &str| Slide {
            title: title.to_string(),
            content: content.to_string(),
            image_path: None,
        };

        Self {
            slides: vec![
                slide("Welcome", "Drive this deck with your voice."),
                slide("Navigation", "Say \"next slide\", \"previous slide\" or \"go to slide 3\"."),
                slide("Styling", "Say \"change background color to lightblue\", then \"reset\"."),
            ],
            commands: default_commands(),
            route_aliases: BTreeMap::from([("presentation".to_string(), Route::Home)]),
        }
    }
}

fn default_commands() -> Vec<CommandHelp> {
    [
        ("next slide", "Go to the next slide"),
        ("previous slide", "Go to the previous slide"),
        ("go to slide [number]", "Jump to a specific slide"),
        ("change background color to [color]", "Change the page background"),
        ("reset", "Restore the default background"),
        ("go to [home|about|contact]", "Open another page"),
        ("show commands", "Show this list"),
    ]
    .into_iter()
    .map(|(command, description)| CommandHelp {
        command: command.to_string(),
        description: description.to_string(),
    })
    .collect()
}
