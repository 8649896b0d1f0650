//! Configuration loading and management

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::deck::Deck;
use crate::session::SessionBackend;
use crate::state::DEFAULT_PROCESSING_DELAY;

const ENV_SOCKET: &str = "VOICE_DECK_SOCKET";
const ENV_DECK_FILE: &str = "VOICE_DECK_FILE";
const ENV_PROCESSING_MS: &str = "VOICE_DECK_PROCESSING_MS";
const ENV_SESSION: &str = "VOICE_DECK_SESSION";
const ENV_LANG: &str = "VOICE_DECK_LANG";

const DEFAULT_LANGUAGE: &str = "en-US";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Deck JSON file; the built-in deck is used when it doesn't exist
    pub deck_path: PathBuf,

    /// How long the processing indicator stays on
    pub processing_delay: Duration,

    /// Where transcripts come from
    pub session: SessionBackend,

    /// Recognition language passed to the speech backend
    pub language: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Self::from_lookup(&home, |key| std::env::var(key).ok())
    }

    fn from_lookup(home: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("voice-deck");

        let socket_path = lookup(ENV_SOCKET)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let deck_path = lookup(ENV_DECK_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("deck.json"));

        let processing_delay = match lookup(ENV_PROCESSING_MS) {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ENV_PROCESSING_MS} must be milliseconds, got {ms:?}"))?,
            ),
            None => DEFAULT_PROCESSING_DELAY,
        };

        let session = match lookup(ENV_SESSION) {
            Some(name) => name.parse::<SessionBackend>().with_context(|| format!("invalid {ENV_SESSION}"))?,
            None => SessionBackend::default(),
        };

        let language = lookup(ENV_LANG).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Self {
            socket_path,
            data_dir,
            deck_path,
            processing_delay,
            session,
            language,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }

    /// Load the deck, falling back to the built-in one
    pub fn load_deck(&self) -> Result<Deck> {
        load_deck_from(&self.deck_path)
    }
}

fn load_deck_from(path: &Path) -> Result<Deck> {
    if !path.exists() {
        warn!(?path, "deck file not found, using built-in deck");
        return Ok(Deck::default());
    }

    let deck = Deck::from_file(path)
        .with_context(|| format!("failed to load deck from {}", path.display()))?;
    info!(?path, slides = deck.slide_count(), "deck loaded");
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup("/home/tester", |key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load_with(&[]).unwrap();
        assert!(config.socket_path.to_string_lossy().contains("voice-deck"));
        assert_eq!(config.deck_path, PathBuf::from("/home/tester/.local/share/voice-deck/deck.json"));
        assert_eq!(config.processing_delay, Duration::from_millis(500));
        assert_eq!(config.session, SessionBackend::Stdin);
        assert_eq!(config.language, "en-US");
    }

    #[test]
    fn test_config_overrides() {
        let config = load_with(&[
            (ENV_SOCKET, "/tmp/deck.sock"),
            (ENV_PROCESSING_MS, "250"),
            (ENV_SESSION, "passive"),
        ])
        .unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/deck.sock"));
        assert_eq!(config.processing_delay, Duration::from_millis(250));
        assert_eq!(config.session, SessionBackend::Passive);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load_with(&[(ENV_PROCESSING_MS, "soon")]).is_err());
        assert!(load_with(&[(ENV_SESSION, "webkit")]).is_err());
    }

    #[test]
    fn test_missing_deck_falls_back() {
        let deck = load_deck_from(Path::new("/nonexistent/voice-deck/deck.json")).unwrap();
        assert_eq!(deck, Deck::default());
    }
}
