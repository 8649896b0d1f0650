//! Speech session lifecycle states and error reasons

use serde::{Deserialize, Serialize};

/// Lifecycle of a speech session: Idle -> Listening -> (Idle | Error)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Listening,
    Error { reason: ErrorReason },
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
            SessionState::Error { reason } => write!(f, "Error({})", reason.code()),
        }
    }
}

/// Why the capture layer gave up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReason {
    NoSpeech,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    Other(String),
}

impl ErrorReason {
    /// Map a recognizer error code onto the closed set
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    /// Session could not be started at all
    pub fn start_failed(error: &impl std::fmt::Display) -> Self {
        Self::Other(format!("Error starting recognition: {}", error))
    }

    pub fn code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::BadGrammar => "bad-grammar",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(code) => code,
        }
    }

    /// User-facing message for the view layer
    pub fn message(&self) -> String {
        let detail = match self {
            Self::NoSpeech => "No speech detected.",
            Self::AudioCapture => "Microphone not found or audio capture failed.",
            Self::Network => "Network error. Please check your connection.",
            Self::NotAllowed => "Permission to use the microphone was denied.",
            Self::ServiceNotAllowed => "Speech recognition service is not allowed.",
            Self::BadGrammar => "Grammar or language error.",
            Self::LanguageNotSupported => "Language is not supported.",
            Self::Other(code) => code,
        };
        format!("Speech recognition error: {}", detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in ["no-speech", "audio-capture", "network", "not-allowed",
                     "service-not-allowed", "bad-grammar", "language-not-supported"] {
            let reason = ErrorReason::from_code(code);
            assert!(!matches!(reason, ErrorReason::Other(_)), "{code}");
            assert_eq!(reason.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_other() {
        let reason = ErrorReason::from_code("aborted");
        assert_eq!(reason, ErrorReason::Other("aborted".into()));
        assert_eq!(reason.message(), "Speech recognition error: aborted");
    }

    #[test]
    fn test_start_failed_message() {
        let reason = ErrorReason::start_failed(&"device busy");
        assert_eq!(reason.message(), "Speech recognition error: Error starting recognition: device busy");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ErrorReason::NotAllowed.message(),
            "Speech recognition error: Permission to use the microphone was denied."
        );
    }

    #[test]
    fn test_state_serialization() {
        let state = SessionState::Error { reason: ErrorReason::NoSpeech };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"state\":\"error\""));
        assert!(json.contains("no-speech"));
    }
}
