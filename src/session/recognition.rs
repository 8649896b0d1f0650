//! Recognition batches delivered by a speech backend
//!
//! A batch may mix interim and final results. Only final results reach
//! the command parser.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Best alternative first
    pub alternatives: Vec<Alternative>,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            alternatives: vec![Alternative { transcript: text.into(), confidence: 1.0 }],
            is_final: true,
        }
    }

    pub fn interim_text(text: impl Into<String>) -> Self {
        Self {
            alternatives: vec![Alternative { transcript: text.into(), confidence: 0.0 }],
            is_final: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionBatch {
    pub results: Vec<RecognitionResult>,
}

impl RecognitionBatch {
    pub fn new(results: Vec<RecognitionResult>) -> Self {
        Self { results }
    }

    /// Top alternatives of all final results, concatenated in arrival
    /// order and trimmed. `None` if the batch holds no final result.
    pub fn final_transcript(&self) -> Option<String> {
        let mut finals = self.results.iter().filter(|r| r.is_final).peekable();
        finals.peek()?;

        let text: String = finals
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect();

        Some(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interim_only_batch_is_dropped() {
        let batch = RecognitionBatch::new(vec![RecognitionResult::interim_text("next")]);
        assert_eq!(batch.final_transcript(), None);
        assert_eq!(RecognitionBatch::default().final_transcript(), None);
    }

    #[test]
    fn test_finals_concatenated_in_order() {
        let batch = RecognitionBatch::new(vec![
            RecognitionResult::final_text(" go to"),
            RecognitionResult::interim_text(" ignored"),
            RecognitionResult::final_text(" about "),
        ]);
        assert_eq!(batch.final_transcript().as_deref(), Some("go to about"));
    }

    #[test]
    fn test_only_top_alternative_used() {
        let batch = RecognitionBatch::new(vec![RecognitionResult {
            alternatives: vec![
                Alternative { transcript: "next slide".into(), confidence: 0.9 },
                Alternative { transcript: "text slide".into(), confidence: 0.4 },
            ],
            is_final: true,
        }]);
        assert_eq!(batch.final_transcript().as_deref(), Some("next slide"));
    }

    #[test]
    fn test_deserialize_without_confidence() {
        let json = r#"{"results":[{"alternatives":[{"transcript":"reset"}],"is_final":true}]}"#;
        let batch: RecognitionBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.final_transcript().as_deref(), Some("reset"));
    }
}
