use serde::{Deserialize, Serialize};

/// Marker the fill-blank editor inserts where the answer goes.
pub const BLANK_MARKER: &str = "___";

/// Tagged content payload shared by exercises and exam questions. The
/// discriminator is the `type` field of the stored JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExerciseContent {
    #[serde(rename_all = "camelCase")]
    MultipleChoice {
        prompt: String,
        options: Vec<String>,
        correct_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    FillBlank { sentence: String, answer: String },
    #[serde(rename_all = "camelCase")]
    Matching { pairs: Vec<MatchingPair> },
    #[serde(rename_all = "camelCase")]
    Listening { audio_url: String, transcript: String },
    #[serde(rename_all = "camelCase")]
    Translation {
        source_text: String,
        expected_text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

impl ExerciseContent {
    pub fn kind(&self) -> &'static str {
        match self {
            ExerciseContent::MultipleChoice { .. } => "multipleChoice",
            ExerciseContent::FillBlank { .. } => "fillBlank",
            ExerciseContent::Matching { .. } => "matching",
            ExerciseContent::Listening { .. } => "listening",
            ExerciseContent::Translation { .. } => "translation",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ExerciseContent::MultipleChoice {
                prompt,
                options,
                correct_index,
            } => {
                if prompt.trim().is_empty() {
                    return Err("multiple-choice prompt must not be empty".to_string());
                }
                if options.len() < 2 {
                    return Err("multiple-choice needs at least 2 options".to_string());
                }
                if options.iter().any(|option| option.trim().is_empty()) {
                    return Err("multiple-choice options must not be empty".to_string());
                }
                if *correct_index >= options.len() {
                    return Err("correctIndex is out of range".to_string());
                }
                Ok(())
            }
            ExerciseContent::FillBlank { sentence, answer } => {
                if !sentence.contains(BLANK_MARKER) {
                    return Err(format!("fill-blank sentence must contain \"{BLANK_MARKER}\""));
                }
                if answer.trim().is_empty() {
                    return Err("fill-blank answer must not be empty".to_string());
                }
                Ok(())
            }
            ExerciseContent::Matching { pairs } => {
                if pairs.is_empty() {
                    return Err("matching needs at least one pair".to_string());
                }
                if pairs
                    .iter()
                    .any(|pair| pair.left.trim().is_empty() || pair.right.trim().is_empty())
                {
                    return Err("matching pairs must not have empty sides".to_string());
                }
                Ok(())
            }
            ExerciseContent::Listening {
                audio_url,
                transcript,
            } => {
                if audio_url.trim().is_empty() {
                    return Err("listening audioUrl must not be empty".to_string());
                }
                if transcript.trim().is_empty() {
                    return Err("listening transcript must not be empty".to_string());
                }
                Ok(())
            }
            ExerciseContent::Translation {
                source_text,
                expected_text,
            } => {
                if source_text.trim().is_empty() || expected_text.trim().is_empty() {
                    return Err("translation texts must not be empty".to_string());
                }
                Ok(())
            }
        }
    }
}

/// Parses and validates a content payload coming in from the editor.
pub fn validate_content(value: &serde_json::Value) -> Result<ExerciseContent, String> {
    let content: ExerciseContent = serde_json::from_value(value.clone())
        .map_err(|err| format!("unrecognized content shape: {err}"))?;
    content.validate()?;
    Ok(content)
}

/// Discriminator of a stored payload, even one that no longer parses.
pub fn content_kind(value: &serde_json::Value) -> Option<String> {
    value
        .get("type")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogLine {
    pub speaker: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

pub fn validate_dialog_lines(lines: &[DialogLine]) -> Result<(), String> {
    if lines.is_empty() {
        return Err("dialog needs at least one line".to_string());
    }
    for line in lines {
        if line.speaker.trim().is_empty() {
            return Err("dialog line speaker must not be empty".to_string());
        }
        if line.text.trim().is_empty() {
            return Err("dialog line text must not be empty".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multiple_choice_round_trips() {
        let raw = json!({
            "type": "multipleChoice",
            "prompt": "Pick the article for 'Haus'",
            "options": ["der", "die", "das"],
            "correctIndex": 2
        });
        let content = validate_content(&raw).unwrap();
        assert_eq!(content.kind(), "multipleChoice");
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }

    #[test]
    fn multiple_choice_rejects_out_of_range_index() {
        let raw = json!({
            "type": "multipleChoice",
            "prompt": "Pick one",
            "options": ["a", "b"],
            "correctIndex": 2
        });
        let err = validate_content(&raw).unwrap_err();
        assert!(err.contains("correctIndex"));
    }

    #[test]
    fn multiple_choice_rejects_single_option() {
        let raw = json!({
            "type": "multipleChoice",
            "prompt": "Pick one",
            "options": ["a"],
            "correctIndex": 0
        });
        assert!(validate_content(&raw).is_err());
    }

    #[test]
    fn fill_blank_requires_marker() {
        let missing = json!({
            "type": "fillBlank",
            "sentence": "Ich gehe zur Schule",
            "answer": "zur"
        });
        assert!(validate_content(&missing).is_err());

        let ok = json!({
            "type": "fillBlank",
            "sentence": "Ich gehe ___ Schule",
            "answer": "zur"
        });
        assert!(validate_content(&ok).is_ok());
    }

    #[test]
    fn matching_rejects_empty_pairs() {
        let raw = json!({ "type": "matching", "pairs": [] });
        assert!(validate_content(&raw).is_err());

        let raw = json!({
            "type": "matching",
            "pairs": [{ "left": "dog", "right": "der Hund" }]
        });
        assert!(validate_content(&raw).is_ok());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let raw = json!({ "type": "crossword", "grid": [] });
        let err = validate_content(&raw).unwrap_err();
        assert!(err.contains("unrecognized content shape"));
    }

    #[test]
    fn content_kind_reads_broken_payloads() {
        let raw = json!({ "type": "matching", "pairs": "not-an-array" });
        assert!(validate_content(&raw).is_err());
        assert_eq!(content_kind(&raw).as_deref(), Some("matching"));
    }

    #[test]
    fn dialog_lines_validated() {
        let lines = vec![DialogLine {
            speaker: "Anna".to_string(),
            text: "Guten Tag!".to_string(),
            translation: Some("Good day!".to_string()),
        }];
        assert!(validate_dialog_lines(&lines).is_ok());
        assert!(validate_dialog_lines(&[]).is_err());

        let blank_speaker = vec![DialogLine {
            speaker: " ".to_string(),
            text: "hello".to_string(),
            translation: None,
        }];
        assert!(validate_dialog_lines(&blank_speaker).is_err());
    }
}
