use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Exercise content
// =============================================================================

/// One expected input token within an exercise, typically a single character.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unit {
    pub text: String,
}

impl Unit {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Case-insensitive comparison against a typed token.
    pub fn matches(&self, typed: &str) -> bool {
        self.text.to_lowercase() == typed.to_lowercase()
    }
}

impl From<&str> for Unit {
    fn from(text: &str) -> Self {
        Unit::new(text)
    }
}

/// Mission text shown and spoken once an exercise is completed, keyed by
/// language tag (e.g. `"sv-SE"`, `"en"`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInstructions {
    pub mission_summary: BTreeMap<String, String>,
}

impl TaskInstructions {
    /// Summary for `language`, falling back to English and then to any entry.
    pub fn summary_for(&self, language: &str) -> Option<&str> {
        self.mission_summary
            .get(language)
            .or_else(|| self.mission_summary.get("en"))
            .or_else(|| self.mission_summary.values().next())
            .map(String::as_str)
    }
}

/// An ordered sequence of units forming one session's content.
///
/// Treated as immutable once a session has been started on it; sessions hold
/// it behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub instructions: TaskInstructions,
}

impl Exercise {
    pub fn new(id: impl Into<String>, units: Vec<Unit>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            units,
            instructions: TaskInstructions::default(),
        }
    }

    /// Build an exercise with one unit per character of `text`.
    pub fn from_chars(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, text.chars().map(|c| Unit::new(c.to_string())).collect())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }
}

// =============================================================================
// Session context
// =============================================================================

/// The reward character picked by the surrounding application.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCharacter {
    pub name: String,
    pub image: String,
}

/// Voice parameters passed to the speech synthesizer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    /// BCP 47 language tag, `None` for the synthesizer default.
    pub language: Option<String>,
    /// Speaking rate multiplier, `None` for the synthesizer default.
    pub rate: Option<f32>,
}

impl VoiceOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }
}
