//! Exercise catalog loaded from TOML.
//!
//! ```toml
//! [[exercise]]
//! id = "home-row"
//! title = "Mission 1"
//! text = "asdf jklö"
//!
//! [exercise.instructions.mission_summary]
//! en = "You found the home row!"
//! ```
//!
//! An entry gives its units either as a `units` list or as a `text` string
//! split into characters.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use keytutor_core::error::{Result, TutorError};
use keytutor_core::types::{Exercise, TaskInstructions, Unit};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "exercise")]
    exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Deserialize)]
struct ExerciseEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    units: Option<Vec<Unit>>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    instructions: TaskInstructions,
}

impl ExerciseEntry {
    fn into_exercise(self) -> Result<Exercise> {
        let units = match (self.units, self.text) {
            (Some(_), Some(_)) => {
                return Err(TutorError::Exercise(format!(
                    "Exercise '{}' sets both `units` and `text`",
                    self.id
                )))
            }
            (Some(units), None) => units,
            (None, Some(text)) => text.chars().map(|c| Unit::new(c.to_string())).collect(),
            (None, None) => Vec::new(),
        };
        if units.is_empty() {
            return Err(TutorError::Exercise(format!(
                "Exercise '{}' has no units",
                self.id
            )));
        }
        if units.iter().any(|u| u.text.is_empty()) {
            return Err(TutorError::Exercise(format!(
                "Exercise '{}' contains an empty unit",
                self.id
            )));
        }
        Ok(Exercise {
            id: self.id,
            title: self.title,
            units,
            instructions: self.instructions,
        })
    }
}

/// Ordered list of exercises. Each exercise is shared immutably with the
/// sessions running it.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<Arc<Exercise>>,
}

impl ExerciseCatalog {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises: exercises.into_iter().map(Arc::new).collect(),
        }
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            exercises = catalog.len(),
            "Exercise catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse catalog TOML. Ids must be unique and every exercise non-empty.
    pub fn parse(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut seen = HashSet::new();
        let mut exercises = Vec::with_capacity(file.exercises.len());
        for entry in file.exercises {
            if entry.id.trim().is_empty() {
                return Err(TutorError::Exercise("Exercise id must not be empty".to_string()));
            }
            if !seen.insert(entry.id.clone()) {
                return Err(TutorError::Exercise(format!(
                    "Duplicate exercise id '{}'",
                    entry.id
                )));
            }
            exercises.push(entry.into_exercise()?);
        }
        Ok(Self::new(exercises))
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Arc<Exercise>> {
        self.exercises.get(index).cloned()
    }

    pub fn find(&self, id: &str) -> Option<Arc<Exercise>> {
        self.position(id).and_then(|i| self.get(i))
    }

    /// The exercise following `id`, if any.
    pub fn next_after(&self, id: &str) -> Option<Arc<Exercise>> {
        self.position(id).and_then(|i| self.get(i + 1))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.iter().map(|e| e.id.as_str())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.exercises.iter().position(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[exercise]]
id = "home-left"
title = "Mission 1"
text = "asdf"

[exercise.instructions.mission_summary]
en = "Left hand done"
sv-SE = "Vänster hand klar"

[[exercise]]
id = "home-right"
units = ["j", "k", "l", "ö"]
"#;

    #[test]
    fn test_parse_sample() {
        let catalog = ExerciseCatalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(0).unwrap();
        assert_eq!(first.id, "home-left");
        assert_eq!(first.title, "Mission 1");
        assert_eq!(first.len(), 4);
        assert_eq!(first.instructions.summary_for("sv-SE"), Some("Vänster hand klar"));

        let second = catalog.find("home-right").unwrap();
        assert_eq!(second.unit(3), Some(&Unit::new("ö")));
        assert!(second.title.is_empty());
    }

    #[test]
    fn test_next_after() {
        let catalog = ExerciseCatalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.next_after("home-left").unwrap().id, "home-right");
        assert!(catalog.next_after("home-right").is_none());
        assert!(catalog.next_after("missing").is_none());
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["home-left", "home-right"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = "[[exercise]]\nid = \"a\"\ntext = \"a\"\n[[exercise]]\nid = \"a\"\ntext = \"b\"\n";
        let err = ExerciseCatalog::parse(content).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_empty_exercise_rejected() {
        let err = ExerciseCatalog::parse("[[exercise]]\nid = \"a\"\ntext = \"\"\n").unwrap_err();
        assert!(matches!(err, TutorError::Exercise(_)));
    }

    #[test]
    fn test_units_and_text_conflict() {
        let content = "[[exercise]]\nid = \"a\"\ntext = \"ab\"\nunits = [\"a\"]\n";
        assert!(ExerciseCatalog::parse(content).is_err());
    }

    #[test]
    fn test_empty_unit_rejected() {
        let content = "[[exercise]]\nid = \"a\"\nunits = [\"a\", \"\"]\n";
        assert!(ExerciseCatalog::parse(content).is_err());
    }

    #[test]
    fn test_empty_file_is_empty_catalog() {
        let catalog = ExerciseCatalog::parse("").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.get(0).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let catalog = ExerciseCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExerciseCatalog::load(Path::new("/nonexistent/exercises.toml"));
        assert!(matches!(result, Err(TutorError::Io(_))));
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = ExerciseCatalog::parse(include_str!("../../../exercises.toml")).unwrap();
        assert!(!catalog.is_empty());
        let words = catalog.find("first-words").unwrap();
        assert_eq!(words.unit(words.len() - 1), Some(&Unit::new("Enter")));
    }
}
