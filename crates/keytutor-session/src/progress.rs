//! Completed-session bookkeeping, stored as JSON in the data directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keytutor_core::error::{Result, TutorError};

/// Record of one completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub exercise_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Keystrokes that produced an outcome, modifiers excluded.
    pub keystrokes: u32,
    pub wrong_attempts: u32,
}

impl SessionSummary {
    /// Share of keystrokes that were correct, in `0.0..=1.0`.
    pub fn accuracy(&self) -> f64 {
        if self.keystrokes == 0 {
            return 1.0;
        }
        let correct = self.keystrokes.saturating_sub(self.wrong_attempts);
        f64::from(correct) / f64::from(self.keystrokes)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub sessions: Vec<SessionSummary>,
}

impl Progress {
    pub fn is_completed(&self, exercise_id: &str) -> bool {
        self.sessions.iter().any(|s| s.exercise_id == exercise_id)
    }

    /// Most accurate completion of `exercise_id`.
    pub fn best(&self, exercise_id: &str) -> Option<&SessionSummary> {
        self.sessions
            .iter()
            .filter(|s| s.exercise_id == exercise_id)
            .max_by(|a, b| a.accuracy().total_cmp(&b.accuracy()))
    }
}

/// JSON file holding [`Progress`].
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub const FILE_NAME: &'static str = "progress.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default file name inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored progress; a missing file is empty progress.
    pub fn load(&self) -> Result<Progress> {
        if !self.path.exists() {
            return Ok(Progress::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            TutorError::Progress(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Append `summary` and write the file back.
    pub fn record(&self, summary: &SessionSummary) -> Result<()> {
        let mut progress = self.load()?;
        progress.sessions.push(summary.clone());
        self.save(&progress)?;
        tracing::info!(
            exercise = %summary.exercise_id,
            session_id = %summary.session_id,
            accuracy = summary.accuracy(),
            "Session recorded"
        );
        Ok(())
    }

    pub fn save(&self, progress: &Progress) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(progress)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
