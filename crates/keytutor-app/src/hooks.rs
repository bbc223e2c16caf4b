//! Application side of the session hooks: catalog position, character and
//! progress persistence.

use std::sync::{Arc, Mutex};

use keytutor_core::types::{Exercise, GameCharacter};
use keytutor_exercise::ExerciseCatalog;
use keytutor_session::{Progress, ProgressStore, SessionHooks, SessionSummary};

pub struct AppHooks {
    catalog: ExerciseCatalog,
    current: Mutex<Arc<Exercise>>,
    character: GameCharacter,
    progress: ProgressStore,
    /// Stored progress plus everything completed since startup.
    history: Mutex<Progress>,
}

impl AppHooks {
    pub fn new(
        catalog: ExerciseCatalog,
        first: Arc<Exercise>,
        character: GameCharacter,
        progress: ProgressStore,
    ) -> Self {
        let history = progress.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable progress");
            Progress::default()
        });
        Self {
            catalog,
            current: Mutex::new(first),
            character,
            progress,
            history: Mutex::new(history),
        }
    }

    fn current(&self) -> Arc<Exercise> {
        Arc::clone(&self.current.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// The exercise after the current one, without moving to it.
    pub fn peek_next(&self) -> Option<Arc<Exercise>> {
        self.catalog.next_after(&self.current().id)
    }

    pub fn is_completed(&self, exercise_id: &str) -> bool {
        self.history().is_completed(exercise_id)
    }

    /// Accuracy of the best completion of `exercise_id` so far.
    pub fn best_accuracy(&self, exercise_id: &str) -> Option<f64> {
        self.history().best(exercise_id).map(SessionSummary::accuracy)
    }

    fn history(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to the next exercise in the catalog.
    pub fn advance(&self) -> Option<Arc<Exercise>> {
        let next = self.peek_next()?;
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Arc::clone(&next);
        tracing::info!(exercise = %next.id, "Next task");
        Some(next)
    }
}

impl SessionHooks for AppHooks {
    fn current_exercise(&self) -> Arc<Exercise> {
        self.current()
    }

    fn current_game_character(&self) -> GameCharacter {
        self.character.clone()
    }

    fn on_session_complete(&self, exercise: &Exercise, summary: &SessionSummary) {
        self.history().sessions.push(summary.clone());
        if let Err(e) = self.progress.record(summary) {
            tracing::warn!(
                exercise = %exercise.id,
                path = %self.progress.path().display(),
                error = %e,
                "Failed to record progress"
            );
        }
    }

    fn on_reset(&self) {
        tracing::debug!(exercise = %self.current().id, "Session reset requested");
    }
}
