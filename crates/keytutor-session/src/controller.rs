//! One exercise attempt, from the first prompt to completion.
//!
//! The controller is the single owner of the session state. Every keystroke
//! is applied synchronously; its audio is spawned onto a `JoinSet` and may
//! still be running when the next keystroke arrives. Moving the cursor
//! advances the playback clock, which is what makes the older audio stale.
//! Every dispatch also takes a new sequence generation, so a sequence still
//! running when the next one is dispatched stops at its next step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use uuid::Uuid;

use keytutor_audio::{AudioPlayer, SpeechSynthesizer};
use keytutor_core::types::{Exercise, GameCharacter, Unit};
use keytutor_exercise::{submit_input, ExerciseState, Keystroke, Outcome};

use crate::feedback::{completion_steps, plan_for, FeedbackPlan, FeedbackRequest};
use crate::orchestrator::{FeedbackOrchestrator, SequenceReport};
use crate::progress::SessionSummary;
use crate::token::PlaybackToken;

/// Calls into the application around the session.
pub trait SessionHooks: Send + Sync {
    /// Exercise a new controller starts on.
    fn current_exercise(&self) -> Arc<Exercise>;

    fn current_game_character(&self) -> GameCharacter;

    /// Called once when the exercise is completed.
    fn on_session_complete(&self, exercise: &Exercise, summary: &SessionSummary);

    /// Called once per reset, after in-flight audio has been cancelled.
    fn on_reset(&self);
}

/// What a keystroke did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResponse {
    /// `None` for modifier-only keys.
    pub outcome: Option<Outcome>,
    /// True for the one keystroke that finished the session.
    pub finished: bool,
}

pub struct SessionController<S, P> {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    exercise: Arc<Exercise>,
    state: ExerciseState,
    keystrokes: u32,
    wrong_attempts: u32,
    completed: Option<SessionSummary>,
    completion_text: String,
    orchestrator: FeedbackOrchestrator<S, P>,
    hooks: Arc<dyn SessionHooks>,
    sequences: JoinSet<SequenceReport>,
}

impl<S, P> SessionController<S, P>
where
    S: SpeechSynthesizer + 'static,
    P: AudioPlayer + 'static,
{
    pub fn new(
        orchestrator: FeedbackOrchestrator<S, P>,
        hooks: Arc<dyn SessionHooks>,
        completion_text: impl Into<String>,
    ) -> Self {
        let exercise = hooks.current_exercise();
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            exercise,
            state: ExerciseState::reset(),
            keystrokes: 0,
            wrong_attempts: 0,
            completed: None,
            completion_text: completion_text.into(),
            orchestrator,
            hooks,
            sequences: JoinSet::new(),
        }
    }

    /// Speak the first unit.
    pub fn start(&mut self) {
        tracing::info!(
            session_id = %self.session_id,
            exercise = %self.exercise.id,
            units = self.exercise.len(),
            "Session started"
        );
        let token = self.orchestrator.clock().advance();
        self.prompt_current(token);
    }

    /// Apply one keystroke and dispatch its feedback.
    pub fn handle_key(&mut self, key: &Keystroke) -> KeyResponse {
        self.reap();

        let transition = submit_input(self.state, &self.exercise, key);
        self.state = transition.state;

        let Some(outcome) = transition.outcome else {
            return KeyResponse {
                outcome: None,
                finished: false,
            };
        };
        tracing::debug!(key = %key, outcome = %outcome, state = %self.state, "Keystroke applied");

        if outcome != Outcome::Ignored {
            self.keystrokes += 1;
        }
        let token = if outcome.moves_cursor() {
            self.orchestrator.clock().advance()
        } else {
            self.orchestrator.clock().issue()
        };

        let finished = match outcome {
            Outcome::ExerciseCompleted { .. } => self.complete(token),
            Outcome::WrongAttempt { .. } => {
                self.wrong_attempts += 1;
                self.dispatch(token, plan_for(&outcome, &self.exercise));
                false
            }
            Outcome::CorrectAdvance { .. } => {
                self.dispatch(token, plan_for(&outcome, &self.exercise));
                false
            }
            Outcome::Ignored => false,
        };

        KeyResponse {
            outcome: Some(outcome),
            finished,
        }
    }

    /// Start the same exercise over, discarding in-flight audio.
    pub fn reset(&mut self) {
        let token = self.silence();

        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.state = ExerciseState::reset();
        self.keystrokes = 0;
        self.wrong_attempts = 0;
        self.completed = None;
        self.hooks.on_reset();

        tracing::info!(session_id = %self.session_id, exercise = %self.exercise.id, "Session reset");
        self.prompt_current(token);
    }

    /// Stop all audio: pending steps go stale and the output is cut.
    pub fn silence(&mut self) -> PlaybackToken {
        let token = self.orchestrator.clock().advance();
        self.orchestrator.output().silence();
        token
    }

    /// Switch to `exercise` and start over on it.
    pub fn load(&mut self, exercise: Arc<Exercise>) {
        tracing::info!(from = %self.exercise.id, to = %exercise.id, "Loading exercise");
        self.exercise = exercise;
        self.reset();
    }

    /// Wait for every in-flight audio sequence to end.
    pub async fn settle(&mut self) -> Vec<SequenceReport> {
        let mut reports = Vec::new();
        while let Some(joined) = self.sequences.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(error = %e, "Feedback task failed"),
            }
        }
        reports
    }

    pub fn state(&self) -> ExerciseState {
        self.state
    }

    pub fn exercise(&self) -> &Arc<Exercise> {
        &self.exercise
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_finished(&self) -> bool {
        self.completed.is_some()
    }

    /// Summary of the completed session, once there is one.
    pub fn completed_summary(&self) -> Option<&SessionSummary> {
        self.completed.as_ref()
    }

    pub fn current_unit(&self) -> Option<&Unit> {
        self.state.current_unit(&self.exercise)
    }

    /// Up to `count` units after the current one.
    pub fn upcoming(&self, count: usize) -> &[Unit] {
        self.state.upcoming(&self.exercise, count)
    }

    pub fn game_character(&self) -> GameCharacter {
        self.hooks.current_game_character()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id,
            exercise_id: self.exercise.id.clone(),
            started_at: self.started_at,
            completed_at: Utc::now(),
            keystrokes: self.keystrokes,
            wrong_attempts: self.wrong_attempts,
        }
    }

    fn complete(&mut self, token: PlaybackToken) -> bool {
        if self.completed.is_some() {
            return false;
        }

        let summary = self.summary();
        tracing::info!(
            session_id = %self.session_id,
            exercise = %self.exercise.id,
            keystrokes = summary.keystrokes,
            wrong_attempts = summary.wrong_attempts,
            "Session completed"
        );
        self.hooks.on_session_complete(&self.exercise, &summary);
        self.completed = Some(summary);
        self.dispatch(token, completion_steps(&self.completion_text));
        true
    }

    fn prompt_current(&mut self, token: PlaybackToken) {
        let index = self.state.current_index();
        if let Some(prompt) = FeedbackRequest::prompt_current(&self.exercise, index) {
            self.dispatch(token, vec![prompt]);
        }
    }

    fn dispatch(&mut self, token: PlaybackToken, steps: Vec<FeedbackRequest>) {
        if steps.is_empty() {
            return;
        }
        let orchestrator = self.orchestrator.clone();
        let sequence = orchestrator.sequences().advance();
        let plan = FeedbackPlan::new(token, steps).in_sequence(sequence);
        self.sequences.spawn(async move { orchestrator.run(plan).await });
    }

    fn reap(&mut self) {
        while let Some(joined) = self.sequences.try_join_next() {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Feedback task failed");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
