//! Feedback requests: the audio each outcome calls for.
//!
//! Planning is pure. [`plan_for`] maps an [`Outcome`] to an ordered list of
//! requests; the orchestrator decides whether each one still gets to play.

use std::fmt;

use keytutor_audio::Chime;
use keytutor_core::types::Exercise;
use keytutor_exercise::{placement_hint, Outcome};

use crate::token::PlaybackToken;

/// One step of an audio sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackRequest {
    /// Speak the unit at the cursor when a session starts or resets.
    PromptCurrent { index: usize, text: String },
    /// Speak the unit the cursor just advanced to.
    PromptNext { index: usize, text: String },
    ChimeCorrect,
    ChimeWrong,
    /// Spoken finger-placement hint for the unit that was mistyped.
    HintWrongFinger { index: usize, hint: String },
    /// Session-complete chime.
    CompletionCue,
    /// Spoken message after the completion chime.
    CompletionSpeech { text: String },
}

/// What a request resolves to before it reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound<'a> {
    Chime(Chime),
    Speech(&'a str),
}

impl FeedbackRequest {
    pub fn sound(&self) -> Sound<'_> {
        match self {
            FeedbackRequest::PromptCurrent { text, .. }
            | FeedbackRequest::PromptNext { text, .. }
            | FeedbackRequest::CompletionSpeech { text } => Sound::Speech(text),
            FeedbackRequest::HintWrongFinger { hint, .. } => Sound::Speech(hint),
            FeedbackRequest::ChimeCorrect => Sound::Chime(Chime::Correct),
            FeedbackRequest::ChimeWrong => Sound::Chime(Chime::Wrong),
            FeedbackRequest::CompletionCue => Sound::Chime(Chime::Complete),
        }
    }

    pub fn prompt_current(exercise: &Exercise, index: usize) -> Option<Self> {
        exercise.unit(index).map(|unit| FeedbackRequest::PromptCurrent {
            index,
            text: unit.text.clone(),
        })
    }
}

impl fmt::Display for FeedbackRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackRequest::PromptCurrent { index, .. } => write!(f, "PromptCurrent({})", index),
            FeedbackRequest::PromptNext { index, .. } => write!(f, "PromptNext({})", index),
            FeedbackRequest::ChimeCorrect => write!(f, "ChimeCorrect"),
            FeedbackRequest::ChimeWrong => write!(f, "ChimeWrong"),
            FeedbackRequest::HintWrongFinger { index, .. } => write!(f, "HintWrongFinger({})", index),
            FeedbackRequest::CompletionCue => write!(f, "CompletionCue"),
            FeedbackRequest::CompletionSpeech { .. } => write!(f, "CompletionSpeech"),
        }
    }
}

/// Ordered requests issued together under one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPlan {
    /// Cursor generation the plan was issued for.
    pub token: PlaybackToken,
    /// Position among dispatched sequences. A plan that has one gives way
    /// to every sequence dispatched after it.
    pub sequence: Option<PlaybackToken>,
    pub steps: Vec<FeedbackRequest>,
}

impl FeedbackPlan {
    pub fn new(token: PlaybackToken, steps: Vec<FeedbackRequest>) -> Self {
        Self {
            token,
            sequence: None,
            steps,
        }
    }

    pub fn in_sequence(mut self, sequence: PlaybackToken) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Per-keystroke feedback for `outcome`.
///
/// A correct advance does not issue a separate `PromptCurrent` for the new
/// cursor position: the `PromptNext` spoken after the chime is that prompt,
/// so the unit is spoken once. `PromptCurrent` is only issued when a session
/// starts, resets or loads. Completion and ignored keys get nothing here;
/// the controller plays the completion sequence itself.
pub fn plan_for(outcome: &Outcome, exercise: &Exercise) -> Vec<FeedbackRequest> {
    match *outcome {
        Outcome::CorrectAdvance { to, .. } => {
            let mut steps = vec![FeedbackRequest::ChimeCorrect];
            if let Some(unit) = exercise.unit(to) {
                steps.push(FeedbackRequest::PromptNext {
                    index: to,
                    text: unit.text.clone(),
                });
            }
            steps
        }
        Outcome::WrongAttempt { index } => {
            let mut steps = vec![FeedbackRequest::ChimeWrong];
            if let Some(unit) = exercise.unit(index) {
                steps.push(FeedbackRequest::HintWrongFinger {
                    index,
                    hint: placement_hint(unit),
                });
            }
            steps
        }
        Outcome::ExerciseCompleted { .. } | Outcome::Ignored => Vec::new(),
    }
}

/// Completion cue followed by the spoken completion message, if any.
pub fn completion_steps(message: &str) -> Vec<FeedbackRequest> {
    let mut steps = vec![FeedbackRequest::CompletionCue];
    if !message.trim().is_empty() {
        steps.push(FeedbackRequest::CompletionSpeech {
            text: message.to_string(),
        });
    }
    steps
}
