//! Runs feedback plans against the synthesizer and the shared output.
//!
//! Steps of one plan are strictly sequential: synthesize, play, wait for the
//! end of playback, then move on. Before each step, and again between
//! synthesis and playback, the plan's token is checked against the clock; a
//! stale plan stops without touching the output. A plan dispatched in
//! sequence also stops at those checks once a newer sequence exists, so an
//! older keystroke's later steps never cut off a newer keystroke's audio.
//! Failures are logged and end the plan but never propagate.

use std::fmt;
use std::sync::Arc;

use keytutor_audio::{
    AudioOutput, AudioPlayer, AudioResource, ChimeSet, PlaybackStatus, SpeechSynthesizer,
};
use keytutor_core::types::VoiceOptions;

use crate::feedback::{FeedbackPlan, FeedbackRequest, Sound};
use crate::token::{PlaybackClock, PlaybackToken};

/// How a plan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEnd {
    /// Every step played or was skipped for lack of audio.
    Finished,
    /// The session moved on before `step` could play.
    Stale { step: FeedbackRequest },
    /// A newer sequence or playback took over before `step` finished.
    Superseded { step: FeedbackRequest },
    Failed { step: FeedbackRequest, error: String },
}

impl fmt::Display for SequenceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceEnd::Finished => write!(f, "finished"),
            SequenceEnd::Stale { step } => write!(f, "stale at {}", step),
            SequenceEnd::Superseded { step } => write!(f, "superseded at {}", step),
            SequenceEnd::Failed { step, error } => write!(f, "failed at {}: {}", step, error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub token: PlaybackToken,
    /// Steps that played to the end, in order.
    pub played: Vec<FeedbackRequest>,
    /// Speech steps the synthesizer had no audio for.
    pub skipped: Vec<FeedbackRequest>,
    pub end: SequenceEnd,
}

impl SequenceReport {
    pub fn is_finished(&self) -> bool {
        self.end == SequenceEnd::Finished
    }
}

enum StepResult {
    Played,
    Skipped,
    Ended(SequenceEnd),
}

/// Sequences synthesizer and player calls for feedback plans.
pub struct FeedbackOrchestrator<S, P> {
    synthesizer: Arc<S>,
    output: Arc<AudioOutput<P>>,
    clock: Arc<PlaybackClock>,
    sequences: Arc<PlaybackClock>,
    chimes: Arc<ChimeSet>,
    voice: VoiceOptions,
}

impl<S, P> Clone for FeedbackOrchestrator<S, P> {
    fn clone(&self) -> Self {
        Self {
            synthesizer: Arc::clone(&self.synthesizer),
            output: Arc::clone(&self.output),
            clock: Arc::clone(&self.clock),
            sequences: Arc::clone(&self.sequences),
            chimes: Arc::clone(&self.chimes),
            voice: self.voice.clone(),
        }
    }
}

impl<S: SpeechSynthesizer, P: AudioPlayer> FeedbackOrchestrator<S, P> {
    pub fn new(
        synthesizer: Arc<S>,
        output: Arc<AudioOutput<P>>,
        chimes: ChimeSet,
        voice: VoiceOptions,
    ) -> Self {
        Self {
            synthesizer,
            output,
            clock: Arc::new(PlaybackClock::new()),
            sequences: Arc::new(PlaybackClock::new()),
            chimes: Arc::new(chimes),
            voice,
        }
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Generation of the most recently dispatched sequence.
    pub fn sequences(&self) -> &PlaybackClock {
        &self.sequences
    }

    pub fn output(&self) -> &AudioOutput<P> {
        &self.output
    }

    pub fn voice(&self) -> &VoiceOptions {
        &self.voice
    }

    /// Run `plan` to its end.
    pub async fn run(&self, plan: FeedbackPlan) -> SequenceReport {
        let FeedbackPlan {
            token,
            sequence,
            steps,
        } = plan;
        let mut played = Vec::new();
        let mut skipped = Vec::new();
        let mut end = SequenceEnd::Finished;

        for step in steps {
            match self.run_step(token, sequence, &step).await {
                StepResult::Played => played.push(step),
                StepResult::Skipped => skipped.push(step),
                StepResult::Ended(reason) => {
                    end = reason;
                    break;
                }
            }
        }

        let report = SequenceReport {
            token,
            played,
            skipped,
            end,
        };
        tracing::debug!(
            token = %report.token,
            played = report.played.len(),
            skipped = report.skipped.len(),
            end = %report.end,
            "Feedback sequence ended"
        );
        report
    }

    async fn run_step(
        &self,
        token: PlaybackToken,
        sequence: Option<PlaybackToken>,
        step: &FeedbackRequest,
    ) -> StepResult {
        if let Some(stale) = self.stale(token, sequence, step) {
            return stale;
        }

        let resource = match step.sound() {
            Sound::Chime(chime) => self.chimes.resource(chime).clone(),
            Sound::Speech(text) => match self.synthesizer.synthesize(text, &self.voice).await {
                Ok(Some(resource)) => resource,
                Ok(None) => {
                    tracing::debug!(step = %step, "No speech audio, skipping step");
                    return StepResult::Skipped;
                }
                Err(e) => return Self::failed(step, e.to_string()),
            },
        };

        if let Some(stale) = self.stale(token, sequence, step) {
            return stale;
        }
        self.play(step, &resource).await
    }

    async fn play(&self, step: &FeedbackRequest, resource: &AudioResource) -> StepResult {
        match self.output.play(resource).await {
            Ok(PlaybackStatus::Finished) => StepResult::Played,
            Ok(PlaybackStatus::Superseded) => {
                tracing::debug!(step = %step, "Step superseded on output");
                StepResult::Ended(SequenceEnd::Superseded { step: step.clone() })
            }
            Err(e) => Self::failed(step, e.to_string()),
        }
    }

    fn stale(
        &self,
        token: PlaybackToken,
        sequence: Option<PlaybackToken>,
        step: &FeedbackRequest,
    ) -> Option<StepResult> {
        if !self.clock.is_current(token) {
            tracing::debug!(token = %token, current = %self.clock.issue(), step = %step, "Dropping stale step");
            return Some(StepResult::Ended(SequenceEnd::Stale { step: step.clone() }));
        }
        match sequence {
            Some(sequence) if !self.sequences.is_current(sequence) => {
                tracing::debug!(
                    sequence = %sequence,
                    latest = %self.sequences.issue(),
                    step = %step,
                    "Newer sequence dispatched, dropping step"
                );
                Some(StepResult::Ended(SequenceEnd::Superseded { step: step.clone() }))
            }
            _ => None,
        }
    }

    fn failed(step: &FeedbackRequest, error: String) -> StepResult {
        tracing::warn!(step = %step, error = %error, "Audio feedback failed");
        StepResult::Ended(SequenceEnd::Failed {
            step: step.clone(),
            error,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
