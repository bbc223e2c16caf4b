//! Keytutor audio crate - speech synthesis, playback and the shared output.
//!
//! Provides trait-based abstractions over an external text-to-speech engine
//! and an external audio player, the last-writer-wins [`AudioOutput`] that
//! all feedback is written to, command-line backed implementations, and mock
//! implementations for testing without audio hardware.

use std::fmt;
use std::future::Future;

use keytutor_core::error::TutorError;
use keytutor_core::types::VoiceOptions;

pub mod chime;
pub mod command;
pub mod mock;
pub mod output;

pub use chime::{Chime, ChimeSet};
pub use command::{CommandPlayer, CommandSynthesizer};
pub use output::{AudioOutput, PlaybackStatus};

// =============================================================================
// Errors
// =============================================================================

/// Failures reported by the synthesizer or the player. Neither is fatal: the
/// orchestrator logs them and stops the affected sequence.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("Playback failed: {0}")]
    Playback(String),
}

impl From<AudioError> for TutorError {
    fn from(err: AudioError) -> Self {
        TutorError::Audio(err.to_string())
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Something the player can load: a file path or URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AudioResource(String);

impl AudioResource {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names the audio output a player writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputHandle(String);

impl OutputHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for OutputHandle {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Text-to-speech engine.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into a playable resource.
    ///
    /// Returns `Ok(None)` when no audio is available for the text or voice
    /// (unsupported language, empty text). `Err` is reserved for I/O-level
    /// failures.
    fn synthesize(
        &self,
        text: &str,
        options: &VoiceOptions,
    ) -> impl Future<Output = Result<Option<AudioResource>, AudioError>> + Send;
}

/// Audio player.
///
/// Playback must stop when the returned future is dropped; that is how the
/// shared output silences a superseded clip.
pub trait AudioPlayer: Send + Sync {
    /// Load and play `resource` on `output`, resolving once playback ends.
    fn play(
        &self,
        output: &OutputHandle,
        resource: &AudioResource,
    ) -> impl Future<Output = Result<(), AudioError>> + Send;
}
