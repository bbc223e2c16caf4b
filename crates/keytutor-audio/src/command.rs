//! Synthesizer and player backed by external programs.
//!
//! Child processes are spawned with `kill_on_drop`, so dropping a playback
//! future stops the sound.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use sha2::{Digest, Sha256};
use tokio::process::Command;

use keytutor_core::config::{PlayerConfig, SynthesizerConfig};
use keytutor_core::types::VoiceOptions;

use crate::{AudioError, AudioPlayer, AudioResource, OutputHandle, SpeechSynthesizer};

// =============================================================================
// Synthesizer
// =============================================================================

/// Runs an espeak-compatible program and caches the WAV files it writes.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    cache_dir: PathBuf,
    base_words_per_minute: u32,
}

impl CommandSynthesizer {
    pub fn new(config: &SynthesizerConfig, cache_dir: PathBuf) -> Self {
        Self {
            program: config.program.clone(),
            cache_dir,
            base_words_per_minute: config.base_words_per_minute,
        }
    }

    fn words_per_minute(&self, options: &VoiceOptions) -> u32 {
        let rate = options.rate.unwrap_or(1.0).clamp(0.25, 4.0);
        (self.base_words_per_minute as f32 * rate).round() as u32
    }

    /// Cache location for `text` spoken with `options`.
    ///
    /// The name is a truncated SHA-256 of the inputs, so it stays the same
    /// across builds and existing clips keep being reused.
    pub fn clip_path(&self, text: &str, options: &VoiceOptions) -> PathBuf {
        let mut hasher = Sha256::new();
        let language = options.language.as_deref().unwrap_or("");
        for part in [self.program.as_str(), text, language] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(self.words_per_minute(options).to_le_bytes());
        let digest = hasher.finalize();
        self.cache_dir.join(format!("{}.wav", hex::encode(&digest[..8])))
    }

    /// Render into a private temporary file, then move it into place.
    async fn render(&self, text: &str, options: &VoiceOptions, target: &Path) -> Result<bool, AudioError> {
        // Removed on drop, including when the synthesis future is dropped.
        let partial = tempfile::Builder::new()
            .prefix(".partial-")
            .suffix(".wav")
            .tempfile_in(&self.cache_dir)
            .map_err(|e| AudioError::Synthesis(format!("cache file: {}", e)))?
            .into_temp_path();

        let mut command = Command::new(&self.program);
        if let Some(language) = &options.language {
            command.arg("-v").arg(language);
        }
        command
            .arg("-s")
            .arg(self.words_per_minute(options).to_string())
            .arg("-w")
            .arg(partial.as_os_str())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command
            .output()
            .await
            .map_err(|e| AudioError::Synthesis(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            tracing::warn!(
                program = %self.program,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Synthesizer produced no audio"
            );
            return Ok(false);
        }

        match partial.persist(target) {
            Ok(()) => Ok(true),
            // Another render of the same clip got there first.
            Err(_) if target.exists() => {
                tracing::trace!(clip = %target.display(), "Speech clip rendered concurrently");
                Ok(true)
            }
            Err(e) => Err(AudioError::Synthesis(format!("cache write failed: {}", e.error))),
        }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        options: &VoiceOptions,
    ) -> Result<Option<AudioResource>, AudioError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let path = self.clip_path(text, options);
        let resource = AudioResource::new(path.to_string_lossy());
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::trace!(clip = %resource, "Speech cache hit");
            return Ok(Some(resource));
        }

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| AudioError::Synthesis(format!("cache dir: {}", e)))?;

        if self.render(text, options, &path).await? {
            tracing::debug!(clip = %resource, text_len = text.len(), "Speech synthesized");
            Ok(Some(resource))
        } else {
            Ok(None)
        }
    }
}

// =============================================================================
// Player
// =============================================================================

/// Plays resources through an external program, one process per clip.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl AudioPlayer for CommandPlayer {
    async fn play(&self, output: &OutputHandle, resource: &AudioResource) -> Result<(), AudioError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(resource.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| AudioError::Playback(format!("{}: {}", self.program, e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(AudioError::Playback(format!(
                "{} exited with {} playing {} on {}",
                self.program, status, resource, output
            )))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
