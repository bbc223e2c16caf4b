use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TutorError};
use crate::types::{GameCharacter, VoiceOptions};

/// Top-level configuration for the typing tutor.
///
/// Loaded from `~/.keytutor/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl TutorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TutorConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing or
    /// cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TutorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory for progress, logs and the speech cache.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.keytutor/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Voice used for spoken prompts and hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Language tag passed to the synthesizer.
    pub language: String,
    /// Speaking rate multiplier. Prompts are single letters, so they are
    /// spoken fast by default.
    pub rate: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            rate: 2.0,
        }
    }
}

impl VoiceConfig {
    pub fn to_options(&self) -> VoiceOptions {
        VoiceOptions {
            language: (!self.language.is_empty()).then(|| self.language.clone()),
            rate: Some(self.rate),
        }
    }
}

/// Chime assets and the shared output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Directory holding the chime files.
    pub asset_dir: String,
    pub correct_chime: String,
    pub wrong_chime: String,
    pub complete_chime: String,
    /// Name of the audio output all feedback is written to.
    pub output: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            asset_dir: "assets/sounds".to_string(),
            correct_chime: "correct.mp3".to_string(),
            wrong_chime: "wrong.mp3".to_string(),
            complete_chime: "done.mp3".to_string(),
            output: "default".to_string(),
        }
    }
}

/// External text-to-speech program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Program invoked as `<program> -v <lang> -s <wpm> -w <out.wav> <text>`.
    pub program: String,
    /// Directory where synthesized clips are cached.
    pub cache_dir: String,
    /// Words per minute at rate 1.0.
    pub base_words_per_minute: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            cache_dir: "~/.keytutor/cache/speech".to_string(),
            base_words_per_minute: 175,
        }
    }
}

/// External audio player program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Program invoked as `<program> <args..> <resource>`.
    pub program: String,
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: "ffplay".to_string(),
            args: vec![
                "-nodisp".to_string(),
                "-autoexit".to_string(),
                "-loglevel".to_string(),
                "quiet".to_string(),
            ],
        }
    }
}

/// Session content and completion behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// TOML file with the exercise catalog.
    pub exercises_path: String,
    /// Spoken after the completion chime.
    pub completion_text: String,
    /// Character shown alongside the exercise.
    pub character: GameCharacter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercises_path: "exercises.toml".to_string(),
            completion_text: "Well done! You completed the mission.".to_string(),
            character: GameCharacter {
                name: "Robo".to_string(),
                image: "assets/characters/robo.png".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = TutorConfig::default();
        assert_eq!(config.general.data_dir, "~/.keytutor/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.voice.language, "en");
        assert_eq!(config.voice.rate, 2.0);
        assert_eq!(config.audio.correct_chime, "correct.mp3");
        assert_eq!(config.audio.wrong_chime, "wrong.mp3");
        assert_eq!(config.audio.complete_chime, "done.mp3");
        assert_eq!(config.synthesizer.program, "espeak-ng");
        assert_eq!(config.player.program, "ffplay");
        assert_eq!(config.session.exercises_path, "exercises.toml");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[voice]
language = "sv-SE"
rate = 1.5

[player]
program = "aplay"
args = ["-q"]

[session]
completion_text = "Bra jobbat!"

[session.character]
name = "Katt"
image = "katt.png"
"#;
        let file = create_temp_config(content);
        let config = TutorConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.voice.language, "sv-SE");
        assert_eq!(config.voice.rate, 1.5);
        assert_eq!(config.player.program, "aplay");
        assert_eq!(config.player.args, vec!["-q".to_string()]);
        assert_eq!(config.session.completion_text, "Bra jobbat!");
        assert_eq!(config.session.character.name, "Katt");
        // Untouched sections keep their defaults.
        assert_eq!(config.audio.asset_dir, "assets/sounds");
        assert_eq!(config.synthesizer.base_words_per_minute, 175);
    }

    #[test]
    fn test_load_partial_section_uses_defaults() {
        let file = create_temp_config("[voice]\nlanguage = \"de\"\n");
        let config = TutorConfig::load(file.path()).unwrap();
        assert_eq!(config.voice.language, "de");
        assert_eq!(config.voice.rate, 2.0);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[voice\nrate = ");
        let result = TutorConfig::load(file.path());
        assert!(matches!(result, Err(TutorError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = TutorConfig::load_or_default(Path::new("/nonexistent/keytutor.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TutorConfig::default();
        config.voice.language = "sv-SE".to_string();
        config.audio.output = "headphones".to_string();
        config.save(&path).unwrap();

        let reloaded = TutorConfig::load(&path).unwrap();
        assert_eq!(reloaded.voice.language, "sv-SE");
        assert_eq!(reloaded.audio.output, "headphones");
    }

    #[test]
    fn test_voice_options_from_config() {
        let voice = VoiceConfig::default();
        let options = voice.to_options();
        assert_eq!(options.language.as_deref(), Some("en"));
        assert_eq!(options.rate, Some(2.0));

        let blank = VoiceConfig {
            language: String::new(),
            rate: 1.0,
        };
        assert_eq!(blank.to_options().language, None);
    }
}
