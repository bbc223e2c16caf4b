//! Fixed audio cues.

use std::fmt;
use std::path::Path;

use keytutor_core::config::AudioConfig;

use crate::AudioResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chime {
    Correct,
    Wrong,
    Complete,
}

impl fmt::Display for Chime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chime::Correct => write!(f, "correct"),
            Chime::Wrong => write!(f, "wrong"),
            Chime::Complete => write!(f, "complete"),
        }
    }
}

/// Resolved chime resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChimeSet {
    pub correct: AudioResource,
    pub wrong: AudioResource,
    pub complete: AudioResource,
}

impl ChimeSet {
    /// Resolve the chime file names against the configured asset directory.
    pub fn from_config(config: &AudioConfig) -> Self {
        let dir = Path::new(&config.asset_dir);
        let resolve = |name: &str| AudioResource::new(dir.join(name).to_string_lossy());
        Self {
            correct: resolve(&config.correct_chime),
            wrong: resolve(&config.wrong_chime),
            complete: resolve(&config.complete_chime),
        }
    }

    pub fn resource(&self, chime: Chime) -> &AudioResource {
        match chime {
            Chime::Correct => &self.correct,
            Chime::Wrong => &self.wrong,
            Chime::Complete => &self.complete,
        }
    }
}
