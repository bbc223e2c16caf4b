//! CLI argument definitions for the keytutor binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::{Path, PathBuf};

/// keytutor - a typing tutor that speaks every key.
#[derive(Parser, Debug)]
#[command(name = "keytutor", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Exercise catalog (TOML).
    #[arg(short = 'e', long = "exercises")]
    pub exercises: Option<PathBuf>,

    /// Exercise id to start with; defaults to the first in the catalog.
    #[arg(short = 'x', long = "exercise")]
    pub exercise: Option<String>,

    /// Voice language, e.g. "en" or "sv".
    #[arg(long = "language")]
    pub language: Option<String>,

    /// Data directory for progress, logs and the speech cache.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Priority: --config flag > KEYTUTOR_CONFIG env var > ~/.keytutor/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("KEYTUTOR_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --exercises flag > KEYTUTOR_EXERCISES env var > config file value.
    ///
    /// A relative config value is taken relative to the config file.
    pub fn resolve_exercises_path(&self, config_value: &str, config_path: &Path) -> PathBuf {
        if let Some(ref p) = self.exercises {
            return p.clone();
        }
        if let Ok(p) = std::env::var("KEYTUTOR_EXERCISES") {
            return PathBuf::from(p);
        }
        let path = expand_home(config_value);
        if path.is_relative() {
            if let Some(dir) = config_path.parent() {
                if dir.join(&path).exists() {
                    return dir.join(path);
                }
            }
        }
        path
    }

    /// Priority: --data-dir flag > config file value, with `~` expanded.
    pub fn resolve_data_dir(&self, config_value: &str) -> PathBuf {
        match self.data_dir {
            Some(ref p) => p.clone(),
            None => expand_home(config_value),
        }
    }

    /// Priority: --language flag > config file value.
    pub fn resolve_language(&self, config_value: &str) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| config_value.to_string())
    }

    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_value: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_value.to_string())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.ok().map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
        return PathBuf::from(".").join(rest);
    }
    PathBuf::from(path)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".keytutor").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
