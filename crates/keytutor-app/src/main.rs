//! keytutor - a typing tutor with spoken prompts and audio feedback.
//!
//! Loads the configuration and exercise catalog, wires the command-line
//! speech and playback backends into a session controller, and runs the
//! keystroke loop in the terminal.

mod cli;
mod display;
mod hooks;
mod input;

use std::fs::OpenOptions;
use std::io::{stdout, Stdout};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use keytutor_audio::{AudioOutput, ChimeSet, CommandPlayer, CommandSynthesizer, OutputHandle};
use keytutor_core::error::TutorError;
use keytutor_core::TutorConfig;
use keytutor_exercise::{ExerciseCatalog, Keystroke};
use keytutor_session::{FeedbackOrchestrator, ProgressStore, SessionController, SessionHooks};

use crate::cli::{expand_home, CliArgs};
use crate::display::{ExerciseView, SummaryView};
use crate::hooks::AppHooks;
use crate::input::InputEvent;

type Session = SessionController<CommandSynthesizer, CommandPlayer>;

/// Raw mode for the lifetime of the value.
struct RawTerminal;

impl RawTerminal {
    fn enable() -> Result<Self, TutorError> {
        crossterm::terminal::enable_raw_mode()
            .map_err(|e| TutorError::Terminal(format!("enable raw mode: {}", e)))?;
        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "Failed to restore terminal");
        }
    }
}

/// Log to a file in the data directory; the terminal belongs to the UI.
fn init_tracing(data_dir: &Path, level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let log_path = data_dir.join("keytutor.log");
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

fn draw(out: &mut Stdout, session: &Session, config: &TutorConfig, hooks: &AppHooks) -> std::io::Result<()> {
    let character = session.game_character();
    let exercise = session.exercise();

    if let Some(summary) = session.completed_summary() {
        let language = session_language(config);
        return display::draw_summary(
            out,
            &SummaryView {
                mission: exercise.instructions.summary_for(&language),
                completed_text: &config.session.completion_text,
                summary,
                best: hooks.best_accuracy(&exercise.id),
                character: &character,
                has_next: hooks.peek_next().is_some(),
            },
        );
    }

    let state = session.state();
    let title = if exercise.title.is_empty() {
        exercise.id.as_str()
    } else {
        exercise.title.as_str()
    };
    display::draw_exercise(
        out,
        &ExerciseView {
            title,
            current: session.current_unit(),
            upcoming: session.upcoming(2),
            wrong: state.is_wrong(),
            index: state.current_index(),
            length: exercise.len(),
            done_before: hooks.is_completed(&exercise.id),
            character: &character,
        },
    )
}

fn session_language(config: &TutorConfig) -> String {
    if config.voice.language.is_empty() {
        "en".to_string()
    } else {
        config.voice.language.clone()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_path = args.resolve_config_path();
    let mut config = TutorConfig::load_or_default(&config_path);
    config.voice.language = args.resolve_language(&config.voice.language);

    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    init_tracing(&data_dir, &args.resolve_log_level(&config.general.log_level))?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        data_dir = %data_dir.display(),
        "Starting keytutor"
    );

    // Exercises.
    let exercises_path = args.resolve_exercises_path(&config.session.exercises_path, &config_path);
    let catalog = ExerciseCatalog::load(&exercises_path)?;
    let first = match &args.exercise {
        Some(id) => catalog
            .find(id)
            .ok_or_else(|| TutorError::Exercise(format!("no exercise with id '{}'", id)))?,
        None => catalog.get(0).ok_or_else(|| {
            TutorError::Exercise(format!("{} has no exercises", exercises_path.display()))
        })?,
    };

    // Audio.
    let synthesizer = Arc::new(CommandSynthesizer::new(
        &config.synthesizer,
        expand_home(&config.synthesizer.cache_dir),
    ));
    let player = Arc::new(CommandPlayer::new(&config.player));
    let output = Arc::new(AudioOutput::new(player, OutputHandle::new(&config.audio.output)));
    let orchestrator = FeedbackOrchestrator::new(
        synthesizer,
        output,
        ChimeSet::from_config(&config.audio),
        config.voice.to_options(),
    );

    // Session.
    let hooks = Arc::new(AppHooks::new(
        catalog,
        first,
        config.session.character.clone(),
        ProgressStore::in_dir(&data_dir),
    ));
    let mut session: Session = SessionController::new(
        orchestrator,
        Arc::clone(&hooks) as Arc<dyn SessionHooks>,
        config.session.completion_text.clone(),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let terminal = RawTerminal::enable()?;
    let reader = input::spawn_key_reader(tx)?;
    let mut out = stdout();

    session.start();
    draw(&mut out, &session, &config, &hooks)?;

    while let Some(event) = rx.recv().await {
        match event {
            InputEvent::Quit => break,
            InputEvent::Reset => session.reset(),
            InputEvent::Key(key) if session.is_finished() => {
                if key != Keystroke::Named("Enter".to_string()) {
                    continue;
                }
                match hooks.advance() {
                    Some(next) => session.load(next),
                    None => continue,
                }
            }
            InputEvent::Key(key) => {
                session.handle_key(&key);
            }
        }
        draw(&mut out, &session, &config, &hooks)?;
    }

    session.silence();
    let reports = session.settle().await;
    drop(rx);
    if reader.join().is_err() {
        tracing::warn!("Key reader thread panicked");
    }
    drop(terminal);
    tracing::info!(pending_sequences = reports.len(), "keytutor stopped");
    println!();
    Ok(())
}
