//! Keystroke capture using crossterm.
//!
//! A dedicated thread polls the terminal and forwards events over a tokio
//! channel, so the session loop never blocks on terminal reads.

use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tokio::sync::mpsc::UnboundedSender;

use keytutor_exercise::{Keystroke, Modifier};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What the terminal asked the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(Keystroke),
    /// Ctrl+R: start the exercise over.
    Reset,
    /// Ctrl+C or Esc.
    Quit,
}

/// Translate a crossterm key event. `None` for events the app ignores.
pub fn translate(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    let keystroke = match key.code {
        KeyCode::Esc => return Some(InputEvent::Quit),
        KeyCode::Char('c') | KeyCode::Char('C') if control => return Some(InputEvent::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') if control => return Some(InputEvent::Reset),
        // Other control chords are shortcuts, not typing.
        KeyCode::Char(_) if control || key.modifiers.contains(KeyModifiers::ALT) => return None,
        KeyCode::Char(c) => Keystroke::Char(c),
        KeyCode::Modifier(code) => Keystroke::Modifier(modifier_for(code)?),
        KeyCode::Enter => Keystroke::from_key_name("Enter"),
        KeyCode::Backspace => Keystroke::from_key_name("Backspace"),
        KeyCode::Tab => Keystroke::from_key_name("Tab"),
        KeyCode::Delete => Keystroke::from_key_name("Delete"),
        KeyCode::Left => Keystroke::from_key_name("ArrowLeft"),
        KeyCode::Right => Keystroke::from_key_name("ArrowRight"),
        KeyCode::Up => Keystroke::from_key_name("ArrowUp"),
        KeyCode::Down => Keystroke::from_key_name("ArrowDown"),
        _ => return None,
    };
    Some(InputEvent::Key(keystroke))
}

fn modifier_for(code: ModifierKeyCode) -> Option<Modifier> {
    match code {
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some(Modifier::Shift),
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some(Modifier::Control),
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt | ModifierKeyCode::IsoLevel3Shift => {
            Some(Modifier::Alt)
        }
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta
        | ModifierKeyCode::LeftHyper
        | ModifierKeyCode::RightHyper => Some(Modifier::Meta),
        _ => None,
    }
}

/// Spawn the reader thread. It exits after sending `Quit`, or once the
/// receiving side is gone.
pub fn spawn_key_reader(tx: UnboundedSender<InputEvent>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("keytutor-input".to_string())
        .spawn(move || {
            while !tx.is_closed() {
                let event = match read_event() {
                    Ok(Some(event)) => event,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::error!(error = %e, "Terminal input failed");
                        InputEvent::Quit
                    }
                };
                let quit = event == InputEvent::Quit;
                if tx.send(event).is_err() || quit {
                    break;
                }
            }
            tracing::debug!("Key reader stopped");
        })
}

fn read_event() -> std::io::Result<Option<InputEvent>> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(None);
    }
    match event::read()? {
        event::Event::Key(key) => Ok(translate(&key)),
        _ => Ok(None),
    }
}
