//! Terminal rendering for the exercise and summary screens.
//!
//! The terminal is in raw mode while the app runs, so every line ends with
//! `\r\n`.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};

use keytutor_core::types::{GameCharacter, Unit};
use keytutor_session::SessionSummary;

/// Everything the exercise screen shows.
pub struct ExerciseView<'a> {
    pub title: &'a str,
    pub current: Option<&'a Unit>,
    pub upcoming: &'a [Unit],
    pub wrong: bool,
    pub index: usize,
    pub length: usize,
    /// Completed in an earlier session.
    pub done_before: bool,
    pub character: &'a GameCharacter,
}

pub struct SummaryView<'a> {
    pub mission: Option<&'a str>,
    pub completed_text: &'a str,
    pub summary: &'a SessionSummary,
    /// Best accuracy recorded for this exercise, this session included.
    pub best: Option<f64>,
    pub character: &'a GameCharacter,
    pub has_next: bool,
}

fn label(unit: &Unit) -> String {
    match unit.text.as_str() {
        " " => "space".to_string(),
        text => text.to_string(),
    }
}

fn clear(out: &mut impl Write) -> io::Result<()> {
    queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))
}

pub fn draw_exercise(out: &mut impl Write, view: &ExerciseView<'_>) -> io::Result<()> {
    clear(out)?;
    queue!(
        out,
        SetAttribute(Attribute::Bold),
        Print(view.title),
        SetAttribute(Attribute::Reset),
        Print(format!("  ({}/{})", view.index, view.length)),
    )?;
    if view.done_before {
        queue!(
            out,
            SetForegroundColor(Color::Green),
            Print("  done before"),
            ResetColor,
        )?;
    }
    queue!(out, Print("\r\n\r\n"))?;

    if let Some(unit) = view.current {
        let color = if view.wrong { Color::Red } else { Color::Cyan };
        queue!(
            out,
            Print("Type:  "),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(label(unit)),
            SetAttribute(Attribute::Reset),
            ResetColor,
        )?;
        if !view.upcoming.is_empty() {
            let next: Vec<String> = view.upcoming.iter().map(label).collect();
            queue!(
                out,
                SetForegroundColor(Color::DarkGrey),
                Print(format!("   then {}", next.join(" "))),
                ResetColor,
            )?;
        }
        queue!(out, Print("\r\n"))?;
    }

    if view.wrong {
        queue!(
            out,
            SetForegroundColor(Color::Red),
            Print("Not quite, listen for the hint.\r\n"),
            ResetColor,
        )?;
    }

    queue!(
        out,
        Print(format!(
            "\r\n{} is with you.   Ctrl+R restart, Esc quit\r\n",
            view.character.name
        )),
    )?;
    out.flush()
}

pub fn draw_summary(out: &mut impl Write, view: &SummaryView<'_>) -> io::Result<()> {
    clear(out)?;
    if let Some(mission) = view.mission {
        queue!(
            out,
            SetAttribute(Attribute::Bold),
            Print(mission),
            SetAttribute(Attribute::Reset),
            Print("\r\n\r\n"),
        )?;
    }
    let seconds = view.summary.duration().num_milliseconds() as f64 / 1000.0;
    queue!(
        out,
        SetForegroundColor(Color::Green),
        Print(view.completed_text),
        ResetColor,
        Print("\r\n\r\n"),
        Print(format!(
            "Accuracy {:.0}%  ({} keys, {} wrong, {:.1}s)\r\n",
            view.summary.accuracy() * 100.0,
            view.summary.keystrokes,
            view.summary.wrong_attempts,
            seconds
        )),
    )?;
    if let Some(best) = view.best {
        queue!(out, Print(format!("Best so far {:.0}%\r\n", best * 100.0)))?;
    }
    queue!(
        out,
        Print(format!(
            "{} ({})\r\n\r\n",
            view.character.name, view.character.image
        )),
    )?;
    let prompt = if view.has_next {
        "Enter next task, Ctrl+R again, Esc quit\r\n"
    } else {
        "That was the last task. Ctrl+R again, Esc quit\r\n"
    };
    queue!(out, Print(prompt))?;
    out.flush()
}
