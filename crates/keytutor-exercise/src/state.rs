//! Exercise state machine.
//!
//! States and transitions:
//! - InProgress(i, _) + matching key, i not last -> InProgress(i + 1, false)
//! - InProgress(i, _) + matching key, i last     -> Completed
//! - InProgress(i, _) + other key                -> InProgress(i, true)
//! - InProgress(..)   + modifier                 -> unchanged, no outcome
//! - Completed        + any key                  -> Completed, Ignored
//!
//! `submit_input` is a pure function of the previous state, the exercise and
//! the keystroke.

use std::fmt;

use keytutor_core::types::{Exercise, Unit};

use crate::keystroke::Keystroke;

/// Progress through one exercise attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseState {
    /// Waiting for the unit at `index`. `wrong` is set after a mistyped key
    /// and cleared by the next correct one.
    InProgress { index: usize, wrong: bool },
    /// Every unit has been typed. `length` is the exercise length, which is
    /// also the final cursor position.
    Completed { length: usize },
}

impl Default for ExerciseState {
    fn default() -> Self {
        Self::reset()
    }
}

impl fmt::Display for ExerciseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseState::InProgress { index, wrong: false } => write!(f, "InProgress({})", index),
            ExerciseState::InProgress { index, wrong: true } => {
                write!(f, "InProgress({}, wrong)", index)
            }
            ExerciseState::Completed { length } => write!(f, "Completed({})", length),
        }
    }
}

impl ExerciseState {
    /// The initial state for any exercise. Calling it repeatedly always
    /// yields the same value.
    pub fn reset() -> Self {
        ExerciseState::InProgress {
            index: 0,
            wrong: false,
        }
    }

    pub fn current_index(&self) -> usize {
        match *self {
            ExerciseState::InProgress { index, .. } => index,
            ExerciseState::Completed { length } => length,
        }
    }

    pub fn is_wrong(&self) -> bool {
        matches!(self, ExerciseState::InProgress { wrong: true, .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ExerciseState::Completed { .. })
    }

    /// The unit the user is expected to type next.
    pub fn current_unit<'a>(&self, exercise: &'a Exercise) -> Option<&'a Unit> {
        match *self {
            ExerciseState::InProgress { index, .. } => exercise.unit(index),
            ExerciseState::Completed { .. } => None,
        }
    }

    /// Up to `count` units following the current one.
    pub fn upcoming<'a>(&self, exercise: &'a Exercise, count: usize) -> &'a [Unit] {
        let start = (self.current_index() + 1).min(exercise.len());
        let end = start.saturating_add(count).min(exercise.len());
        &exercise.units[start..end]
    }
}

/// What a keystroke did to the exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The expected unit was typed; the cursor moved from `from` to `to`.
    CorrectAdvance { from: usize, to: usize },
    /// A different key was typed while `index` was expected.
    WrongAttempt { index: usize },
    /// The last unit (at `last_index`) was typed.
    ExerciseCompleted { last_index: usize },
    /// The keystroke had no effect: the exercise is completed or empty.
    Ignored,
}

impl Outcome {
    /// Whether the outcome moves the cursor, which invalidates any audio
    /// issued for the previous position.
    pub fn moves_cursor(&self) -> bool {
        matches!(
            self,
            Outcome::CorrectAdvance { .. } | Outcome::ExerciseCompleted { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::CorrectAdvance { from, to } => write!(f, "Correct({} -> {})", from, to),
            Outcome::WrongAttempt { index } => write!(f, "Wrong({})", index),
            Outcome::ExerciseCompleted { last_index } => write!(f, "Completed({})", last_index),
            Outcome::Ignored => write!(f, "Ignored"),
        }
    }
}

/// Result of applying one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: ExerciseState,
    /// `None` for modifier-only keys.
    pub outcome: Option<Outcome>,
}

/// Apply `key` to `state` for `exercise`.
pub fn submit_input(state: ExerciseState, exercise: &Exercise, key: &Keystroke) -> Transition {
    let index = match state {
        ExerciseState::Completed { .. } => {
            return Transition {
                state,
                outcome: Some(Outcome::Ignored),
            }
        }
        ExerciseState::InProgress { index, .. } => index,
    };

    let Some(typed) = key.token() else {
        return Transition {
            state,
            outcome: None,
        };
    };

    let Some(expected) = exercise.unit(index) else {
        return Transition {
            state,
            outcome: Some(Outcome::Ignored),
        };
    };

    if !expected.matches(&typed) {
        return Transition {
            state: ExerciseState::InProgress { index, wrong: true },
            outcome: Some(Outcome::WrongAttempt { index }),
        };
    }

    if index + 1 == exercise.len() {
        Transition {
            state: ExerciseState::Completed {
                length: exercise.len(),
            },
            outcome: Some(Outcome::ExerciseCompleted { last_index: index }),
        }
    } else {
        Transition {
            state: ExerciseState::InProgress {
                index: index + 1,
                wrong: false,
            },
            outcome: Some(Outcome::CorrectAdvance {
                from: index,
                to: index + 1,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystroke::Modifier;

    fn abc() -> Exercise {
        Exercise::from_chars("abc", "abc")
    }

    fn type_all(exercise: &Exercise, keys: &str) -> (ExerciseState, Vec<Option<Outcome>>) {
        let mut state = ExerciseState::reset();
        let mut outcomes = Vec::new();
        for c in keys.chars() {
            let t = submit_input(state, exercise, &Keystroke::Char(c));
            state = t.state;
            outcomes.push(t.outcome);
        }
        (state, outcomes)
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ExerciseState::reset().to_string(), "InProgress(0)");
        assert_eq!(
            ExerciseState::InProgress {
                index: 2,
                wrong: true
            }
            .to_string(),
            "InProgress(2, wrong)"
        );
        assert_eq!(
            ExerciseState::Completed { length: 3 }.to_string(),
            "Completed(3)"
        );
    }

    #[test]
    fn test_reset_is_idempotent() {
        assert_eq!(ExerciseState::reset(), ExerciseState::reset());
        assert_eq!(ExerciseState::default(), ExerciseState::reset());
        assert_eq!(ExerciseState::reset().current_index(), 0);
        assert!(!ExerciseState::reset().is_wrong());
        assert!(!ExerciseState::reset().is_completed());
    }

    #[test]
    fn test_full_match_completes_exactly_at_end() {
        let exercise = abc();
        let (state, outcomes) = type_all(&exercise, "abc");

        assert_eq!(
            outcomes,
            vec![
                Some(Outcome::CorrectAdvance { from: 0, to: 1 }),
                Some(Outcome::CorrectAdvance { from: 1, to: 2 }),
                Some(Outcome::ExerciseCompleted { last_index: 2 }),
            ]
        );
        assert!(state.is_completed());
        assert_eq!(state.current_index(), exercise.len());
    }

    #[test]
    fn test_never_completes_early() {
        let exercise = Exercise::from_chars("long", "hello world");
        let mut state = ExerciseState::reset();
        for (i, c) in "hello world".chars().enumerate() {
            assert!(!state.is_completed(), "completed early at {}", i);
            state = submit_input(state, &exercise, &Keystroke::Char(c)).state;
        }
        assert!(state.is_completed());
    }

    #[test]
    fn test_case_insensitive_match() {
        let exercise = abc();
        let t = submit_input(ExerciseState::reset(), &exercise, &Keystroke::Char('A'));
        assert_eq!(t.outcome, Some(Outcome::CorrectAdvance { from: 0, to: 1 }));
    }

    #[test]
    fn test_wrong_attempt_keeps_index_and_sets_flag() {
        let exercise = abc();
        let t = submit_input(ExerciseState::reset(), &exercise, &Keystroke::Char('x'));
        assert_eq!(t.outcome, Some(Outcome::WrongAttempt { index: 0 }));
        assert_eq!(t.state.current_index(), 0);
        assert!(t.state.is_wrong());

        // A second mistake changes nothing further.
        let t2 = submit_input(t.state, &exercise, &Keystroke::Char('y'));
        assert_eq!(t2.state, t.state);
        assert_eq!(t2.outcome, Some(Outcome::WrongAttempt { index: 0 }));
    }

    #[test]
    fn test_correct_after_wrong_clears_flag_and_advances_by_one() {
        let exercise = abc();
        let wrong = submit_input(ExerciseState::reset(), &exercise, &Keystroke::Char('z')).state;
        let t = submit_input(wrong, &exercise, &Keystroke::Char('a'));
        assert_eq!(
            t.state,
            ExerciseState::InProgress {
                index: 1,
                wrong: false
            }
        );
    }

    #[test]
    fn test_named_keys_are_wrong_attempts() {
        let exercise = abc();
        for name in ["Enter", "Backspace", "Tab"] {
            let t = submit_input(
                ExerciseState::reset(),
                &exercise,
                &Keystroke::Named(name.to_string()),
            );
            assert_eq!(t.outcome, Some(Outcome::WrongAttempt { index: 0 }));
        }
    }

    #[test]
    fn test_punctuation_mismatch_is_plain_wrong_attempt() {
        let exercise = Exercise::from_chars("punct", ".,");
        let t = submit_input(ExerciseState::reset(), &exercise, &Keystroke::Char(';'));
        assert_eq!(t.outcome, Some(Outcome::WrongAttempt { index: 0 }));
    }

    #[test]
    fn test_modifiers_are_dropped() {
        let exercise = abc();
        let state = ExerciseState::InProgress {
            index: 1,
            wrong: true,
        };
        for m in [Modifier::Control, Modifier::Shift, Modifier::Alt, Modifier::Meta] {
            let t = submit_input(state, &exercise, &Keystroke::Modifier(m));
            assert_eq!(t.state, state);
            assert_eq!(t.outcome, None);
        }
    }

    #[test]
    fn test_completed_ignores_everything() {
        let exercise = abc();
        let done = ExerciseState::Completed { length: 3 };
        for key in [
            Keystroke::Char('a'),
            Keystroke::Char('c'),
            Keystroke::Named("Enter".to_string()),
            Keystroke::Modifier(Modifier::Shift),
        ] {
            let t = submit_input(done, &exercise, &key);
            assert_eq!(t.state, done);
            assert_eq!(t.outcome, Some(Outcome::Ignored));
        }
    }

    #[test]
    fn test_empty_exercise_is_noop() {
        let exercise = Exercise::new("empty", vec![]);
        let t = submit_input(ExerciseState::reset(), &exercise, &Keystroke::Char('a'));
        assert_eq!(t.state, ExerciseState::reset());
        assert_eq!(t.outcome, Some(Outcome::Ignored));
    }

    #[test]
    fn test_single_unit_wrong_then_right() {
        let exercise = Exercise::from_chars("one", "a");
        let (state, outcomes) = type_all(&exercise, "xa");
        assert_eq!(
            outcomes,
            vec![
                Some(Outcome::WrongAttempt { index: 0 }),
                Some(Outcome::ExerciseCompleted { last_index: 0 }),
            ]
        );
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn test_multi_char_units() {
        let exercise = Exercise::new("named", vec![Unit::new("Enter"), Unit::new("a")]);
        let t = submit_input(
            ExerciseState::reset(),
            &exercise,
            &Keystroke::Named("enter".to_string()),
        );
        assert_eq!(t.outcome, Some(Outcome::CorrectAdvance { from: 0, to: 1 }));
    }

    #[test]
    fn test_current_unit_and_upcoming() {
        let exercise = Exercise::from_chars("abcd", "abcd");
        let state = ExerciseState::reset();
        assert_eq!(state.current_unit(&exercise), Some(&Unit::new("a")));
        assert_eq!(state.upcoming(&exercise, 2), &[Unit::new("b"), Unit::new("c")]);

        let near_end = ExerciseState::InProgress {
            index: 3,
            wrong: false,
        };
        assert!(near_end.upcoming(&exercise, 2).is_empty());

        let done = ExerciseState::Completed { length: 4 };
        assert_eq!(done.current_unit(&exercise), None);
        assert!(done.upcoming(&exercise, 2).is_empty());
    }

    #[test]
    fn test_outcome_moves_cursor() {
        assert!(Outcome::CorrectAdvance { from: 0, to: 1 }.moves_cursor());
        assert!(Outcome::ExerciseCompleted { last_index: 0 }.moves_cursor());
        assert!(!Outcome::WrongAttempt { index: 0 }.moves_cursor());
        assert!(!Outcome::Ignored.moves_cursor());
    }
}
