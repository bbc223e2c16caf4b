//! Keytutor exercise crate - pure typing-exercise state machine.
//!
//! Tracks progress through an exercise and classifies each keystroke as a
//! correct advance, a wrong attempt or the completing keystroke. Nothing in
//! this crate suspends or performs I/O apart from loading the catalog file.

pub mod catalog;
pub mod finger;
pub mod keystroke;
pub mod state;

pub use catalog::ExerciseCatalog;
pub use finger::{finger_for, placement_hint, Finger};
pub use keystroke::{Keystroke, Modifier};
pub use state::{submit_input, ExerciseState, Outcome, Transition};
