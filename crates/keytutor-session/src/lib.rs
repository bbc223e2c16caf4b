//! Keytutor session crate - audio feedback orchestration and session control.
//!
//! Turns exercise outcomes into ordered audio sequences on the shared output
//! and drives one exercise attempt from first prompt to completion:
//! keystroke -> state machine -> feedback plan -> orchestrator.
//!
//! State changes apply synchronously on every keystroke. Audio runs in
//! spawned tasks that check a [`PlaybackToken`] before each step and give up
//! silently once the session has moved on.

pub mod controller;
pub mod feedback;
pub mod orchestrator;
pub mod progress;
pub mod token;

pub use controller::{KeyResponse, SessionController, SessionHooks};
pub use feedback::{completion_steps, plan_for, FeedbackPlan, FeedbackRequest, Sound};
pub use orchestrator::{FeedbackOrchestrator, SequenceEnd, SequenceReport};
pub use progress::{Progress, ProgressStore, SessionSummary};
pub use token::{PlaybackClock, PlaybackToken};
