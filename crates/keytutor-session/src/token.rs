//! Staleness tokens for in-flight audio.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marks which session position an audio sequence was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackToken(u64);

impl PlaybackToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generation counter shared by the controller and every running sequence.
///
/// The controller advances it whenever the cursor moves, the exercise
/// completes, or the session resets. A sequence holding an older token is
/// stale.
#[derive(Debug, Default)]
pub struct PlaybackClock {
    generation: AtomicU64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the current generation.
    pub fn issue(&self) -> PlaybackToken {
        PlaybackToken(self.generation.load(Ordering::Acquire))
    }

    /// Invalidate every outstanding token and return a fresh one.
    pub fn advance(&self) -> PlaybackToken {
        PlaybackToken(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: PlaybackToken) -> bool {
        self.generation.load(Ordering::Acquire) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_is_stable_until_advance() {
        let clock = PlaybackClock::new();
        let a = clock.issue();
        let b = clock.issue();
        assert_eq!(a, b);
        assert!(clock.is_current(a));

        let c = clock.advance();
        assert_ne!(a, c);
        assert!(!clock.is_current(a));
        assert!(clock.is_current(c));
        assert_eq!(clock.issue(), c);
    }

    #[test]
    fn test_generations_increase() {
        let clock = PlaybackClock::new();
        let first = clock.advance();
        let second = clock.advance();
        assert!(second.generation() > first.generation());
        assert_eq!(second.to_string(), format!("#{}", second.generation()));
    }
}
