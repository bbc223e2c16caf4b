//! The single shared audio output.
//!
//! Every cue and every spoken prompt goes through one [`AudioOutput`]. Writes
//! are last-writer-wins: a new `play` cancels whatever is loaded or playing,
//! waits for it to be silenced, then starts. Nothing is ever queued behind a
//! superseded clip.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::{AudioError, AudioPlayer, AudioResource, OutputHandle};

/// How a playback on the shared output ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// The clip played to the end.
    Finished,
    /// A newer playback took the output before this one finished.
    Superseded,
}

#[derive(Debug)]
struct Claim {
    id: u64,
    token: CancellationToken,
}

/// Last-writer-wins wrapper around an [`AudioPlayer`].
pub struct AudioOutput<P> {
    player: Arc<P>,
    handle: OutputHandle,
    current: Mutex<Option<Claim>>,
    next_claim: AtomicU64,
    /// Held for the duration of a playback so a new clip never starts before
    /// the previous one has been dropped.
    busy: tokio::sync::Mutex<()>,
}

impl<P> std::fmt::Debug for AudioOutput<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("handle", &self.handle)
            .field("playing", &self.is_claimed())
            .finish()
    }
}

impl<P: AudioPlayer> AudioOutput<P> {
    pub fn new(player: Arc<P>, handle: OutputHandle) -> Self {
        Self {
            player,
            handle,
            current: Mutex::new(None),
            next_claim: AtomicU64::new(0),
            busy: tokio::sync::Mutex::new(()),
        }
    }

    pub fn handle(&self) -> &OutputHandle {
        &self.handle
    }

    /// Play `resource`, superseding anything currently on the output.
    pub async fn play(&self, resource: &AudioResource) -> Result<PlaybackStatus, AudioError> {
        let (id, token) = self.claim();

        let _busy = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(PlaybackStatus::Superseded),
            guard = self.busy.lock() => guard,
        };

        tracing::debug!(output = %self.handle, resource = %resource, "Playback started");
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Ok(PlaybackStatus::Superseded),
            played = self.player.play(&self.handle, resource) => played.map(|()| PlaybackStatus::Finished),
        };
        self.release(id);

        if let Ok(PlaybackStatus::Superseded) = result {
            tracing::debug!(output = %self.handle, resource = %resource, "Playback superseded");
        }
        result
    }

    /// Cancel whatever is playing without starting anything new.
    pub fn silence(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(claim) = current.take() {
            claim.token.cancel();
            tracing::debug!(output = %self.handle, "Output silenced");
        }
    }

    fn claim(&self) -> (u64, CancellationToken) {
        let id = self.next_claim.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.replace(Claim {
            id,
            token: token.clone(),
        }) {
            previous.token.cancel();
        }
        (id, token)
    }

    fn release(&self, id: u64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if current.as_ref().is_some_and(|claim| claim.id == id) {
            *current = None;
        }
    }
}

impl<P> AudioOutput<P> {
    /// Whether a playback currently owns the output.
    pub fn is_claimed(&self) -> bool {
        self.current
            .lock()
            .map(|current| current.is_some())
            .unwrap_or(false)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPlayer, PlayerEvent};
    use tokio::sync::Semaphore;

    fn output(player: MockPlayer) -> Arc<AudioOutput<MockPlayer>> {
        Arc::new(AudioOutput::new(Arc::new(player), OutputHandle::new("test")))
    }

    #[tokio::test]
    async fn test_play_to_completion() {
        let player = MockPlayer::new();
        let out = output(player.clone());

        let status = out.play(&AudioResource::new("a.wav")).await.unwrap();
        assert_eq!(status, PlaybackStatus::Finished);
        assert_eq!(player.finished(), vec!["a.wav".to_string()]);
        assert!(!out.is_claimed());
    }

    #[tokio::test]
    async fn test_playback_error_is_returned() {
        let player = MockPlayer::new().fail_on("broken.wav");
        let out = output(player);

        let result = out.play(&AudioResource::new("broken.wav")).await;
        assert!(matches!(result, Err(AudioError::Playback(_))));
        assert!(!out.is_claimed());
    }

    #[tokio::test]
    async fn test_new_playback_supersedes_current() {
        let gate = Arc::new(Semaphore::new(0));
        let player = MockPlayer::new().with_gate(Arc::clone(&gate));
        let out = output(player.clone());

        let first = {
            let out = Arc::clone(&out);
            tokio::spawn(async move { out.play(&AudioResource::new("first.wav")).await })
        };
        // Let the first clip start and block on the gate.
        tokio::task::yield_now().await;
        assert!(out.is_claimed());

        let second = {
            let out = Arc::clone(&out);
            tokio::spawn(async move { out.play(&AudioResource::new("second.wav")).await })
        };
        tokio::task::yield_now().await;
        gate.add_permits(1);

        assert_eq!(first.await.unwrap().unwrap(), PlaybackStatus::Superseded);
        assert_eq!(second.await.unwrap().unwrap(), PlaybackStatus::Finished);

        // The first clip was dropped before the second one started.
        assert_eq!(
            player.events(),
            vec![
                PlayerEvent::Started("first.wav".to_string()),
                PlayerEvent::Cancelled("first.wav".to_string()),
                PlayerEvent::Started("second.wav".to_string()),
                PlayerEvent::Finished("second.wav".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_silence_cancels_playback() {
        let gate = Arc::new(Semaphore::new(0));
        let player = MockPlayer::new().with_gate(gate);
        let out = output(player.clone());

        let handle = {
            let out = Arc::clone(&out);
            tokio::spawn(async move { out.play(&AudioResource::new("long.wav")).await })
        };
        tokio::task::yield_now().await;
        out.silence();

        assert_eq!(handle.await.unwrap().unwrap(), PlaybackStatus::Superseded);
        assert!(player.finished().is_empty());
        assert!(!out.is_claimed());
    }

    #[test]
    fn test_silence_when_idle_is_noop() {
        let out = output(MockPlayer::new());
        out.silence();
        assert!(!out.is_claimed());
    }
}
