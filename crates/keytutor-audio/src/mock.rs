//! Mock synthesizer and player for tests.
//!
//! Both record what they were asked to do. Either can be gated on a
//! [`Semaphore`]: each call then waits for one permit, which lets a test hold
//! a synthesis or playback step in flight while it types more keys.

use std::sync::{Arc, Mutex};

use tokio::sync::Semaphore;

use keytutor_core::types::VoiceOptions;

use crate::{AudioError, AudioPlayer, AudioResource, OutputHandle, SpeechSynthesizer};

async fn pass_gate(gate: &Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

// =============================================================================
// Synthesizer
// =============================================================================

/// Synthesizer returning `tts:<text>` resources.
#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    calls: Arc<Mutex<Vec<(String, VoiceOptions)>>>,
    silent: Vec<String>,
    failing: Vec<String>,
    gate: Option<Arc<Semaphore>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return no audio for `text`.
    pub fn silent_for(mut self, text: &str) -> Self {
        self.silent.push(text.to_string());
        self
    }

    /// Fail with a synthesis error for `text`.
    pub fn fail_on(mut self, text: &str) -> Self {
        self.failing.push(text.to_string());
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Texts requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    /// Voice options of the most recent request.
    pub fn last_options(&self) -> Option<VoiceOptions> {
        self.lock().last().map(|(_, options)| options.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, VoiceOptions)>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        options: &VoiceOptions,
    ) -> Result<Option<AudioResource>, AudioError> {
        self.lock().push((text.to_string(), options.clone()));
        pass_gate(&self.gate).await;

        if self.failing.iter().any(|t| t == text) {
            return Err(AudioError::Synthesis(format!("mock failure for '{}'", text)));
        }
        if text.is_empty() || self.silent.iter().any(|t| t == text) {
            return Ok(None);
        }
        Ok(Some(AudioResource::new(format!("tts:{}", text))))
    }
}

// =============================================================================
// Player
// =============================================================================

/// Lifecycle of one mock playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Started(String),
    Finished(String),
    Failed(String),
    /// The playback future was dropped before it finished.
    Cancelled(String),
}

/// Player that records every playback's lifecycle.
#[derive(Debug, Clone, Default)]
pub struct MockPlayer {
    events: Arc<Mutex<Vec<PlayerEvent>>>,
    failing: Vec<String>,
    gate: Option<Arc<Semaphore>>,
}

struct CancelGuard {
    events: Arc<Mutex<Vec<PlayerEvent>>>,
    resource: Option<String>,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(PlayerEvent::Cancelled(resource));
        }
    }
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail playback of `resource`.
    pub fn fail_on(mut self, resource: &str) -> Self {
        self.failing.push(resource.to_string());
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Resources that played to the end, in order.
    pub fn finished(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::Finished(resource) => Some(resource),
                _ => None,
            })
            .collect()
    }

    /// Resources whose playback started, in order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PlayerEvent::Started(resource) => Some(resource),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PlayerEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl AudioPlayer for MockPlayer {
    async fn play(&self, _output: &OutputHandle, resource: &AudioResource) -> Result<(), AudioError> {
        let name = resource.as_str().to_string();
        self.push(PlayerEvent::Started(name.clone()));
        let mut guard = CancelGuard {
            events: Arc::clone(&self.events),
            resource: Some(name.clone()),
        };

        pass_gate(&self.gate).await;
        tokio::task::yield_now().await;
        guard.resource = None;

        if self.failing.contains(&name) {
            self.push(PlayerEvent::Failed(name.clone()));
            return Err(AudioError::Playback(format!("mock failure for '{}'", name)));
        }
        self.push(PlayerEvent::Finished(name));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_synthesizer_outputs() {
        let synth = MockSynthesizer::new().silent_for("quiet").fail_on("boom");
        let options = VoiceOptions::default().with_rate(2.0);

        let audio = synth.synthesize("a", &options).await.unwrap();
        assert_eq!(audio, Some(AudioResource::new("tts:a")));
        assert_eq!(synth.synthesize("quiet", &options).await.unwrap(), None);
        assert_eq!(synth.synthesize("", &options).await.unwrap(), None);
        assert!(matches!(
            synth.synthesize("boom", &options).await,
            Err(AudioError::Synthesis(_))
        ));

        assert_eq!(synth.requested(), vec!["a", "quiet", "", "boom"]);
        assert_eq!(synth.last_options(), Some(options));
    }

    #[tokio::test]
    async fn test_mock_synthesizer_gate() {
        let gate = Arc::new(Semaphore::new(0));
        let synth = MockSynthesizer::new().with_gate(Arc::clone(&gate));

        let pending = {
            let synth = synth.clone();
            tokio::spawn(async move { synth.synthesize("x", &VoiceOptions::default()).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(synth.requested(), vec!["x"]);
        assert!(!pending.is_finished());

        gate.add_permits(1);
        let audio = pending.await.unwrap().unwrap();
        assert_eq!(audio, Some(AudioResource::new("tts:x")));
    }

    #[tokio::test]
    async fn test_mock_player_records_lifecycle() {
        let player = MockPlayer::new().fail_on("bad.wav");
        let output = OutputHandle::default();

        player.play(&output, &AudioResource::new("ok.wav")).await.unwrap();
        assert!(player
            .play(&output, &AudioResource::new("bad.wav"))
            .await
            .is_err());

        assert_eq!(
            player.events(),
            vec![
                PlayerEvent::Started("ok.wav".to_string()),
                PlayerEvent::Finished("ok.wav".to_string()),
                PlayerEvent::Started("bad.wav".to_string()),
                PlayerEvent::Failed("bad.wav".to_string()),
            ]
        );
        assert_eq!(player.started(), vec!["ok.wav", "bad.wav"]);
        assert_eq!(player.finished(), vec!["ok.wav"]);
    }

    #[tokio::test]
    async fn test_mock_player_drop_records_cancel() {
        let gate = Arc::new(Semaphore::new(0));
        let player = MockPlayer::new().with_gate(gate);
        let output = OutputHandle::default();

        let resource = AudioResource::new("held.wav");
        let fut = player.play(&output, &resource);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), fut).await;
        assert!(timed_out.is_err());

        assert_eq!(
            player.events(),
            vec![
                PlayerEvent::Started("held.wav".to_string()),
                PlayerEvent::Cancelled("held.wav".to_string()),
            ]
        );
    }
}
