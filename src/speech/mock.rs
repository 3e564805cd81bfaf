use async_trait::async_trait;
use crate::speech::engine::{EngineStatus, SpeechEngine, SpeechError, SpeechResult};
use crate::speech::narrator::{preferred_voice, NarrationDevice, Utterance, Voice, DEFAULT_VOICE_PREFERENCES};
use std::sync::{Arc, Mutex};

/// What a mock engine has been asked to do
#[derive(Debug, Default)]
pub struct MockEngineLog {
    /// Utterances passed to `begin`, with the voice name used
    pub spoken: Vec<(String, Option<String>)>,
    /// Number of `halt` calls that silenced something
    pub halted: usize,
}

/// Mock speech engine for running without a synthesizer
///
/// Utterances "finish" after a fixed number of `is_speaking` polls.
pub struct MockSpeechEngine {
    name: String,
    status: EngineStatus,
    available: bool,
    voices: Vec<Voice>,
    polls_per_utterance: usize,
    remaining_polls: usize,
    fail_halt: bool,
    log: Arc<Mutex<MockEngineLog>>,
}

impl MockSpeechEngine {
    /// Create a new mock engine
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: EngineStatus::Disconnected,
            available: true,
            voices: vec![Voice::new("mock-gb", "en-GB"), Voice::new("mock-us", "en-US")],
            polls_per_utterance: 0,
            remaining_polls: 0,
            fail_halt: false,
            log: Arc::new(Mutex::new(MockEngineLog::default())),
        }
    }

    /// Mock that fails its probe, like a machine without a synthesizer
    pub fn unavailable(name: &str) -> Self {
        Self {
            available: false,
            ..Self::new(name)
        }
    }

    /// Replace the voice list reported after connecting
    pub fn set_voices(&mut self, voices: Vec<Voice>) {
        self.voices = voices;
    }

    /// Keep each utterance "speaking" for this many polls
    pub fn set_polls_per_utterance(&mut self, polls: usize) {
        self.polls_per_utterance = polls;
    }

    /// Make `halt` fail while still silencing the utterance
    pub fn set_halt_fails(&mut self, fail: bool) {
        self.fail_halt = fail;
    }

    /// Shared handle to the call log (for verification)
    pub fn log(&self) -> Arc<Mutex<MockEngineLog>> {
        self.log.clone()
    }
}

#[async_trait]
impl SpeechEngine for MockSpeechEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> EngineStatus {
        self.status
    }

    async fn connect(&mut self) -> SpeechResult<()> {
        if !self.available {
            self.status = EngineStatus::Unavailable;
            return Err(SpeechError::Unavailable(self.name.clone()));
        }
        self.status = EngineStatus::Connected;
        Ok(())
    }

    async fn voices(&mut self) -> SpeechResult<Vec<Voice>> {
        if self.status != EngineStatus::Connected {
            return Err(SpeechError::NotConnected);
        }
        Ok(self.voices.clone())
    }

    async fn begin(&mut self, utterance: &Utterance, voice: Option<&Voice>) -> SpeechResult<()> {
        if self.status != EngineStatus::Connected {
            return Err(SpeechError::NotConnected);
        }
        if let Ok(mut log) = self.log.lock() {
            log.spoken
                .push((utterance.text.clone(), voice.map(|v| v.name.clone())));
        }
        self.remaining_polls = self.polls_per_utterance;
        Ok(())
    }

    async fn is_speaking(&mut self) -> bool {
        if self.remaining_polls == 0 {
            return false;
        }
        self.remaining_polls -= 1;
        true
    }

    async fn halt(&mut self) -> SpeechResult<()> {
        if self.remaining_polls > 0 {
            self.remaining_polls = 0;
            if let Ok(mut log) = self.log.lock() {
                log.halted += 1;
            }
        }
        if self.fail_halt {
            return Err(SpeechError::Process(std::io::Error::other("kill failed")));
        }
        Ok(())
    }
}

/// A call made on a [`RecordingNarrator`]
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationCall {
    Speak(Utterance),
    Cancel,
    Pause,
    Resume,
}

/// Narration device that records every call instead of speaking
#[derive(Debug)]
pub struct RecordingNarrator {
    available: bool,
    voice: Option<Voice>,
    calls: Vec<NarrationCall>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self {
            available: true,
            voice: None,
            calls: Vec::new(),
        }
    }

    /// Narrator for an environment without speech; calls are still recorded
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> &[NarrationCall] {
        &self.calls
    }

    /// Texts of all speak requests, in order
    pub fn spoken(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                NarrationCall::Speak(u) => Some(u.text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for RecordingNarrator {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationDevice for RecordingNarrator {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, utterance: Utterance) {
        self.calls.push(NarrationCall::Speak(utterance));
    }

    fn cancel(&mut self) {
        self.calls.push(NarrationCall::Cancel);
    }

    fn pause(&mut self) {
        self.calls.push(NarrationCall::Pause);
    }

    fn resume(&mut self) {
        self.calls.push(NarrationCall::Resume);
    }

    fn select_voice(&mut self, voices: &[Voice]) -> Option<Voice> {
        self.voice = preferred_voice(voices, DEFAULT_VOICE_PREFERENCES).cloned();
        self.voice.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_engine_connect() {
        let mut engine = MockSpeechEngine::new("test");
        assert_eq!(engine.status(), EngineStatus::Disconnected);

        engine.connect().await.unwrap();
        assert_eq!(engine.status(), EngineStatus::Connected);
        assert_eq!(engine.voices().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_engine_unavailable() {
        let mut engine = MockSpeechEngine::unavailable("test");
        assert!(engine.connect().await.is_err());
        assert_eq!(engine.status(), EngineStatus::Unavailable);
        assert!(engine.begin(&Utterance::new("x"), None).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_engine_speaks_for_configured_polls() {
        let mut engine = MockSpeechEngine::new("test");
        engine.set_polls_per_utterance(2);
        engine.connect().await.unwrap();

        engine.begin(&Utterance::new("Yes, Papa?"), None).await.unwrap();
        assert!(engine.is_speaking().await);
        assert!(engine.is_speaking().await);
        assert!(!engine.is_speaking().await);

        let log = engine.log();
        let log = log.lock().unwrap();
        assert_eq!(log.spoken, vec![("Yes, Papa?".to_string(), None)]);
        assert_eq!(log.halted, 0);
    }

    #[test]
    fn test_recording_narrator_picks_voice() {
        let mut narrator = RecordingNarrator::new();
        let voice = narrator.select_voice(&[Voice::new("uk", "en-GB")]);
        assert_eq!(voice.map(|v| v.name), Some("uk".to_string()));
    }
}
