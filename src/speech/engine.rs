use async_trait::async_trait;
use crate::speech::narrator::{Utterance, Voice};
use thiserror::Error;

/// Result type for speech engine operations
pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech engine '{0}' is not available")]
    Unavailable(String),

    #[error("speech engine is not connected")]
    NotConnected,

    #[error("speech process failed: {0}")]
    Process(#[from] std::io::Error),
}

/// Status of a speech engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineStatus {
    /// Not probed yet
    Disconnected,
    /// Probing the platform for the engine
    Connecting,
    /// Ready to speak
    Connected,
    /// Probe failed; narration is skipped
    Unavailable,
}

/// Trait for speech synthesis back ends
///
/// This trait provides a common interface for:
/// - Process-backed synthesizers (espeak-ng / espeak)
/// - Mock engines for testing
///
/// `begin` must return as soon as speech has started; completion is observed
/// by polling `is_speaking`.
#[async_trait]
pub trait SpeechEngine: Send {
    /// Get the name/identifier of this engine
    fn name(&self) -> &str;

    /// Get the current status of the engine
    fn status(&self) -> EngineStatus;

    /// Probe the platform and get ready to speak
    async fn connect(&mut self) -> SpeechResult<()>;

    /// List the voices the engine offers
    async fn voices(&mut self) -> SpeechResult<Vec<Voice>>;

    /// Start speaking; the previous utterance must have finished or been halted
    async fn begin(&mut self, utterance: &Utterance, voice: Option<&Voice>) -> SpeechResult<()>;

    /// Whether the last utterance is still being spoken
    async fn is_speaking(&mut self) -> bool;

    /// Silence the in-flight utterance, if any
    async fn halt(&mut self) -> SpeechResult<()>;
}
