pub mod engine;
pub mod espeak;
pub mod manager;
#[cfg(test)]
pub mod mock;
pub mod narrator;

pub use engine::{EngineStatus, SpeechEngine, SpeechError};
pub use espeak::EspeakEngine;
pub use manager::{SpeechManager, SpokenLine};
#[cfg(test)]
pub use mock::{MockSpeechEngine, RecordingNarrator};
pub use narrator::{NarrationDevice, Utterance, Voice, DEFAULT_VOICE_PREFERENCES};
