use serde::{Deserialize, Serialize};

/// Locales tried, in order, when picking a narration voice
pub const DEFAULT_VOICE_PREFERENCES: &[&str] = &["en-US", "en-GB", "en-IN"];

/// A single request to speak a line of text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Roughly 0.5 to 2.0, 1.0 is the engine default
    pub pitch: f32,
    /// Roughly 0.1 to 10.0, 1.0 is the engine default
    pub rate: f32,
    /// 0.0 to 1.0
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(0.5, 2.0);
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.clamp(0.1, 10.0);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

/// A voice offered by the speech engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP-47 style language tag, e.g. `en-us`; espeak selects voices by it
    pub lang: String,
}

impl Voice {
    pub fn new(name: &str, lang: &str) -> Self {
        Self {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }
}

fn normalize_lang(lang: &str) -> String {
    lang.trim().replace('_', "-").to_ascii_lowercase()
}

/// First voice, in list order, whose language is in `preferences`
pub fn preferred_voice<'a, S: AsRef<str>>(voices: &'a [Voice], preferences: &[S]) -> Option<&'a Voice> {
    let wanted: Vec<String> = preferences.iter().map(|p| normalize_lang(p.as_ref())).collect();
    voices
        .iter()
        .find(|v| wanted.contains(&normalize_lang(&v.lang)))
}

/// The narration capability the playback controller talks to
///
/// Implementations must never fail loudly: when narration is unavailable
/// every call is a no-op and `is_available` reports `false`.
pub trait NarrationDevice {
    /// Whether speech will actually be produced
    fn is_available(&self) -> bool;

    /// Queue an utterance with the currently selected voice
    fn speak(&mut self, utterance: Utterance);

    /// Drop queued utterances and silence the one in flight
    fn cancel(&mut self);

    /// Suspend the in-flight utterance
    fn pause(&mut self);

    /// Continue after `pause`
    fn resume(&mut self);

    /// Re-pick the preferred voice from a (possibly updated) voice list
    fn select_voice(&mut self, voices: &[Voice]) -> Option<Voice>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_voice_matches_in_list_order() {
        let voices = vec![
            Voice::new("french", "fr-FR"),
            Voice::new("indian", "en-IN"),
            Voice::new("british", "en-GB"),
        ];
        let picked = preferred_voice(&voices, DEFAULT_VOICE_PREFERENCES).unwrap();
        assert_eq!(picked.name, "indian");
    }

    #[test]
    fn test_preferred_voice_normalizes_tags() {
        let voices = vec![Voice::new("us", "en_us")];
        assert_eq!(
            preferred_voice(&voices, DEFAULT_VOICE_PREFERENCES).map(|v| v.name.as_str()),
            Some("us")
        );
    }

    #[test]
    fn test_preferred_voice_none_when_nothing_matches() {
        let voices = vec![Voice::new("german", "de")];
        assert!(preferred_voice(&voices, DEFAULT_VOICE_PREFERENCES).is_none());
        assert!(preferred_voice(&[], DEFAULT_VOICE_PREFERENCES).is_none());
    }

    #[test]
    fn test_utterance_clamps_parameters() {
        let u = Utterance::new("hi").with_pitch(9.0).with_rate(0.0).with_volume(2.0);
        assert_eq!(u.pitch, 2.0);
        assert_eq!(u.rate, 0.1);
        assert_eq!(u.volume, 1.0);
    }
}
