use crate::speech::{EngineStatus, SpeechManager, SpokenLine};
use imgui::{Condition, Ui};
use std::sync::atomic::Ordering;

/// Short human description of the engine status
pub fn status_text(status: EngineStatus, engine: Option<&str>) -> String {
    let engine = engine.unwrap_or("speech engine");
    match status {
        EngineStatus::Disconnected => "Narration off".to_string(),
        EngineStatus::Connecting => format!("Looking for {}...", engine),
        EngineStatus::Connected => format!("Speaking with {}", engine),
        EngineStatus::Unavailable => format!("{} not found; narration skipped", engine),
    }
}

fn format_line(line: &SpokenLine) -> String {
    match &line.voice {
        Some(voice) => format!("[{}] {} ({})", line.at.format("%H:%M:%S%.3f"), line.text, voice),
        None => format!("[{}] {}", line.at.format("%H:%M:%S%.3f"), line.text),
    }
}

/// Window listing every line handed to the speech engine
pub struct NarrationLogWindow {
    auto_scroll: bool,
    last_len: usize,
}

impl NarrationLogWindow {
    pub fn new() -> Self {
        Self {
            auto_scroll: true,
            last_len: 0,
        }
    }

    pub fn render(&mut self, ui: &Ui, is_open: &mut bool, speech: &mut SpeechManager) {
        ui.window("Narration Log")
            .size([420.0, 260.0], Condition::FirstUseEver)
            .position([930.0, 30.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                ui.text(status_text(speech.status(), speech.engine_name()));
                if let Some(voice) = speech.voice() {
                    ui.text_disabled(format!("Voice: {} ({})", voice.name, voice.lang));
                } else if !speech.voices().is_empty() {
                    ui.text_disabled("Voice: engine default");
                }

                let stats = speech.stats();
                ui.text_disabled(format!(
                    "Spoken: {}  Errors: {}",
                    stats.utterances_spoken.load(Ordering::Relaxed),
                    stats.errors.load(Ordering::Relaxed),
                ));

                if ui.small_button("Clear") {
                    speech.clear_history();
                }
                ui.same_line();
                ui.checkbox("Auto-scroll", &mut self.auto_scroll);
                ui.separator();

                ui.child_window("##narration_lines").build(|| {
                    for line in speech.history() {
                        ui.text(format_line(line));
                    }
                    let len = speech.history().len();
                    if self.auto_scroll && len != self.last_len {
                        ui.set_scroll_here_y_with_ratio(1.0);
                    }
                    self.last_len = len;
                });
            });
    }
}

impl Default for NarrationLogWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_status_text() {
        assert_eq!(
            status_text(EngineStatus::Connected, Some("espeak-ng")),
            "Speaking with espeak-ng"
        );
        assert!(status_text(EngineStatus::Unavailable, None).contains("narration skipped"));
    }

    #[test]
    fn test_format_line() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap();
        let line = SpokenLine {
            at,
            text: "Yes, Papa?".to_string(),
            voice: Some("en-gb".to_string()),
        };
        assert_eq!(format_line(&line), "[09:30:15.000] Yes, Papa? (en-gb)");
    }
}
