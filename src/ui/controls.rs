use crate::playback::PlaybackState;
use imgui::{Condition, Ui};

/// Button presses from the controls window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Start,
    Toggle,
    Replay,
    Stop,
    SetNarration(bool),
}

/// Label of the single Cue / Pause / Resume button
pub fn toggle_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Pause",
        PlaybackState::Paused => "Resume",
        PlaybackState::Stopped | PlaybackState::Finished => "Cue",
    }
}

/// Hint shown under the buttons, depending on whether narration can speak
pub fn helper_message(narration_available: bool) -> &'static str {
    if narration_available {
        "Press Cue and sing along! Each line is read out loud as it comes up."
    } else {
        "Press Cue and sing along! (Narration is not available here, so read the captions.)"
    }
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "Ready",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Finished => "Finished",
    }
}

/// Play / pause / replay buttons plus the narration switch
pub struct ControlsWindow {
    /// Narration switch as last shown to the user
    narration_enabled: bool,
}

impl ControlsWindow {
    pub fn new(narration_enabled: bool) -> Self {
        Self { narration_enabled }
    }

    pub fn set_narration_enabled(&mut self, enabled: bool) {
        self.narration_enabled = enabled;
    }

    pub fn render(
        &mut self,
        ui: &Ui,
        is_open: &mut bool,
        state: PlaybackState,
        narration_available: bool,
    ) -> Option<ControlAction> {
        let mut action = None;

        ui.window("Controls")
            .size([420.0, 150.0], Condition::FirstUseEver)
            .position([10.0, 400.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                let finished = state == PlaybackState::Finished;

                if ui.button("Start") {
                    action = Some(ControlAction::Start);
                }
                ui.same_line();

                // Finished only leaves through start or replay
                ui.disabled(finished, || {
                    if ui.button(toggle_label(state)) {
                        action = Some(ControlAction::Toggle);
                    }
                });
                ui.same_line();

                if ui.button("Replay") {
                    action = Some(ControlAction::Replay);
                }
                ui.same_line();

                ui.disabled(state == PlaybackState::Stopped, || {
                    if ui.button("Stop") {
                        action = Some(ControlAction::Stop);
                    }
                });

                ui.same_line();
                ui.text_colored([0.6, 0.6, 0.65, 1.0], state_label(state));

                ui.separator();

                if ui.checkbox("Narration", &mut self.narration_enabled) {
                    action = Some(ControlAction::SetNarration(self.narration_enabled));
                }

                let color = if narration_available {
                    [0.7, 0.85, 0.7, 1.0]
                } else {
                    [0.9, 0.7, 0.4, 1.0]
                };
                let _color = ui.push_style_color(imgui::StyleColor::Text, color);
                ui.text_wrapped(helper_message(narration_available));
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_label_follows_state() {
        assert_eq!(toggle_label(PlaybackState::Stopped), "Cue");
        assert_eq!(toggle_label(PlaybackState::Playing), "Pause");
        assert_eq!(toggle_label(PlaybackState::Paused), "Resume");
        assert_eq!(toggle_label(PlaybackState::Finished), "Cue");
    }

    #[test]
    fn test_helper_message_mentions_missing_narration() {
        assert_ne!(helper_message(true), helper_message(false));
        assert!(helper_message(false).contains("not available"));
    }
}
