use crate::core::{Cue, CueTable};
use crate::playback::PlaybackState;
use imgui::{Condition, StyleColor, Ui};

const TITLE_COLOR: [f32; 4] = [1.0, 0.85, 0.35, 1.0];
const SUBTITLE_COLOR: [f32; 4] = [0.8, 0.8, 0.9, 1.0];
const DIM_COLOR: [f32; 4] = [0.5, 0.5, 0.55, 1.0];

/// Caption pair shown on stage for a playback state
pub fn stage_caption<'a>(state: PlaybackState, cue: Option<&'a Cue>) -> (&'a str, &'a str) {
    match (state, cue) {
        (PlaybackState::Finished, _) => ("The end!", "Press Replay to sing again"),
        (_, Some(cue)) => (&cue.title, &cue.subtitle),
        (PlaybackState::Paused, None) => ("Paused", "Press Resume to continue"),
        _ => ("Ready?", "Press Cue to begin"),
    }
}

/// Big captions for the active cue above the lyric sheet
pub struct StageWindow {
    /// Scroll the lyric sheet to the active cue when it changes
    follow_active: bool,
    last_active: Option<usize>,
}

impl StageWindow {
    pub fn new() -> Self {
        Self {
            follow_active: true,
            last_active: None,
        }
    }

    pub fn render(
        &mut self,
        ui: &Ui,
        is_open: &mut bool,
        cues: &CueTable,
        state: PlaybackState,
        active: Option<usize>,
    ) {
        ui.window("Stage")
            .size([600.0, 360.0], Condition::FirstUseEver)
            .position([10.0, 30.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                ui.text_colored(DIM_COLOR, cues.name());
                ui.separator();

                let (title, subtitle) = stage_caption(state, active.and_then(|i| cues.get(i)));
                ui.set_window_font_scale(2.2);
                ui.text_colored(TITLE_COLOR, title);
                ui.set_window_font_scale(1.4);
                ui.text_colored(SUBTITLE_COLOR, subtitle);
                ui.set_window_font_scale(1.0);
            });
    }

    /// Lyric sheet listing every cue with the active one highlighted
    pub fn render_lyrics(
        &mut self,
        ui: &Ui,
        is_open: &mut bool,
        cues: &CueTable,
        active: Option<usize>,
    ) {
        ui.window("Lyrics")
            .size([300.0, 360.0], Condition::FirstUseEver)
            .position([620.0, 30.0], Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                ui.checkbox("Follow", &mut self.follow_active);
                ui.separator();

                let scroll_to = self.follow_active && active != self.last_active;

                for (i, cue) in cues.cues().iter().enumerate() {
                    let is_active = active == Some(i);
                    let _token = is_active.then(|| ui.push_style_color(StyleColor::Text, TITLE_COLOR));

                    ui.text(format!("{}. {}", i + 1, cue.title));
                    if scroll_to && is_active {
                        ui.set_scroll_here_y_with_ratio(0.3);
                    }
                    if !cue.subtitle.is_empty() {
                        ui.text(format!("    {}", cue.subtitle));
                    }
                    ui.text_disabled(format!("    {:.1}s", cue.duration().as_secs_f32()));
                }
            });
        self.last_active = active;
    }
}

impl Default for StageWindow {
    fn default() -> Self {
        Self::new()
    }
}
