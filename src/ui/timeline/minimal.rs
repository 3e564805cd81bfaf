//! Minimal style timeline - thin track with floating time display

use imgui::Ui;
use super::{format_clock, TimelineAction, TimelineData};

const TRACK_COLOR: [f32; 4] = [0.25, 0.25, 0.28, 1.0];
const FILL_COLOR: [f32; 4] = [0.95, 0.6, 0.25, 1.0];
const MARKER_PLAYED: [f32; 4] = [0.95, 0.75, 0.4, 1.0];
const MARKER_AHEAD: [f32; 4] = [0.55, 0.55, 0.6, 1.0];
const MARKER_ACTIVE: [f32; 4] = [1.0, 0.9, 0.3, 1.0];

/// Thin progress track with a circular thumb and cue markers
pub struct MinimalTimeline {
    /// Whether marker labels are visible (hover state)
    labels_visible: bool,
    /// Fade timer for the hover labels
    hover_timer: f32,
    thumb_radius: f32,
    is_playing: bool,
}

impl MinimalTimeline {
    pub fn new() -> Self {
        Self {
            labels_visible: false,
            hover_timer: 0.0,
            thumb_radius: 7.0,
            is_playing: false,
        }
    }

    /// Set whether playback is active
    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    fn draw_track(
        &self,
        draw_list: &imgui::DrawListMut,
        data: &TimelineData,
        pos_min: [f32; 2],
        pos_max: [f32; 2],
    ) {
        let track_y = (pos_min[1] + pos_max[1]) / 2.0;
        let track_height = 4.0;

        draw_list.add_rect(
            [pos_min[0], track_y - track_height / 2.0],
            [pos_max[0], track_y + track_height / 2.0],
            TRACK_COLOR,
        ).filled(true).rounding(2.0).build();

        let thumb_x = pos_min[0] + data.position * (pos_max[0] - pos_min[0]);
        draw_list.add_rect(
            [pos_min[0], track_y - track_height / 2.0],
            [thumb_x, track_y + track_height / 2.0],
            FILL_COLOR,
        ).filled(true).rounding(2.0).build();

        draw_list.add_circle(
            [thumb_x, track_y],
            self.thumb_radius,
            FILL_COLOR,
        ).filled(true).num_segments(20).build();

        draw_list.add_circle(
            [thumb_x, track_y],
            self.thumb_radius,
            [1.0, 0.85, 0.6, 0.5],
        ).thickness(1.5).num_segments(20).build();
    }

    /// Cue start markers as small dots above the track
    fn draw_markers(
        &self,
        draw_list: &imgui::DrawListMut,
        data: &TimelineData,
        pos_min: [f32; 2],
        pos_max: [f32; 2],
    ) {
        let width = pos_max[0] - pos_min[0];
        let track_y = (pos_min[1] + pos_max[1]) / 2.0;

        for (i, marker) in data.markers.iter().enumerate() {
            let x = pos_min[0] + marker.position * width;
            let color = if data.active_cue == Some(i) {
                MARKER_ACTIVE
            } else if marker.position <= data.position {
                MARKER_PLAYED
            } else {
                MARKER_AHEAD
            };

            draw_list.add_circle([x, track_y - 12.0], 3.0, color)
                .filled(true)
                .num_segments(10)
                .build();

            if self.labels_visible || data.active_cue == Some(i) {
                draw_list.add_text(
                    [x, track_y - 30.0],
                    [color[0], color[1], color[2], 0.8],
                    &marker.label,
                );
            }
        }
    }

    fn draw_time_display(
        &self,
        draw_list: &imgui::DrawListMut,
        data: &TimelineData,
        pos_min: [f32; 2],
        pos_max: [f32; 2],
    ) {
        let track_y = (pos_min[1] + pos_max[1]) / 2.0;
        let text = format!("{} / {}", format_clock(data.elapsed()), format_clock(data.total));

        draw_list.add_text(
            [pos_min[0], track_y + 14.0],
            [0.6, 0.6, 0.65, 0.9],
            &text,
        );

        draw_list.add_text(
            [pos_max[0] - 40.0, track_y + 14.0],
            [0.5, 0.5, 0.55, 0.6],
            format!("{:.0}%", data.position * 100.0),
        );
    }

    pub fn render(&mut self, ui: &Ui, data: &TimelineData) -> TimelineAction {
        let mut action = TimelineAction::None;

        let label = if self.is_playing { "||" } else { ">" };
        if ui.small_button(label) {
            action = TimelineAction::Toggle;
        }
        ui.same_line();
        if ui.small_button("<<") {
            action = TimelineAction::Replay;
        }
        ui.same_line();

        let slider_height = 60.0;
        let size = [ui.content_region_avail()[0], slider_height];
        let draw_list = ui.get_window_draw_list();
        let pos_min = ui.cursor_screen_pos();
        let pos_max = [pos_min[0] + size[0], pos_min[1] + slider_height - 10.0];

        let mouse_pos = ui.io().mouse_pos;
        let is_hovered = mouse_pos[0] >= pos_min[0] && mouse_pos[0] <= pos_max[0] &&
                         mouse_pos[1] >= pos_min[1] && mouse_pos[1] <= pos_max[1] + 20.0;

        if is_hovered {
            self.labels_visible = true;
            self.hover_timer = 1.0;
        } else if self.hover_timer > 0.0 {
            self.hover_timer -= 0.05;
            if self.hover_timer <= 0.0 {
                self.labels_visible = false;
            }
        }

        self.draw_track(&draw_list, data, pos_min, pos_max);
        self.draw_markers(&draw_list, data, pos_min, pos_max);
        self.draw_time_display(&draw_list, data, pos_min, pos_max);

        if is_hovered {
            let rel_x = (mouse_pos[0] - pos_min[0]) / (pos_max[0] - pos_min[0]);
            if let Some(cue) = data.cue_at(rel_x).and_then(|i| data.markers.get(i)) {
                ui.tooltip(|| {
                    ui.text_colored([0.9, 0.8, 0.6, 1.0], &cue.label);
                    ui.text_colored([0.5, 0.6, 0.7, 1.0], format!("Position: {:.1}%", rel_x * 100.0));
                });
            }
        }

        ui.dummy(size);

        action
    }
}

impl Default for MinimalTimeline {
    fn default() -> Self {
        Self::new()
    }
}
