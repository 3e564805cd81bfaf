//! Cue progress timeline
//!
//! Shows how far the performance has run, with a marker where each cue
//! begins. Playback has no seek operation, so the track is display only and
//! the widget carries toggle and replay buttons instead.

mod minimal;

use crate::core::CueTable;
use imgui::Ui;
use std::time::Duration;

pub use minimal::MinimalTimeline;

/// A marker on the timeline
#[derive(Clone, Debug)]
pub struct TimelineMarker {
    pub position: f32,
    pub label: String,
}

impl TimelineMarker {
    pub fn new(position: f32, label: &str) -> Self {
        Self {
            position: position.clamp(0.0, 1.0),
            label: label.to_string(),
        }
    }
}

/// Shared data for timeline rendering
#[derive(Clone, Debug, Default)]
pub struct TimelineData {
    /// Completed fraction (0.0 to 1.0)
    pub position: f32,
    /// Length of the whole performance
    pub total: Duration,
    /// Cue being performed, if any
    pub active_cue: Option<usize>,
    /// Cue start markers, in cue order
    pub markers: Vec<TimelineMarker>,
}

impl TimelineData {
    /// Build markers for every cue of a table
    pub fn from_cues(cues: &CueTable) -> Self {
        let total = cues.total_duration();
        let markers = cues
            .cues()
            .iter()
            .enumerate()
            .map(|(i, cue)| {
                let start = cues.start_of(i).unwrap_or_default();
                TimelineMarker::new(fraction(start, total), &cue.title)
            })
            .collect();

        Self {
            position: 0.0,
            total,
            active_cue: None,
            markers,
        }
    }

    pub fn set_progress(&mut self, progress: f64, active_cue: Option<usize>) {
        self.position = progress.clamp(0.0, 1.0) as f32;
        self.active_cue = active_cue;
    }

    /// Elapsed performance time at the current position
    pub fn elapsed(&self) -> Duration {
        let ms = self.total.as_millis() as f64 * self.position as f64;
        Duration::from_millis(ms.round() as u64)
    }

    /// Index of the cue whose span contains `pos`
    pub fn cue_at(&self, pos: f32) -> Option<usize> {
        if self.markers.is_empty() || !(0.0..=1.0).contains(&pos) {
            return None;
        }
        let next = self.markers.iter().position(|m| m.position > pos);
        Some(match next {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.markers.len() - 1,
        })
    }
}

fn fraction(part: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        0.0
    } else {
        (part.as_secs_f64() / total.as_secs_f64()) as f32
    }
}

/// Format a duration as `m:ss.s`
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs_f64();
    let minutes = (secs / 60.0).floor() as u64;
    format!("{}:{:04.1}", minutes, secs - minutes as f64 * 60.0)
}

/// Actions returned by the timeline widget
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineAction {
    None,
    Toggle,
    Replay,
}

/// Timeline window wrapper
pub struct TimelineWindow {
    data: TimelineData,
    widget: MinimalTimeline,
}

impl TimelineWindow {
    pub fn new(cues: &CueTable) -> Self {
        Self {
            data: TimelineData::from_cues(cues),
            widget: MinimalTimeline::new(),
        }
    }

    /// Rebuild markers after a new cue table is loaded
    pub fn set_cues(&mut self, cues: &CueTable) {
        self.data = TimelineData::from_cues(cues);
    }

    pub fn update(&mut self, progress: f64, active_cue: Option<usize>, playing: bool) {
        self.data.set_progress(progress, active_cue);
        self.widget.set_playing(playing);
    }

    pub fn render(&mut self, ui: &Ui, is_open: &mut bool) -> TimelineAction {
        let mut action = TimelineAction::None;

        ui.window("Timeline")
            .size([900.0, 110.0], imgui::Condition::FirstUseEver)
            .position([10.0, 560.0], imgui::Condition::FirstUseEver)
            .opened(is_open)
            .build(|| {
                action = self.widget.render(ui, &self.data);
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::johny_johny;

    #[test]
    fn test_markers_follow_cue_starts() {
        let data = TimelineData::from_cues(&johny_johny());
        assert_eq!(data.markers.len(), 6);
        assert_eq!(data.markers[0].position, 0.0);
        // second cue starts after the 2400ms intro
        assert!((data.markers[1].position - 2400.0 / 16200.0).abs() < 1e-6);
        assert!(data.markers.windows(2).all(|w| w[0].position < w[1].position));
    }

    #[test]
    fn test_cue_at_position() {
        let data = TimelineData::from_cues(&johny_johny());
        assert_eq!(data.cue_at(0.0), Some(0));
        assert_eq!(data.cue_at(0.1), Some(0));
        assert_eq!(data.cue_at(0.2), Some(1));
        assert_eq!(data.cue_at(1.0), Some(5));
        assert_eq!(data.cue_at(1.5), None);
    }

    #[test]
    fn test_progress_and_clock() {
        let mut data = TimelineData::from_cues(&johny_johny());
        data.set_progress(1.7, Some(5));
        assert_eq!(data.position, 1.0);
        assert_eq!(data.elapsed(), Duration::from_millis(16200));
        assert_eq!(format_clock(Duration::from_millis(16200)), "0:16.2");
        assert_eq!(format_clock(Duration::from_millis(75_500)), "1:15.5");
    }
}
