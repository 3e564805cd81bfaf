//! Elapsed-time to cue mapping
//!
//! The controller polls the clock every frame and derives everything from the
//! elapsed time; nothing is scheduled per cue boundary.

use crate::core::CueTable;
use std::time::{Duration, Instant};

/// Index of the cue whose window contains `elapsed`
///
/// A cue owns the window `(previous end, its end]`, so a boundary instant
/// belongs to the earlier cue. Returns `None` once `elapsed` reaches the
/// total duration.
pub fn derive_active_cue(elapsed: Duration, cues: &CueTable) -> Option<usize> {
    if elapsed >= cues.total_duration() {
        return None;
    }
    cues.cumulative_ends().iter().position(|end| *end >= elapsed)
}

/// Fraction of the performance completed, clamped to `[0, 1]`
pub fn progress_at(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

/// Mutable playback position owned by the controller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub progress: f64,
    pub active_cue: Option<usize>,
    /// Instant that corresponds to elapsed time zero
    pub start_time: Option<Instant>,
    /// Cue whose narration has already been scheduled
    pub last_spoken: Option<usize>,
}

impl Timeline {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.start_time
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cue;

    fn table() -> CueTable {
        CueTable::new(
            "scenario",
            vec![
                Cue::new("First", "", 1000, &["A"]),
                Cue::new("Second", "", 2000, &["B", "C"]),
            ],
        )
        .unwrap()
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_scenario_lookup() {
        let cues = table();
        assert_eq!(derive_active_cue(ms(0), &cues), Some(0));
        assert_eq!(derive_active_cue(ms(500), &cues), Some(0));
        assert_eq!(derive_active_cue(ms(1500), &cues), Some(1));
        assert_eq!(derive_active_cue(ms(3000), &cues), None);
        assert_eq!(derive_active_cue(ms(4000), &cues), None);
    }

    #[test]
    fn test_boundary_resolves_to_earlier_cue() {
        let cues = table();
        assert_eq!(derive_active_cue(ms(1000), &cues), Some(0));
        assert_eq!(derive_active_cue(ms(1001), &cues), Some(1));
    }

    #[test]
    fn test_active_cue_is_monotonic_and_total() {
        let cues = table();
        let mut last = 0;
        for t in (0..3000).step_by(7) {
            let idx = derive_active_cue(ms(t), &cues).expect("a cue is active before the end");
            assert!(idx >= last, "cue went backwards at t={}", t);
            last = idx;
        }
    }

    #[test]
    fn test_zero_length_cue_is_skipped() {
        let cues = CueTable::new(
            "gaps",
            vec![
                Cue::new("Blink", "", 0, &[]),
                Cue::new("Stay", "", 1000, &[]),
            ],
        )
        .unwrap();
        assert_eq!(derive_active_cue(ms(0), &cues), Some(0));
        assert_eq!(derive_active_cue(ms(1), &cues), Some(1));
    }

    #[test]
    fn test_progress_is_clamped() {
        let total = ms(3000);
        assert_eq!(progress_at(ms(0), total), 0.0);
        assert!((progress_at(ms(1500), total) - 0.5).abs() < 1e-9);
        assert_eq!(progress_at(ms(3000), total), 1.0);
        assert_eq!(progress_at(ms(9000), total), 1.0);
    }

    #[test]
    fn test_elapsed_without_start_is_zero() {
        let timeline = Timeline::default();
        assert_eq!(timeline.elapsed(Instant::now()), Duration::ZERO);
    }
}
