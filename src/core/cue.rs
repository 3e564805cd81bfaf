use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One timed segment of the performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Caption headline
    pub title: String,

    /// Caption second line
    #[serde(default)]
    pub subtitle: String,

    /// On-screen dwell time in milliseconds
    pub duration_ms: u64,

    /// Lines narrated while the cue is on screen
    #[serde(default)]
    pub lines: Vec<String>,
}

impl Cue {
    pub fn new(title: &str, subtitle: &str, duration_ms: u64, lines: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            duration_ms,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CueSheetError {
    #[error("cue sheet has no cues")]
    Empty,

    #[error("cue sheet total duration is zero")]
    ZeroDuration,

    #[error("cue {index} has an empty title")]
    MissingTitle { index: usize },
}

/// Ordered, validated sequence of cues
///
/// The table is immutable once built; `total` and the cumulative end of each
/// cue are computed once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CueTable {
    name: String,
    cues: Vec<Cue>,
    ends: Vec<Duration>,
    total: Duration,
}

impl CueTable {
    pub fn new(name: &str, cues: Vec<Cue>) -> Result<Self, CueSheetError> {
        if cues.is_empty() {
            return Err(CueSheetError::Empty);
        }
        if let Some(index) = cues.iter().position(|c| c.title.trim().is_empty()) {
            return Err(CueSheetError::MissingTitle { index });
        }

        let mut ends = Vec::with_capacity(cues.len());
        let mut acc = Duration::ZERO;
        for cue in &cues {
            acc += cue.duration();
            ends.push(acc);
        }

        if acc.is_zero() {
            return Err(CueSheetError::ZeroDuration);
        }

        Ok(Self {
            name: name.to_string(),
            cues,
            ends,
            total: acc,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Sum of all cue durations
    pub fn total_duration(&self) -> Duration {
        self.total
    }

    /// Cumulative end offset of each cue, in table order
    pub fn cumulative_ends(&self) -> &[Duration] {
        &self.ends
    }

    /// Start offset of the cue at `index`
    pub fn start_of(&self, index: usize) -> Option<Duration> {
        let end = *self.ends.get(index)?;
        Some(end - self.cues[index].duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cues() -> Vec<Cue> {
        vec![
            Cue::new("One", "", 1000, &["A"]),
            Cue::new("Two", "", 2000, &["B", "C"]),
        ]
    }

    #[test]
    fn test_total_and_cumulative_ends() {
        let table = CueTable::new("t", two_cues()).unwrap();
        assert_eq!(table.total_duration(), Duration::from_millis(3000));
        assert_eq!(
            table.cumulative_ends(),
            &[Duration::from_millis(1000), Duration::from_millis(3000)]
        );
        assert_eq!(table.start_of(1), Some(Duration::from_millis(1000)));
        assert_eq!(table.start_of(2), None);
    }

    #[test]
    fn test_rejects_empty_table() {
        assert_eq!(CueTable::new("t", Vec::new()), Err(CueSheetError::Empty));
    }

    #[test]
    fn test_rejects_zero_total() {
        let cues = vec![Cue::new("Silent", "", 0, &[])];
        assert_eq!(CueTable::new("t", cues), Err(CueSheetError::ZeroDuration));
    }

    #[test]
    fn test_rejects_blank_title() {
        let mut cues = two_cues();
        cues[1].title = "  ".to_string();
        assert_eq!(
            CueTable::new("t", cues),
            Err(CueSheetError::MissingTitle { index: 1 })
        );
    }
}
