use crate::core::{Cue, CueTable};
use crate::playback::timeline::{derive_active_cue, progress_at, Timeline};
use crate::playback::timers::TimerQueue;
use crate::playback::{PlaybackConfig, PlaybackState};
use crate::speech::{NarrationDevice, Utterance};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// One line of a cue waiting to be narrated
#[derive(Debug, Clone, Copy, PartialEq)]
struct NarrationJob {
    cue: usize,
    line: usize,
}

/// Playback controller for a cue table
///
/// Every operation takes the current instant from the caller, so the same
/// controller runs under a real frame loop or a test with hand-picked times.
pub struct PlaybackController<N: NarrationDevice> {
    cues: CueTable,
    config: PlaybackConfig,
    state: PlaybackState,
    timeline: Timeline,
    narration: TimerQueue<NarrationJob>,
    settle_deadline: Option<Instant>,
    frame_requested: bool,
    narrator: N,
}

impl<N: NarrationDevice> PlaybackController<N> {
    pub fn new(cues: CueTable, config: PlaybackConfig, narrator: N) -> Self {
        Self {
            cues,
            config,
            state: PlaybackState::Stopped,
            timeline: Timeline::default(),
            narration: TimerQueue::new(),
            settle_deadline: None,
            frame_requested: false,
            narrator,
        }
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Completed fraction of the performance
    pub fn progress(&self) -> f64 {
        self.timeline.progress
    }

    pub fn active_cue(&self) -> Option<usize> {
        self.timeline.active_cue
    }

    pub fn current_cue(&self) -> Option<&Cue> {
        self.timeline.active_cue.and_then(|i| self.cues.get(i))
    }

    pub fn cues(&self) -> &CueTable {
        &self.cues
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PlaybackConfig) {
        self.config = config;
    }

    pub fn narrator(&self) -> &N {
        &self.narrator
    }

    pub fn narrator_mut(&mut self) -> &mut N {
        &mut self.narrator
    }

    /// Whether a replay is waiting out its settle delay
    pub fn is_settling(&self) -> bool {
        self.settle_deadline.is_some()
    }

    /// Number of narration lines scheduled but not yet spoken
    pub fn pending_narration(&self) -> usize {
        self.narration.len()
    }

    /// Whether the host should keep producing frames
    pub fn wants_frame(&self) -> bool {
        self.frame_requested
    }

    /// Earliest instant at which `update` has deferred work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.settle_deadline, self.narration.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Swap in a different cue table; playback stops
    pub fn set_cues(&mut self, cues: CueTable) {
        self.stop();
        info!("Loaded cue table '{}' ({} cues)", cues.name(), cues.len());
        self.cues = cues;
    }

    /// Start from the beginning, whatever the current state
    pub fn start(&mut self) {
        self.teardown();
        self.timeline.reset();
        self.settle_deadline = None;
        self.state = PlaybackState::Playing;
        self.frame_requested = true;
        info!("Playback started");
    }

    /// Stop and reset to the beginning
    pub fn stop(&mut self) {
        self.teardown();
        self.timeline.reset();
        self.settle_deadline = None;
        self.state = PlaybackState::Stopped;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.frame_requested = false;
        let dropped = self.narration.cancel_all();
        self.narrator.pause();
        self.state = PlaybackState::Paused;
        info!("Playback paused at {:.1}% ({} narration lines dropped)", self.timeline.progress * 100.0, dropped);
    }

    /// Enter playing from stopped or paused, keeping the stored progress
    pub fn resume(&mut self, now: Instant) {
        match self.state {
            PlaybackState::Paused => self.narrator.resume(),
            PlaybackState::Stopped => {}
            PlaybackState::Playing | PlaybackState::Finished => return,
        }

        let offset = self.cues.total_duration().mul_f64(self.timeline.progress);
        self.timeline.start_time = Some(now.checked_sub(offset).unwrap_or(now));
        self.timeline.last_spoken = None;
        self.settle_deadline = None;
        self.state = PlaybackState::Playing;
        self.frame_requested = true;
        info!("Playback resumed at {:.1}%", self.timeline.progress * 100.0);
    }

    /// The single cue / pause / resume control
    pub fn toggle(&mut self, now: Instant) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.resume(now),
            PlaybackState::Finished => debug!("Toggle ignored after the end; replay or start instead"),
        }
    }

    /// Reset, then start again once the settle delay has passed
    pub fn replay(&mut self, now: Instant) {
        self.stop();
        self.settle_deadline = Some(now + self.config.settle_delay());
        info!("Replay requested");
    }

    /// Run one frame: the replay settle timer, the tick, then due narration
    ///
    /// Returns whether another frame is wanted.
    pub fn update(&mut self, now: Instant) -> bool {
        if let Some(deadline) = self.settle_deadline {
            if now >= deadline {
                self.start();
            }
        }

        let wants_frame = self.tick(now);
        self.fire_due_narration(now);
        wants_frame || self.settle_deadline.is_some()
    }

    /// Advance the timeline to `now`; returns whether another tick is wanted
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        self.timeline.start_time.get_or_insert(now);
        let elapsed = self.timeline.elapsed(now);
        let total = self.cues.total_duration();

        let Some(index) = derive_active_cue(elapsed, &self.cues) else {
            self.complete();
            return false;
        };

        if self.timeline.active_cue != Some(index) {
            debug!("Cue {} active at {:?}", index, elapsed);
        }
        self.timeline.active_cue = Some(index);
        self.timeline.progress = progress_at(elapsed, total);

        if self.timeline.last_spoken != Some(index) {
            self.schedule_narration(index, now);
        }

        self.frame_requested = true;
        true
    }

    fn complete(&mut self) {
        self.teardown();
        self.timeline.progress = 1.0;
        self.timeline.active_cue = None;
        self.timeline.last_spoken = None;
        self.state = PlaybackState::Finished;
        info!("Playback finished");
    }

    /// Drop the frame request along with pending and in-flight narration
    fn teardown(&mut self) {
        self.frame_requested = false;
        let dropped = self.narration.cancel_all();
        if dropped > 0 {
            debug!("Cancelled {} pending narration lines", dropped);
        }
        self.narrator.cancel();
    }

    fn schedule_narration(&mut self, index: usize, now: Instant) {
        self.narration.cancel_all();
        self.timeline.last_spoken = Some(index);

        let Some(cue) = self.cues.get(index) else {
            return;
        };
        let count = cue.lines.len();
        if count == 0 {
            return;
        }

        let slot = cue.duration().as_secs_f64() / count as f64;
        let lead = self.config.narration_lead().as_secs_f64();
        for line in 0..count {
            let offset = (line as f64 * slot - lead).max(0.0);
            let due = now + Duration::from_secs_f64(offset);
            self.narration.schedule(due, NarrationJob { cue: index, line });
        }
        debug!("Scheduled {} narration lines for cue {}", count, index);
    }

    fn fire_due_narration(&mut self, now: Instant) {
        for job in self.narration.take_due(now) {
            let Some(text) = self.cues.get(job.cue).and_then(|c| c.lines.get(job.line)) else {
                continue;
            };
            let utterance = Utterance::new(text)
                .with_rate(self.config.rate_for(job.line))
                .with_pitch(self.config.pitch_for(job.line))
                .with_volume(self.config.volume);
            self.narrator.speak(utterance);
        }
    }
}
