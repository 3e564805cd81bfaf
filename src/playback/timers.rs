use std::time::Instant;

#[derive(Debug)]
struct Timer<T> {
    /// Schedule order, breaks ties between equal deadlines
    seq: u64,
    due: Instant,
    job: T,
}

/// Deferred jobs keyed by due instant
///
/// Nothing fires on its own; the owner drains due jobs with [`TimerQueue::take_due`]
/// from its frame loop.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_seq: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_seq: 0,
            timers: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due: Instant, job: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer { seq, due, job });
    }

    /// Cancel everything; returns how many jobs were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.timers.len();
        self.timers.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Remove and return every job due at or before `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let (mut due, pending): (Vec<Timer<T>>, Vec<Timer<T>>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.job).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_take_due_orders_by_deadline_then_schedule_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(t0 + Duration::from_millis(20), "late");
        queue.schedule(t0, "first");
        queue.schedule(t0, "second");
        queue.schedule(t0 + Duration::from_millis(500), "pending");

        assert_eq!(queue.take_due(t0 + Duration::from_millis(20)), vec!["first", "second", "late"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_all() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule(t0, 1);
        queue.schedule(t0 + Duration::from_millis(10), 2);

        assert_eq!(queue.cancel_all(), 2);
        assert!(queue.is_empty());
        assert!(queue.take_due(t0).is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
