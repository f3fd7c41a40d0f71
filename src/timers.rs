use crate::state::events::Timer;
use std::time::{Duration, Instant};

/// Deadline queue for controller timers. Nothing fires by itself: the owner
/// asks for the expired entries whenever it gets a chance to run.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    /// Pending timers with their deadlines, in scheduling order
    pending: Vec<(Instant, Timer)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `timer` to expire `after` from now
    pub fn schedule(&mut self, timer: Timer, after: Duration) {
        self.schedule_at(timer, Instant::now() + after);
    }

    pub fn schedule_at(&mut self, timer: Timer, deadline: Instant) {
        self.pending.push((deadline, timer));
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<Timer> {
        let mut due: Vec<(Instant, Timer)> = Vec::new();
        self.pending.retain(|(deadline, timer)| {
            if *deadline <= now {
                due.push((*deadline, *timer));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, timer)| timer).collect()
    }

    /// Time left until the earliest pending timer expires.
    /// Returns None if nothing is pending.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
            .min()
    }

    /// Drop every pending log poll
    pub fn cancel_log_polls(&mut self) {
        self.pending.retain(|(_, timer)| !timer.is_log_poll());
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
