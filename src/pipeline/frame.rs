//! Frame Loop - "repeat every frame while a condition holds"
//!
//! A cooperative scheduler primitive, not a thread. While armed, the host
//! loop asks `due(now)` each iteration; it answers true at most once per
//! frame interval. Cancelling is idempotent.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Default frame interval (~60Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug)]
pub struct FrameLoop {
    interval: Duration,
    armed: Cell<bool>,
    next_due: Cell<Option<Instant>>,
}

impl FrameLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: Cell::new(false),
            next_due: Cell::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start repeating. Returns true if the loop was not already armed.
    /// The first frame is due immediately.
    pub fn arm(&self) -> bool {
        if self.armed.replace(true) {
            return false;
        }
        self.next_due.set(None);
        true
    }

    /// Stop repeating. Returns true if the loop was armed.
    pub fn cancel(&self) -> bool {
        let was_armed = self.armed.replace(false);
        self.next_due.set(None);
        was_armed
    }

    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }

    /// Whether a frame should run at `now`. Schedules the next one if so.
    pub fn due(&self, now: Instant) -> bool {
        if !self.armed.get() {
            return false;
        }
        let due = self.next_due.get().is_none_or(|next| now >= next);
        if due {
            self.next_due.set(Some(now + self.interval));
        }
        due
    }

    /// Time until the next frame, if armed. Zero when already due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if !self.armed.get() {
            return None;
        }
        Some(
            self.next_due
                .get()
                .map_or(Duration::ZERO, |next| next.saturating_duration_since(now)),
        )
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (FrameLoop, Instant) {
        (FrameLoop::default(), Instant::now())
    }

    #[test]
    fn test_idle_loop_never_due() {
        let (frames, now) = setup();
        assert!(!frames.due(now));
        assert_eq!(frames.time_until_due(now), None);
    }

    #[test]
    fn test_armed_loop_runs_once_per_interval() {
        let (frames, t0) = setup();
        assert!(frames.arm());
        assert!(frames.due(t0));
        assert!(!frames.due(t0 + Duration::from_millis(5)));
        assert_eq!(
            frames.time_until_due(t0 + Duration::from_millis(6)),
            Some(Duration::from_millis(10))
        );
        assert!(frames.due(t0 + FRAME_INTERVAL));
    }

    #[test]
    fn test_arm_and_cancel_are_idempotent() {
        let (frames, t0) = setup();
        assert!(frames.arm());
        assert!(!frames.arm());

        assert!(frames.cancel());
        assert!(!frames.cancel());
        assert!(!frames.is_armed());
        assert!(!frames.due(t0));
    }
}
