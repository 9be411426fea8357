//! Autorepeat - per-button fire gating while a button is held
//!
//! A held button fires on its first down sample, then again each time the
//! current sample reaches its next-eligible time. Releasing the button drops
//! its entry so the next press fires with zero delay.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::Button;

/// Button -> next eligible fire time.
#[derive(Debug, Clone)]
pub struct AutorepeatTable {
    interval: Duration,
    held: HashMap<Button, Instant>,
}

impl AutorepeatTable {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            held: HashMap::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed one sample of `button` at `now`. Returns true if it fires.
    ///
    /// A firing refreshes the entry to `now + interval`; a release clears it.
    pub fn sample(&mut self, button: Button, down: bool, now: Instant) -> bool {
        if !down {
            self.held.remove(&button);
            return false;
        }

        let due = match self.held.get(&button) {
            Some(next) => now >= *next,
            None => true,
        };
        if due {
            self.held.insert(button, now + self.interval);
        }
        due
    }

    /// Whether `button` currently has a timer (is being held).
    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains_key(&button)
    }

    pub fn next_fire(&self, button: Button) -> Option<Instant> {
        self.held.get(&button).copied()
    }

    /// Forget every held button, e.g. when all pads disconnect.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
