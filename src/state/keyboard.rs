//! Keyboard Module - Key event types and key-to-button normalization
//!
//! Does NOT own stdin (that is the input module).
//! Does NOT publish anything itself (that is the context).
//!
//! # API
//!
//! - `KeyboardEvent` - Host key event (name, modifiers, press/repeat/release)
//! - `KeyNormalizer::map_key(name)` - Canonical button for a key name
//! - `KeyNormalizer::normalize(event, now)` - What to publish for an event
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::keyboard::{KeyNormalizer, KeyOutcome, KeyboardEvent};
//!
//! let mut normalizer = KeyNormalizer::default();
//! match normalizer.normalize(&KeyboardEvent::new("ArrowUp"), Instant::now()) {
//!     KeyOutcome::Publish(Some(event)) => println!("{}", event.button),
//!     KeyOutcome::Publish(None) => println!("released"),
//!     KeyOutcome::Ignored => {}
//! }
//! ```

use std::time::{Duration, Instant};

use log::trace;

use crate::config::KeyboardConfig;
use crate::types::{Button, InputEvent, SourceKind};

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key name (e.g., "a", "Enter", "ArrowUp")
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Same key, different state
    pub fn with_state(mut self, state: KeyState) -> Self {
        self.state = state;
        self
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }
}

/// What the keyboard path should publish for one host event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Publish this envelope payload. `None` is the key-released sentinel.
    Publish(Option<InputEvent>),
    /// Unmapped key or OS auto-repeat. Nothing is published.
    Ignored,
}

// =============================================================================
// NORMALIZER
// =============================================================================

/// Maps key names to canonical buttons and filters OS key-repeat.
///
/// Lookup is ASCII case-insensitive, so "A" and "a" hit the same binding.
/// The first binding for a name wins.
///
/// Terminals without key event-type reporting send a held key as a stream
/// of plain presses and never send a release. A press of the key already
/// held, arriving within `repeat_gap` of the previous one, is treated as
/// repeat. A release (or a different key) ends the hold.
#[derive(Clone, Debug)]
pub struct KeyNormalizer {
    bindings: Vec<(String, Button)>,
    repeat_gap: Duration,
    held: Option<(Button, Instant)>,
}

impl KeyNormalizer {
    pub fn new(config: &KeyboardConfig) -> Self {
        Self {
            bindings: config
                .bindings
                .iter()
                .map(|b| (b.key.clone(), b.button))
                .collect(),
            repeat_gap: config.repeat_gap(),
            held: None,
        }
    }

    /// Canonical button for `key`, or `None` if unmapped.
    pub fn map_key(&self, key: &str) -> Option<Button> {
        if key.is_empty() {
            return None;
        }
        self.bindings
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, button)| *button)
    }

    /// Button currently considered held, if any.
    pub fn held(&self) -> Option<Button> {
        self.held.map(|(button, _)| button)
    }

    /// Decide what to publish for `event`.
    ///
    /// Only the initial press edge becomes an event; OS key-repeat is dropped
    /// so repeat timing stays with the consumer. Releasing a mapped key yields
    /// the empty sentinel. Ctrl and Alt chords are left to the host (quit keys,
    /// terminal shortcuts) and never map to buttons.
    pub fn normalize(&mut self, event: &KeyboardEvent, now: Instant) -> KeyOutcome {
        let Some(button) = self.map_key(&event.key) else {
            trace!("unmapped key: {:?}", event.key);
            return KeyOutcome::Ignored;
        };

        match event.state {
            KeyState::Release => {
                if self.held() == Some(button) {
                    self.held = None;
                }
                KeyOutcome::Publish(None)
            }
            _ if event.modifiers.ctrl || event.modifiers.alt => {
                trace!("modified key ignored: {:?}", event.key);
                KeyOutcome::Ignored
            }
            KeyState::Repeat => {
                self.held = Some((button, now));
                KeyOutcome::Ignored
            }
            KeyState::Press => {
                let repeating = self.held.is_some_and(|(held, last)| {
                    held == button && now.saturating_duration_since(last) < self.repeat_gap
                });
                self.held = Some((button, now));
                if repeating {
                    trace!("repeated press of held {} ignored", button);
                    return KeyOutcome::Ignored;
                }
                KeyOutcome::Publish(Some(InputEvent::new(SourceKind::Key, button, now)))
            }
        }
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self::new(&KeyboardConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
