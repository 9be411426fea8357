//! Core types for lutris-input.
//!
//! These types define the foundation that everything builds on.
//! Every physical input is reduced to one of a small set of canonical buttons
//! before it reaches the broadcast bus.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

// =============================================================================
// Button
// =============================================================================

/// Canonical button names. Both keyboard and gamepad input normalize to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    L1,
    R1,
    /// Window visibility toggle. Exempt from window-focus gating.
    Super,
}

impl Button {
    /// Every canonical button, in evaluation order for the gamepad poller.
    pub const ALL: [Button; 11] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::L1,
        Button::R1,
        Button::Super,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::L1 => "L1",
            Button::R1 => "R1",
            Button::Super => "SUPER",
        }
    }

    /// True for the four d-pad directions.
    pub fn is_direction(&self) -> bool {
        matches!(self, Button::Up | Button::Down | Button::Left | Button::Right)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Source / input type
// =============================================================================

/// Which kind of source produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Key,
    Gamepad,
}

/// Physical device family that produced the most recent input.
/// Used for icon selection only, never for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Keyboard,
    Xbox,
    PlayStation,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Keyboard => "keyboard",
            InputType::Xbox => "xbox",
            InputType::PlayStation => "playstation",
        }
    }

    pub fn is_gamepad(&self) -> bool {
        !matches!(self, InputType::Keyboard)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Canonical input event
// =============================================================================

/// A normalized, source-agnostic button activation.
///
/// One physical press edge (or one autorepeat tick) yields exactly one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub source: SourceKind,
    pub button: Button,
    /// Monotonic detection time.
    pub timestamp: Instant,
}

impl InputEvent {
    pub fn new(source: SourceKind, button: Button, timestamp: Instant) -> Self {
        Self {
            source,
            button,
            timestamp,
        }
    }

    /// Keyboard event stamped now.
    pub fn key(button: Button) -> Self {
        Self::new(SourceKind::Key, button, Instant::now())
    }

    /// Gamepad event stamped now.
    pub fn gamepad(button: Button) -> Self {
        Self::new(SourceKind::Gamepad, button, Instant::now())
    }
}

/// Mutable wrapper handed by reference to every subscriber of one publish.
///
/// `event` is `None` for the "no active input" sentinel the keyboard path
/// emits on key release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEnvelope {
    event: Option<InputEvent>,
    consumed: bool,
}

impl InputEnvelope {
    pub fn new(event: Option<InputEvent>) -> Self {
        Self {
            event,
            consumed: false,
        }
    }

    pub fn event(&self) -> Option<&InputEvent> {
        self.event.as_ref()
    }

    pub fn button(&self) -> Option<Button> {
        self.event.map(|e| e.button)
    }

    pub fn is_sentinel(&self) -> bool {
        self.event.is_none()
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Mark the event consumed. Returns true only for the call that flipped
    /// the flag; later calls are no-ops.
    pub fn consume(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        true
    }
}

// =============================================================================
// Physical pad buttons (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Pressed-button set of one pad, indexed by the standard gamepad layout.
    ///
    /// Combine pads with bitwise OR: a button is down if it is down anywhere.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PadButtons: u32 {
        const SOUTH = 1 << 0;
        const EAST = 1 << 1;
        const WEST = 1 << 2;
        const NORTH = 1 << 3;
        const LEFT_BUMPER = 1 << 4;
        const RIGHT_BUMPER = 1 << 5;
        const LEFT_TRIGGER = 1 << 6;
        const RIGHT_TRIGGER = 1 << 7;
        const SELECT = 1 << 8;
        const START = 1 << 9;
        const LEFT_THUMB = 1 << 10;
        const RIGHT_THUMB = 1 << 11;
        const DPAD_UP = 1 << 12;
        const DPAD_DOWN = 1 << 13;
        const DPAD_LEFT = 1 << 14;
        const DPAD_RIGHT = 1 << 15;
        const GUIDE = 1 << 16;
    }
}

impl PadButtons {
    /// Flag for a physical button index. Out-of-range indices yield an empty set.
    pub fn from_index(index: u8) -> Self {
        if index >= 32 {
            return Self::empty();
        }
        Self::from_bits_retain(1 << index)
    }

    /// Whether the button at `index` is pressed.
    pub fn is_index_pressed(&self, index: u8) -> bool {
        let flag = Self::from_index(index);
        !flag.is_empty() && self.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_is_idempotent() {
        let mut envelope = InputEnvelope::new(Some(InputEvent::key(Button::A)));
        assert!(!envelope.is_consumed());
        assert!(envelope.consume());
        assert!(!envelope.consume());
        assert!(envelope.is_consumed());
    }

    #[test]
    fn test_sentinel_envelope() {
        let envelope = InputEnvelope::new(None);
        assert!(envelope.is_sentinel());
        assert_eq!(envelope.button(), None);
    }

    #[test]
    fn test_pad_buttons_index() {
        let pressed = PadButtons::SOUTH | PadButtons::GUIDE;
        assert!(pressed.is_index_pressed(0));
        assert!(pressed.is_index_pressed(16));
        assert!(!pressed.is_index_pressed(1));
        assert!(!pressed.is_index_pressed(40));
        assert_eq!(PadButtons::from_index(12), PadButtons::DPAD_UP);
    }

    #[test]
    fn test_button_names() {
        assert_eq!(Button::Super.to_string(), "SUPER");
        assert_eq!(Button::L1.as_str(), "L1");
        assert!(Button::Left.is_direction());
        assert!(!Button::A.is_direction());
        assert_eq!(InputType::PlayStation.as_str(), "playstation");
    }
}
