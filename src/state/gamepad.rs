//! Gamepad Poller - per-frame sampling of connected pads
//!
//! Each frame the poller receives a snapshot of every connected pad and turns
//! it into canonical button events:
//!
//! 1. Union pressed buttons across pads (many pads act as one controller)
//! 2. Pick the active pad: first with a pressed button, else first with a
//!    deflected stick. Only used for d-pad emulation and icon family.
//! 3. Map the active pad's stick onto UP/DOWN/LEFT/RIGHT
//! 4. Resolve each canonical button through the configured index map
//! 5. SUPER: dedicated index, or the fallback chord on pads without one
//! 6. Gate everything through the autorepeat table
//! 7. Classify the device family, falling back to the previous one
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::gamepad::{GamepadPoller, PadSnapshot};
//!
//! let mut poller = GamepadPoller::new(GamepadConfig::default());
//! let pad = PadSnapshot::new("Xbox Wireless Controller").with_axes([0.0, -0.8, 0.0, 0.0]);
//! let frame = poller.poll(&[pad], Instant::now(), InputType::Keyboard);
//! assert_eq!(frame.fired[0].button, Button::Up);
//! ```

use std::time::Instant;

use crate::config::{GamepadConfig, StickSource};
use crate::types::{Button, InputEvent, InputType, PadButtons, SourceKind};

use super::autorepeat::AutorepeatTable;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One pad's state at sampling time.
#[derive(Debug, Clone, PartialEq)]
pub struct PadSnapshot {
    /// Device identifier string (name / vendor description).
    pub id: String,
    pub buttons: PadButtons,
    /// Left X, left Y, right X, right Y in [-1, 1]. Negative Y is up.
    pub axes: [f32; 4],
    /// Whether the device exposes a dedicated SUPER (guide/home) button.
    pub has_dedicated_super: bool,
}

impl PadSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buttons: PadButtons::empty(),
            axes: [0.0; 4],
            has_dedicated_super: true,
        }
    }

    pub fn with_buttons(mut self, buttons: PadButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_axes(mut self, axes: [f32; 4]) -> Self {
        self.axes = axes;
        self
    }

    pub fn without_dedicated_super(mut self) -> Self {
        self.has_dedicated_super = false;
        self
    }

    /// Device family from the id string, if recognizable.
    pub fn family(&self) -> Option<InputType> {
        let id = self.id.to_lowercase();
        if id.is_empty() {
            return None;
        }
        if id.contains("playstation") || id.contains("dualsense") || id.contains("dualshock") {
            return Some(InputType::PlayStation);
        }
        if id.contains("xbox") {
            return Some(InputType::Xbox);
        }
        None
    }
}

// =============================================================================
// STICK -> D-PAD
// =============================================================================

/// Direction synthesized from a stick position.
///
/// Vertical wins when |y| > threshold and |y| >= |x| (so exact ties go
/// vertical); horizontal needs |x| > threshold and |x| > |y|.
pub fn stick_direction(x: f32, y: f32, threshold: f32) -> Option<Button> {
    if y.abs() > threshold && y.abs() >= x.abs() {
        Some(if y < 0.0 { Button::Up } else { Button::Down })
    } else if x.abs() > threshold && x.abs() > y.abs() {
        Some(if x < 0.0 { Button::Left } else { Button::Right })
    } else {
        None
    }
}

/// Stick position used for d-pad emulation.
fn stick_axes(pad: &PadSnapshot, source: StickSource) -> (f32, f32) {
    let [lx, ly, rx, ry] = pad.axes;
    match source {
        StickSource::Left => (lx, ly),
        StickSource::Both => {
            let x = if rx.abs() > lx.abs() { rx } else { lx };
            let y = if ry.abs() > ly.abs() { ry } else { ly };
            (x, y)
        }
    }
}

fn stick_deflected(pad: &PadSnapshot, source: StickSource, threshold: f32) -> bool {
    let axes: &[f32] = match source {
        StickSource::Left => &pad.axes[..2],
        StickSource::Both => &pad.axes,
    };
    axes.iter().any(|a| a.abs() > threshold)
}

// =============================================================================
// POLLER
// =============================================================================

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PadFrame {
    /// Newly fired events, in canonical button order.
    pub fired: Vec<InputEvent>,
    /// Family to report for this frame's input.
    pub input_type: InputType,
}

/// Per-frame gamepad state machine. Owns the autorepeat table.
#[derive(Debug, Clone)]
pub struct GamepadPoller {
    config: GamepadConfig,
    autorepeat: AutorepeatTable,
    super_was_down: bool,
}

impl GamepadPoller {
    pub fn new(config: GamepadConfig) -> Self {
        let autorepeat = AutorepeatTable::new(config.autorepeat_interval());
        Self {
            config,
            autorepeat,
            super_was_down: false,
        }
    }

    pub fn config(&self) -> &GamepadConfig {
        &self.config
    }

    /// Sample all `pads` at `now`.
    ///
    /// `prior` is the last known input type, used when the active pad's id
    /// names no known family.
    pub fn poll(&mut self, pads: &[PadSnapshot], now: Instant, prior: InputType) -> PadFrame {
        let threshold = self.config.analog_threshold;
        let stick = self.config.stick;

        let pressed = pads
            .iter()
            .fold(PadButtons::empty(), |acc, pad| acc | pad.buttons);

        let active = pads
            .iter()
            .find(|pad| !pad.buttons.is_empty())
            .or_else(|| pads.iter().find(|pad| stick_deflected(pad, stick, threshold)));

        let synthesized = active.and_then(|pad| {
            let (x, y) = stick_axes(pad, stick);
            stick_direction(x, y, threshold)
        });

        let mut fired = Vec::new();
        for button in Button::ALL {
            if button == Button::Super {
                if self.sample_super(pads) {
                    fired.push(InputEvent::new(SourceKind::Gamepad, Button::Super, now));
                }
                continue;
            }

            let down = synthesized == Some(button) || self.mapped_down(button, pressed);
            if self.autorepeat.sample(button, down, now) {
                fired.push(InputEvent::new(SourceKind::Gamepad, button, now));
            }
        }

        let input_type = active
            .and_then(PadSnapshot::family)
            .unwrap_or(match prior {
                InputType::Keyboard => InputType::Xbox,
                other => other,
            });

        PadFrame { fired, input_type }
    }

    /// Drop held-button state, e.g. when the last pad disconnects.
    pub fn reset(&mut self) {
        self.autorepeat.clear();
        self.super_was_down = false;
    }

    fn mapped_down(&self, button: Button, pressed: PadButtons) -> bool {
        self.config
            .buttons
            .iter()
            .any(|b| b.button == button && pressed.is_index_pressed(b.index))
    }

    // SUPER toggles window visibility, so it fires once per press edge and
    // does not autorepeat.
    fn sample_super(&mut self, pads: &[PadSnapshot]) -> bool {
        let super_index = self.config.super_button;
        let chord = &self.config.super_chord;

        let down = pads.iter().any(|pad| {
            if pad.has_dedicated_super {
                pad.buttons.is_index_pressed(super_index)
            } else {
                chord.iter().all(|&i| pad.buttons.is_index_pressed(i))
            }
        });

        let edge = down && !self.super_was_down;
        self.super_was_down = down;
        edge
    }
}

// =============================================================================
// TESTS
// =============================================================================
