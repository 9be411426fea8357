//! Gamepad Source - where per-frame pad snapshots come from
//!
//! `GamepadSource` is the seam between the poller and the device layer.
//! `GilrsSource` reads real devices through gilrs and reports them in the
//! standard-gamepad index layout; if gilrs cannot start, it reports no pads
//! and the app runs keyboard-only.

use gilrs::{Axis, Button as PadButton, EventType, Gamepad, Gilrs};
use log::{debug, warn};

use crate::error::{InputError, Result};
use crate::state::PadSnapshot;
use crate::types::PadButtons;

/// Device layer used by the event loop.
pub trait GamepadSource {
    /// Drain pending device events. Returns the connected pad count.
    fn pump(&mut self) -> usize;

    /// Current state of every connected pad.
    fn snapshots(&self) -> Vec<PadSnapshot>;
}

/// Physical gilrs button -> standard-gamepad flag.
const BUTTON_LAYOUT: [(PadButton, PadButtons); 17] = [
    (PadButton::South, PadButtons::SOUTH),
    (PadButton::East, PadButtons::EAST),
    (PadButton::West, PadButtons::WEST),
    (PadButton::North, PadButtons::NORTH),
    (PadButton::LeftTrigger, PadButtons::LEFT_BUMPER),
    (PadButton::RightTrigger, PadButtons::RIGHT_BUMPER),
    (PadButton::LeftTrigger2, PadButtons::LEFT_TRIGGER),
    (PadButton::RightTrigger2, PadButtons::RIGHT_TRIGGER),
    (PadButton::Select, PadButtons::SELECT),
    (PadButton::Start, PadButtons::START),
    (PadButton::LeftThumb, PadButtons::LEFT_THUMB),
    (PadButton::RightThumb, PadButtons::RIGHT_THUMB),
    (PadButton::DPadUp, PadButtons::DPAD_UP),
    (PadButton::DPadDown, PadButtons::DPAD_DOWN),
    (PadButton::DPadLeft, PadButtons::DPAD_LEFT),
    (PadButton::DPadRight, PadButtons::DPAD_RIGHT),
    (PadButton::Mode, PadButtons::GUIDE),
];

/// gilrs-backed source.
pub struct GilrsSource {
    gilrs: Option<Gilrs>,
}

impl GilrsSource {
    /// Initialize gilrs, failing if the platform backend cannot start.
    pub fn try_new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| InputError::Gamepad(e.to_string()))?;
        Ok(Self { gilrs: Some(gilrs) })
    }

    /// Initialize gilrs. Failure is logged and leaves a source with no pads.
    pub fn new() -> Self {
        Self::try_new().unwrap_or_else(|e| {
            warn!("Failed to initialize gamepad support: {}", e);
            Self::unavailable()
        })
    }

    /// Source that never reports a pad.
    pub fn unavailable() -> Self {
        Self { gilrs: None }
    }

    pub fn is_available(&self) -> bool {
        self.gilrs.is_some()
    }
}

impl Default for GilrsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadSource for GilrsSource {
    fn pump(&mut self) -> usize {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return 0;
        };

        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    debug!("Gamepad connected: {}", gilrs.gamepad(event.id).name());
                }
                EventType::Disconnected => {
                    debug!("Gamepad disconnected: {:?}", event.id);
                }
                _ => {}
            }
        }

        gilrs.gamepads().count()
    }

    fn snapshots(&self) -> Vec<PadSnapshot> {
        let Some(gilrs) = self.gilrs.as_ref() else {
            return Vec::new();
        };
        gilrs.gamepads().map(|(_, pad)| snapshot(&pad)).collect()
    }
}

fn snapshot(pad: &Gamepad<'_>) -> PadSnapshot {
    let buttons = BUTTON_LAYOUT
        .iter()
        .filter(|(button, _)| pad.is_pressed(*button))
        .fold(PadButtons::empty(), |acc, (_, flag)| acc | *flag);

    let mut snapshot = PadSnapshot::new(pad.name())
        .with_buttons(buttons)
        .with_axes(standard_axes(
            pad.value(Axis::LeftStickX),
            pad.value(Axis::LeftStickY),
            pad.value(Axis::RightStickX),
            pad.value(Axis::RightStickY),
        ));
    if pad.button_code(PadButton::Mode).is_none() {
        snapshot = snapshot.without_dedicated_super();
    }
    snapshot
}

/// gilrs reports Y positive-up; snapshots use negative-up.
fn standard_axes(lx: f32, ly: f32, rx: f32, ry: f32) -> [f32; 4] {
    [lx, -ly, rx, -ry]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_standard_indices() {
        let all = BUTTON_LAYOUT
            .iter()
            .fold(PadButtons::empty(), |acc, (_, flag)| acc | *flag);
        for index in 0..=16 {
            assert!(all.is_index_pressed(index), "index {} unmapped", index);
        }
    }

    #[test]
    fn test_unavailable_source_reports_nothing() {
        let mut source = GilrsSource::unavailable();
        assert!(!source.is_available());
        assert_eq!(source.pump(), 0);
        assert!(source.snapshots().is_empty());
    }

    #[test]
    fn test_gamepad_error_message() {
        let err = InputError::Gamepad("no udev".to_string());
        assert_eq!(err.to_string(), "gamepad backend unavailable: no udev");
    }

    #[test]
    fn test_y_axes_are_flipped() {
        assert_eq!(standard_axes(0.1, 0.8, -0.2, -0.6), [0.1, -0.8, -0.2, 0.6]);
    }
}
