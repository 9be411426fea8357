//! Event Loop - drives host and gamepad input into the context
//!
//! Each tick:
//! 1. Pump the gamepad source and update the pad count (arms/cancels polling)
//! 2. Wait for a host event, at most until the next gamepad frame is due
//! 3. Route the host event (keys, focus gained/lost)
//! 4. Run one gamepad frame if it is due
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::pipeline::{EventLoop, GilrsSource};
//!
//! let mut event_loop = EventLoop::new(ctx.clone(), GilrsSource::new());
//!
//! // Option 1: Run blocking event loop
//! event_loop.run()?;
//!
//! // Option 2: Tick manually in your own loop
//! while event_loop.tick()? {
//!     // Your logic here
//! }
//! ```

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::state::input::{self, HostEvent};
use crate::state::InputContext;

use super::frame::FRAME_INTERVAL;
use super::gamepad_source::GamepadSource;

/// Host poll timeout while no gamepad frame is scheduled.
const IDLE_TIMEOUT: Duration = Duration::from_millis(100);

pub struct EventLoop<S: GamepadSource> {
    ctx: InputContext,
    source: S,
    running: Arc<AtomicBool>,
}

impl<S: GamepadSource> EventLoop<S> {
    pub fn new(ctx: InputContext, source: S) -> Self {
        Self {
            ctx,
            source,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn context(&self) -> &InputContext {
        &self.ctx
    }

    /// Shared running flag. Storing false stops the loop after this tick.
    pub fn running(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop (sets running to false).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Gamepad half of a tick: refresh the pad count and run a frame if due.
    /// Returns the number of events broadcast.
    pub fn step_gamepads(&mut self, now: Instant) -> usize {
        let count = self.source.pump();
        if count != self.ctx.gamepad_count() {
            self.ctx.set_gamepad_count(count);
        }

        if !self.ctx.frames().due(now) {
            return 0;
        }
        let pads = self.source.snapshots();
        self.ctx.process_gamepad_frame(&pads, now)
    }

    /// Host half of a tick: handle one already-read host event.
    /// Ctrl+C and Escape stop the loop instead of being routed. Other
    /// Ctrl/Alt chords are routed but never map to a button.
    pub fn handle_host_event(&self, event: HostEvent) -> bool {
        if let HostEvent::Key(key) = &event {
            let quit = (key.modifiers.ctrl && key.key == "c") || key.key == "Escape";
            if quit && key.is_press() {
                self.stop();
                return false;
            }
        }
        input::route_event(&self.ctx, event)
    }

    /// Run the event loop once.
    ///
    /// Returns `Ok(false)` once the loop should stop.
    pub fn tick(&mut self) -> io::Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }

        self.step_gamepads(Instant::now());

        let timeout = self
            .ctx
            .frames()
            .time_until_due(Instant::now())
            .map_or(IDLE_TIMEOUT, |d| d.min(FRAME_INTERVAL));
        if let Some(event) = input::poll_event(timeout)? {
            self.handle_host_event(event);
        }

        Ok(self.is_running())
    }

    /// Run the event loop (blocking until stopped).
    pub fn run(&mut self) -> io::Result<()> {
        while self.tick()? {
            // Continue processing events
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::{KeyboardEvent, Modifiers};
    use crate::state::PadSnapshot;
    use crate::types::{Button, PadButtons};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeSource {
        pads: Vec<PadSnapshot>,
    }

    impl GamepadSource for FakeSource {
        fn pump(&mut self) -> usize {
            self.pads.len()
        }

        fn snapshots(&self) -> Vec<PadSnapshot> {
            self.pads.clone()
        }
    }

    fn setup() -> (
        EventLoop<FakeSource>,
        Rc<RefCell<Vec<Button>>>,
        impl FnOnce() + 'static,
    ) {
        let ctx = InputContext::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let cleanup = ctx.subscribe(move |envelope| {
            if let Some(button) = envelope.button() {
                seen_clone.borrow_mut().push(button);
            }
        });
        (EventLoop::new(ctx, FakeSource::default()), seen, cleanup)
    }

    #[test]
    fn test_no_pads_no_polling() {
        let (mut event_loop, seen, _cleanup) = setup();
        assert_eq!(event_loop.step_gamepads(Instant::now()), 0);
        assert!(!event_loop.context().is_polling());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_connect_starts_polling_and_fires() {
        let (mut event_loop, seen, _cleanup) = setup();
        let pad = PadSnapshot::new("Xbox").with_buttons(PadButtons::SOUTH);
        event_loop.source.pads.push(pad);

        let t0 = Instant::now();
        assert_eq!(event_loop.step_gamepads(t0), 1);
        assert!(event_loop.context().is_polling());
        assert_eq!(event_loop.context().gamepad_count(), 1);
        assert_eq!(*seen.borrow(), vec![Button::A]);

        // Same frame window: not due again
        assert_eq!(event_loop.step_gamepads(t0 + Duration::from_millis(1)), 0);
    }

    #[test]
    fn test_disconnect_stops_polling() {
        let (mut event_loop, _seen, _cleanup) = setup();
        event_loop.source.pads.push(PadSnapshot::new("Xbox"));
        event_loop.step_gamepads(Instant::now());
        assert!(event_loop.context().is_polling());

        event_loop.source.pads.clear();
        event_loop.step_gamepads(Instant::now());
        assert!(!event_loop.context().is_polling());
        assert_eq!(event_loop.context().gamepad_count(), 0);
    }

    #[test]
    fn test_ctrl_c_and_escape_stop() {
        let (event_loop, seen, _cleanup) = setup();
        let ctrl_c = KeyboardEvent::with_modifiers("c", Modifiers::ctrl());
        assert!(!event_loop.handle_host_event(HostEvent::Key(ctrl_c)));
        assert!(!event_loop.is_running());

        let (event_loop, _, _cleanup) = setup();
        event_loop.handle_host_event(HostEvent::Key(KeyboardEvent::new("Escape")));
        assert!(!event_loop.is_running());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_host_keys_routed() {
        let (event_loop, seen, _cleanup) = setup();
        assert!(event_loop.handle_host_event(HostEvent::Key(KeyboardEvent::new("ArrowDown"))));
        assert!(event_loop.is_running());
        assert_eq!(*seen.borrow(), vec![Button::Down]);
    }

    #[test]
    fn test_other_ctrl_chords_not_broadcast() {
        let (event_loop, seen, _cleanup) = setup();
        let ctrl_a = KeyboardEvent::with_modifiers("a", Modifiers::ctrl());
        assert!(!event_loop.handle_host_event(HostEvent::Key(ctrl_a)));
        assert!(event_loop.is_running());
        assert!(seen.borrow().is_empty());
    }
}
