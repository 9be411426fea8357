//! Input Context - the explicitly constructed owner of all input state
//!
//! One `InputContext` is created at application start and handed to every
//! consumer. It owns the broadcast bus, the focus stack, the input type
//! tracker, the key normalizer and the gamepad poller, and applies the
//! window-focus gate in front of the bus.
//!
//! Clones share the same state.
//!
//! # API
//!
//! - `subscribe(fn)` - Raw broadcast tap, returns cleanup
//! - `claim_input_focus(id)` - Push a focus claim, returns a token
//! - `subscribe_to_input_type(fn)` / `latest_input_type()` - Device family
//! - `gamepad_count()` / `gamepad_count_signal()` - Connected pads
//! - `process_input(event, type)` - Gate and publish one event
//! - `handle_key_event(event)` - Keyboard path
//! - `process_gamepad_frame(pads, now)` - Gamepad path, one frame
//! - `shutdown()` - Tear everything down
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::InputContext;
//!
//! let ctx = InputContext::new(InputConfig::load());
//! let token = ctx.claim_input_focus("LibraryContainer");
//! let cleanup = ctx.subscribe(|envelope| println!("{:?}", envelope.button()));
//!
//! ctx.handle_key_event(&KeyboardEvent::new("ArrowDown"));
//!
//! cleanup();
//! token.release();
//! ctx.shutdown();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info};
use spark_signals::{signal, Signal};

use crate::config::InputConfig;
use crate::pipeline::frame::FrameLoop;
use crate::types::{Button, InputEnvelope, InputEvent, InputType};

use super::bus::BroadcastBus;
use super::focus::{FocusStack, FocusToken};
use super::gamepad::{GamepadPoller, PadSnapshot};
use super::input_type::InputTypeTracker;
use super::keyboard::{KeyNormalizer, KeyOutcome, KeyboardEvent};

struct ContextInner {
    config: InputConfig,
    bus: BroadcastBus,
    focus: FocusStack,
    input_type: InputTypeTracker,
    keys: RefCell<KeyNormalizer>,
    poller: RefCell<GamepadPoller>,
    frames: FrameLoop,
    window_focused: Cell<bool>,
    gamepad_count: Signal<usize>,
}

/// Shared input state. Cheap to clone.
#[derive(Clone)]
pub struct InputContext {
    inner: Rc<ContextInner>,
}

impl InputContext {
    pub fn new(config: InputConfig) -> Self {
        let keys = KeyNormalizer::new(&config.keyboard);
        let poller = GamepadPoller::new(config.gamepad.clone());
        Self {
            inner: Rc::new(ContextInner {
                config,
                bus: BroadcastBus::new(),
                focus: FocusStack::new(),
                input_type: InputTypeTracker::new(),
                keys: RefCell::new(keys),
                poller: RefCell::new(poller),
                frames: FrameLoop::default(),
                window_focused: Cell::new(true),
                gamepad_count: signal(0),
            }),
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.inner.config
    }

    pub fn bus(&self) -> &BroadcastBus {
        &self.inner.bus
    }

    pub fn focus_stack(&self) -> &FocusStack {
        &self.inner.focus
    }

    pub fn frames(&self) -> &FrameLoop {
        &self.inner.frames
    }

    // =========================================================================
    // Exposed surface
    // =========================================================================

    /// Raw broadcast tap. Returns cleanup function.
    pub fn subscribe<F>(&self, callback: F) -> impl FnOnce() + 'static + use<F>
    where
        F: Fn(&mut InputEnvelope) + 'static,
    {
        self.inner.bus.subscribe(callback)
    }

    pub fn claim_input_focus(&self, claimant_id: impl Into<String>) -> FocusToken {
        self.inner.focus.claim(claimant_id)
    }

    /// Listen for device family changes. Returns cleanup function.
    pub fn subscribe_to_input_type<F>(&self, callback: F) -> impl FnOnce() + 'static
    where
        F: Fn(InputType) + 'static,
    {
        self.inner.input_type.subscribe(callback)
    }

    pub fn latest_input_type(&self) -> InputType {
        self.inner.input_type.latest()
    }

    pub fn input_type_signal(&self) -> Signal<InputType> {
        self.inner.input_type.signal()
    }

    pub fn gamepad_count(&self) -> usize {
        self.inner.gamepad_count.get()
    }

    pub fn gamepad_count_signal(&self) -> Signal<usize> {
        self.inner.gamepad_count.clone()
    }

    /// Record the connected pad count.
    ///
    /// The per-frame poll is armed when the first pad appears and cancelled
    /// when the last one goes away.
    pub fn set_gamepad_count(&self, count: usize) {
        self.inner.gamepad_count.set(count);
        if count > 0 {
            if self.inner.frames.arm() {
                info!("Gamepad polling started.");
            }
        } else if self.inner.frames.cancel() {
            info!("Gamepad polling stopped.");
            self.inner.poller.borrow_mut().reset();
        }
    }

    /// Whether the per-frame gamepad poll is currently scheduled.
    pub fn is_polling(&self) -> bool {
        self.inner.frames.is_armed()
    }

    pub fn window_focused(&self) -> bool {
        self.inner.window_focused.get()
    }

    pub fn set_window_focused(&self, focused: bool) {
        if self.inner.window_focused.replace(focused) != focused {
            debug!("window focus: {}", focused);
        }
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    /// Publish straight to the bus, bypassing the window-focus gate.
    pub fn publish(&self, event: Option<InputEvent>) -> InputEnvelope {
        self.inner.bus.publish(event)
    }

    /// Record `input_type` (if given), then publish `event` if the gate
    /// allows it: the window has focus, or the event is the empty sentinel,
    /// or the button is SUPER. Returns whether it was broadcast.
    /// After `shutdown()` nothing is broadcast.
    pub fn process_input(
        &self,
        event: Option<InputEvent>,
        input_type: Option<InputType>,
    ) -> bool {
        if let Some(input_type) = input_type {
            self.inner.input_type.set(input_type);
        }

        let allowed = self.window_focused()
            || event.is_none_or(|e| e.button == Button::Super);
        if !allowed || self.inner.bus.is_closed() {
            return false;
        }
        self.inner.bus.publish(event);
        true
    }

    /// Keyboard path: normalize and publish one host key event.
    /// Returns whether anything was broadcast.
    pub fn handle_key_event(&self, event: &KeyboardEvent) -> bool {
        let outcome = self.inner.keys.borrow_mut().normalize(event, Instant::now());
        match outcome {
            KeyOutcome::Publish(Some(input)) => {
                self.process_input(Some(input), Some(InputType::Keyboard))
            }
            KeyOutcome::Publish(None) => self.process_input(None, None),
            KeyOutcome::Ignored => false,
        }
    }

    /// Gamepad path: run one poll over `pads` and publish what fired.
    /// Returns the number of events broadcast.
    pub fn process_gamepad_frame(&self, pads: &[PadSnapshot], now: Instant) -> usize {
        let frame = {
            let prior = self.latest_input_type();
            self.inner.poller.borrow_mut().poll(pads, now, prior)
        };

        let mut sent = 0;
        for event in frame.fired {
            if self.process_input(Some(event), Some(frame.input_type)) {
                sent += 1;
            }
        }
        sent
    }

    /// Tear down: cancel polling, drop every subscriber and claim, and make
    /// later publishes no-ops.
    pub fn shutdown(&self) {
        if self.inner.frames.cancel() {
            info!("Gamepad polling stopped.");
        }
        self.inner.bus.close();
        self.inner.focus.clear();
        self.inner.input_type.clear_listeners();
        debug!("input context shut down");
    }
}

impl Default for InputContext {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
