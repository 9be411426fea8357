//! Global Keys Module - Focus-independent shortcuts
//!
//! A shortcut list subscribes to the bus once and fires regardless of which
//! scope owns focus. For each unconsumed event the descriptors are scanned in
//! order; the first active one whose key matches consumes the event and runs
//! its action.
//!
//! Used for shortcuts that must work from any screen, such as the overlay
//! toggle (SUPER) and opening the system menu.
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::global_keys::{setup_global_shortcuts, GlobalShortcut};
//!
//! let handle = setup_global_shortcuts(&ctx, vec![
//!     GlobalShortcut::new(Button::Super, || toggle_overlay()),
//!     GlobalShortcut::new(Button::Y, || open_system_menu()).active(false),
//! ]);
//!
//! // Later, when the library screen is shown:
//! handle.set_active(Button::Y, true);
//!
//! // On teardown (or just drop it):
//! handle.cleanup();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;

use crate::types::{Button, InputEnvelope};

use super::context::InputContext;

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// One `{key, action, active}` shortcut.
pub struct GlobalShortcut {
    key: Button,
    active: Cell<bool>,
    action: RefCell<Box<dyn FnMut()>>,
}

impl GlobalShortcut {
    /// Active shortcut for `key`.
    pub fn new<F>(key: Button, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            key,
            active: Cell::new(true),
            action: RefCell::new(Box::new(action)),
        }
    }

    /// Builder-style initial active flag.
    pub fn active(self, active: bool) -> Self {
        self.active.set(active);
        self
    }

    pub fn key(&self) -> Button {
        self.key
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

fn dispatch(shortcuts: &[GlobalShortcut], envelope: &mut InputEnvelope) {
    if envelope.is_consumed() {
        return;
    }
    let Some(button) = envelope.button() else {
        return;
    };
    let Some(shortcut) = shortcuts
        .iter()
        .find(|s| s.active.get() && s.key == button)
    else {
        return;
    };

    envelope.consume();
    match shortcut.action.try_borrow_mut() {
        Ok(mut action) => action(),
        Err(_) => warn!("global shortcut {} re-entered; dropped", button),
    }
}

// =============================================================================
// GLOBAL KEYS HANDLE
// =============================================================================

/// Cleanup handle for a shortcut list. Unsubscribes on drop.
pub struct GlobalKeysHandle {
    shortcuts: Rc<Vec<GlobalShortcut>>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl GlobalKeysHandle {
    /// Toggle every shortcut bound to `key`.
    pub fn set_active(&self, key: Button, active: bool) {
        for shortcut in self.shortcuts.iter().filter(|s| s.key == key) {
            shortcut.active.set(active);
        }
    }

    pub fn is_active(&self, key: Button) -> bool {
        self.shortcuts.iter().any(|s| s.key == key && s.active.get())
    }

    /// Clean up the subscription
    pub fn cleanup(mut self) {
        self.unsubscribe();
    }

    fn unsubscribe(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for GlobalKeysHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// =============================================================================
// SETUP
// =============================================================================

/// Subscribe `shortcuts` to the context's bus.
///
/// Shortcuts only see what was published after they subscribed and only
/// preempt scoped consumers subscribed after them.
pub fn setup_global_shortcuts(
    ctx: &InputContext,
    shortcuts: Vec<GlobalShortcut>,
) -> GlobalKeysHandle {
    let shortcuts = Rc::new(shortcuts);
    let list = shortcuts.clone();
    let cleanup = ctx.subscribe(move |envelope| dispatch(&list, envelope));

    GlobalKeysHandle {
        shortcuts,
        cleanup: Some(Box::new(cleanup)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
