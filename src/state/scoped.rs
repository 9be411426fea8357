//! Scoped Input - per-UI-scope focus claim plus event handler
//!
//! A `ScopedInput` binds a handler to a focus claim:
//! - while active it holds exactly one live claim for its focus id
//! - it handles an event only if the event is unconsumed, the scope is
//!   active, and its claim is the top of the focus stack
//! - it consumes the event before invoking the handler
//! - dropping it (or deactivating) releases the claim on every exit path
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::{InputContext, ScopedInput};
//!
//! let ctx = InputContext::default();
//! let library = ScopedInput::new(&ctx, "LibraryContainer", true, |event| {
//!     println!("library got {}", event.button);
//! });
//!
//! {
//!     // Menu shadows the library while it exists
//!     let _menu = ScopedInput::new(&ctx, "SystemMenu", true, |_| {});
//! }
//! // Menu dropped: library is on top again
//! assert!(library.has_focus());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::warn;

use crate::types::{InputEnvelope, InputEvent};

use super::context::InputContext;
use super::focus::FocusToken;

/// Scoped handler. Invoked at most once per event.
pub type ScopedHandler = Box<dyn FnMut(&InputEvent)>;

struct ScopeState {
    focus_id: String,
    active: Cell<bool>,
    token: RefCell<Option<FocusToken>>,
    handler: RefCell<ScopedHandler>,
}

impl ScopeState {
    fn has_focus(&self) -> bool {
        self.token
            .borrow()
            .as_ref()
            .is_some_and(FocusToken::is_acquired)
    }

    fn release_claim(&self) {
        if let Some(token) = self.token.borrow_mut().take() {
            token.release();
        }
    }

    fn handle(&self, envelope: &mut InputEnvelope) {
        if envelope.is_consumed() || !self.active.get() || !self.has_focus() {
            return;
        }
        // The key-released sentinel carries nothing to handle
        let Some(event) = envelope.event().copied() else {
            return;
        };

        envelope.consume();
        match self.handler.try_borrow_mut() {
            Ok(mut handler) => handler(&event),
            Err(_) => warn!(
                "{}: handler re-entered while handling {}; dropped",
                self.focus_id, event.button
            ),
        }
    }
}

/// Focus-gated subscriber for one UI scope.
pub struct ScopedInput {
    ctx: InputContext,
    state: Rc<ScopeState>,
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl ScopedInput {
    /// Subscribe `handler` for `focus_id`, claiming focus if `is_active`.
    pub fn new<F>(
        ctx: &InputContext,
        focus_id: impl Into<String>,
        is_active: bool,
        handler: F,
    ) -> Self
    where
        F: FnMut(&InputEvent) + 'static,
    {
        let state = Rc::new(ScopeState {
            focus_id: focus_id.into(),
            active: Cell::new(false),
            token: RefCell::new(None),
            handler: RefCell::new(Box::new(handler)),
        });

        let weak: Weak<ScopeState> = Rc::downgrade(&state);
        let unsubscribe = ctx.subscribe(move |envelope| {
            if let Some(state) = weak.upgrade() {
                state.handle(envelope);
            }
        });

        let scoped = Self {
            ctx: ctx.clone(),
            state,
            unsubscribe: Some(Box::new(unsubscribe)),
        };
        scoped.set_active(is_active);
        scoped
    }

    /// Activate (claims focus on top of the stack) or deactivate (releases).
    /// Setting the current value again is a no-op.
    pub fn set_active(&self, active: bool) {
        if self.state.active.get() == active {
            return;
        }
        self.state.active.set(active);
        if active {
            let token = self.ctx.claim_input_focus(self.state.focus_id.clone());
            *self.state.token.borrow_mut() = Some(token);
        } else {
            self.state.release_claim();
        }
    }

    /// Replace the handler. Takes effect from the next event.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: FnMut(&InputEvent) + 'static,
    {
        match self.state.handler.try_borrow_mut() {
            Ok(mut slot) => *slot = Box::new(handler),
            Err(_) => warn!(
                "{}: handler replaced from inside itself; keeping the old one",
                self.state.focus_id
            ),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Whether this scope's claim is currently the top of the stack.
    pub fn has_focus(&self) -> bool {
        self.state.has_focus()
    }

    pub fn focus_id(&self) -> &str {
        &self.state.focus_id
    }

    /// Tear down explicitly. Same as dropping.
    pub fn release(self) {}
}

impl Drop for ScopedInput {
    fn drop(&mut self) {
        self.state.active.set(false);
        self.state.release_claim();
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Button;

    fn setup() -> InputContext {
        InputContext::default()
    }

    fn recorder() -> (Rc<RefCell<Vec<Button>>>, impl FnMut(&InputEvent) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        (log, move |event: &InputEvent| log_clone.borrow_mut().push(event.button))
    }

    #[test]
    fn test_active_scope_claims_focus() {
        let ctx = setup();
        let scope = ScopedInput::new(&ctx, "Library", true, |_| {});
        assert!(scope.has_focus());
        assert_eq!(ctx.focus_stack().len(), 1);
    }

    #[test]
    fn test_inactive_scope_holds_no_claim() {
        let ctx = setup();
        let (log, handler) = recorder();
        let scope = ScopedInput::new(&ctx, "Dialog", false, handler);
        assert!(!scope.has_focus());
        assert!(ctx.focus_stack().is_empty());

        ctx.publish(Some(InputEvent::key(Button::A)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_top_scope_consumes() {
        let ctx = setup();
        let (lib_log, lib_handler) = recorder();
        let (menu_log, menu_handler) = recorder();

        let _library = ScopedInput::new(&ctx, "Library", true, lib_handler);
        let menu = ScopedInput::new(&ctx, "Menu", true, menu_handler);

        let envelope = ctx.publish(Some(InputEvent::key(Button::Down)));
        assert!(envelope.is_consumed());
        assert_eq!(*menu_log.borrow(), vec![Button::Down]);
        assert!(lib_log.borrow().is_empty());

        drop(menu);
        ctx.publish(Some(InputEvent::key(Button::Up)));
        assert_eq!(*lib_log.borrow(), vec![Button::Up]);
    }

    #[test]
    fn test_deactivate_and_reactivate() {
        let ctx = setup();
        let (log, handler) = recorder();
        let _library = ScopedInput::new(&ctx, "Library", true, |_| {});
        let panel = ScopedInput::new(&ctx, "Volume", true, handler);

        panel.set_active(false);
        assert_eq!(ctx.focus_stack().len(), 1);
        ctx.publish(Some(InputEvent::key(Button::Left)));
        assert!(log.borrow().is_empty());

        panel.set_active(true);
        assert!(panel.has_focus());
        ctx.publish(Some(InputEvent::key(Button::Right)));
        assert_eq!(*log.borrow(), vec![Button::Right]);
    }

    #[test]
    fn test_sentinel_not_handled_or_consumed() {
        let ctx = setup();
        let (log, handler) = recorder();
        let _scope = ScopedInput::new(&ctx, "Library", true, handler);

        let envelope = ctx.publish(None);
        assert!(!envelope.is_consumed());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_panicking_handler_still_releases_claim() {
        let ctx = setup();
        let scope = ScopedInput::new(&ctx, "Broken", true, |_| panic!("handler failure"));

        let envelope = ctx.publish(Some(InputEvent::key(Button::A)));
        assert!(envelope.is_consumed());

        // Handler borrow was released during unwind; scope still usable
        scope.set_handler(|_| {});
        drop(scope);
        assert!(ctx.focus_stack().is_empty());
        assert_eq!(ctx.bus().subscriber_count(), 0);
    }

    #[test]
    fn test_set_handler_replaces() {
        let ctx = setup();
        let (first, first_handler) = recorder();
        let (second, second_handler) = recorder();
        let scope = ScopedInput::new(&ctx, "Library", true, first_handler);

        scope.set_handler(second_handler);
        ctx.publish(Some(InputEvent::key(Button::B)));
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![Button::B]);
    }

    #[test]
    fn test_release_is_drop() {
        let ctx = setup();
        let scope = ScopedInput::new(&ctx, "Library", true, |_| {});
        scope.release();
        assert!(ctx.focus_stack().is_empty());
    }
}
