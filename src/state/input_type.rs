//! Input Type Tracker - which device family produced the latest input
//!
//! Remembers keyboard / xbox / playstation for icon and label rendering.
//! Subscribers are notified only when the type actually changes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::types::InputType;

/// Callback fired with the new input type.
pub type InputTypeListener = Rc<dyn Fn(InputType)>;

struct TrackerInner {
    listeners: RefCell<Vec<(usize, InputTypeListener)>>,
    next_id: Cell<usize>,
    latest: Signal<InputType>,
}

/// Shared tracker. Clones observe the same state.
#[derive(Clone)]
pub struct InputTypeTracker {
    inner: Rc<TrackerInner>,
}

impl InputTypeTracker {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TrackerInner {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                latest: signal(InputType::Keyboard),
            }),
        }
    }

    pub fn latest(&self) -> InputType {
        self.inner.latest.get()
    }

    /// Reactive view of the latest type.
    pub fn signal(&self) -> Signal<InputType> {
        self.inner.latest.clone()
    }

    /// Record the type of the latest input. Returns true if it changed.
    pub fn set(&self, input_type: InputType) -> bool {
        if self.inner.latest.get() == input_type {
            return false;
        }
        self.inner.latest.set(input_type);

        let snapshot: Vec<InputTypeListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in snapshot {
            listener(input_type);
        }
        true
    }

    /// Subscribe to type changes. Returns cleanup function.
    pub fn subscribe<F>(&self, listener: F) -> impl FnOnce() + 'static
    where
        F: Fn(InputType) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<TrackerInner> = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
            }
        }
    }

    pub fn clear_listeners(&self) {
        self.inner.listeners.borrow_mut().clear();
    }
}

impl Default for InputTypeTracker {
    fn default() -> Self {
        Self::new()
    }
}
