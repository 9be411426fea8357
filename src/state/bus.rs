//! Broadcast Bus - the single publish point for normalized input
//!
//! Every canonical event is wrapped in an [`InputEnvelope`] and handed, by
//! mutable reference, to each subscriber in subscription order. The first
//! subscriber to call `consume()` wins; later subscribers see the flag.
//!
//! # API
//!
//! - `subscribe(fn)` - Subscribe to every published envelope, returns cleanup
//! - `publish(event)` - Deliver synchronously to a snapshot of subscribers
//! - `subscriber_count()` - Number of live subscribers
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::BroadcastBus;
//!
//! let bus = BroadcastBus::new();
//! let cleanup = bus.subscribe(|envelope| {
//!     if let Some(button) = envelope.button() {
//!         println!("{}", button);
//!     }
//! });
//! bus.publish(Some(InputEvent::key(Button::A)));
//! cleanup();
//! ```

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::error;

use crate::types::{InputEnvelope, InputEvent};

/// Subscriber callback. Receives the shared envelope of one publish.
pub type Subscriber = Rc<dyn Fn(&mut InputEnvelope)>;

// =============================================================================
// REGISTRY
// =============================================================================

struct BusRegistry {
    subscribers: Vec<(usize, Subscriber)>,
    next_id: usize,
}

impl BusRegistry {
    fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

struct BusInner {
    registry: RefCell<BusRegistry>,
    closed: Cell<bool>,
}

/// Process-wide broadcast point. Cheap to clone; clones share subscribers.
#[derive(Clone)]
pub struct BroadcastBus {
    inner: Rc<BusInner>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                registry: RefCell::new(BusRegistry::new()),
                closed: Cell::new(false),
            }),
        }
    }

    /// Subscribe to all published envelopes.
    /// Returns cleanup function. Calling it twice is harmless.
    pub fn subscribe<F>(&self, callback: F) -> impl FnOnce() + 'static + use<F>
    where
        F: Fn(&mut InputEnvelope) + 'static,
    {
        let id = {
            let mut reg = self.inner.registry.borrow_mut();
            let id = reg.next_id();
            reg.subscribers.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<BusInner> = Rc::downgrade(&self.inner);
        move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .registry
                    .borrow_mut()
                    .subscribers
                    .retain(|(sub_id, _)| *sub_id != id);
            }
        }
    }

    /// Publish one event (or the `None` sentinel).
    ///
    /// The subscriber list is copied before iterating, so subscribers added or
    /// removed during dispatch do not affect this publish. A panicking
    /// subscriber is logged and skipped. Returns the final envelope.
    pub fn publish(&self, event: Option<InputEvent>) -> InputEnvelope {
        let mut envelope = InputEnvelope::new(event);
        if self.inner.closed.get() {
            return envelope;
        }

        let snapshot: Vec<Subscriber> = self
            .inner
            .registry
            .borrow()
            .subscribers
            .iter()
            .map(|(_, sub)| sub.clone())
            .collect();

        for subscriber in snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| subscriber(&mut envelope)));
            if result.is_err() {
                error!(
                    "input subscriber panicked while handling {:?}; continuing dispatch",
                    envelope.button()
                );
            }
        }

        envelope
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.borrow().subscribers.len()
    }

    /// Drop every subscriber and refuse further publishes.
    pub fn close(&self) {
        self.inner.closed.set(true);
        self.inner.registry.borrow_mut().subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
