//! Focus Stack - claim/release arbitration between UI scopes
//!
//! Manages which UI scope currently receives input:
//! - `claim(claimant_id)` pushes a new claim and returns a token
//! - only the top-of-stack claim is "acquired"; the rest are shadowed
//! - `release(unique_id)` removes a claim from any position (non-LIFO teardown)
//! - unique ids are never reused, so a stale token cannot release someone else
//!
//! Claim lifecycle: Active -> Shadowed (claim pushed above) -> Active (claims
//! above released) -> Released. Claims are only ever removed explicitly.
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::FocusStack;
//!
//! let stack = FocusStack::new();
//! let library = stack.claim("LibraryContainer");
//! let menu = stack.claim("SystemMenu");
//! assert!(menu.is_acquired());
//! assert!(!library.is_acquired());
//!
//! menu.release();
//! assert!(library.is_acquired());
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;

// =============================================================================
// TYPES
// =============================================================================

/// One scope's request to be the exclusive input recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusClaim {
    /// Logical UI scope (e.g. "LibraryContainer", "VolumeControl").
    pub claimant_id: String,
    /// Process-unique, monotonically increasing.
    pub unique_id: u64,
}

struct FocusStackInner {
    claims: Vec<FocusClaim>,
    next_id: u64,
}

impl FocusStackInner {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn describe(&self) -> String {
        self.claims
            .iter()
            .map(|c| c.claimant_id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// FOCUS STACK
// =============================================================================

/// Ordered sequence of focus claims. Clones share the same stack.
#[derive(Clone)]
pub struct FocusStack {
    inner: Rc<RefCell<FocusStackInner>>,
}

impl FocusStack {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(FocusStackInner {
                claims: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Push a new claim on top of the stack.
    pub fn claim(&self, claimant_id: impl Into<String>) -> FocusToken {
        let claimant_id = claimant_id.into();
        let mut inner = self.inner.borrow_mut();
        let unique_id = inner.next_id();
        inner.claims.push(FocusClaim {
            claimant_id: claimant_id.clone(),
            unique_id,
        });
        debug!(
            "Focus claimed by: {} (#{}). Stack: [{}]",
            claimant_id,
            unique_id,
            inner.describe()
        );

        FocusToken {
            stack: Rc::downgrade(&self.inner),
            claimant_id,
            unique_id,
        }
    }

    /// Remove the claim with `unique_id`, wherever it sits.
    /// Returns false if no such claim is live.
    pub fn release(&self, unique_id: u64) -> bool {
        release_in(&self.inner, unique_id)
    }

    /// Whether `unique_id` is the top-of-stack claim.
    pub fn is_top(&self, unique_id: u64) -> bool {
        is_top_in(&self.inner, unique_id)
    }

    /// The active claim, if any.
    pub fn top(&self) -> Option<FocusClaim> {
        self.inner.borrow().claims.last().cloned()
    }

    /// Snapshot of the whole stack, bottom first.
    pub fn claims(&self) -> Vec<FocusClaim> {
        self.inner.borrow().claims.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().claims.is_empty()
    }

    pub fn contains(&self, unique_id: u64) -> bool {
        self.inner
            .borrow()
            .claims
            .iter()
            .any(|c| c.unique_id == unique_id)
    }

    /// Drop every claim. Used at context shutdown.
    pub fn clear(&self) {
        self.inner.borrow_mut().claims.clear();
    }
}

impl Default for FocusStack {
    fn default() -> Self {
        Self::new()
    }
}

fn release_in(inner: &RefCell<FocusStackInner>, unique_id: u64) -> bool {
    let mut inner = inner.borrow_mut();
    let before = inner.claims.len();
    inner.claims.retain(|c| c.unique_id != unique_id);
    let removed = inner.claims.len() != before;
    if removed {
        debug!("Focus released (#{}). Stack: [{}]", unique_id, inner.describe());
    }
    removed
}

fn is_top_in(inner: &RefCell<FocusStackInner>, unique_id: u64) -> bool {
    inner
        .borrow()
        .claims
        .last()
        .is_some_and(|c| c.unique_id == unique_id)
}

// =============================================================================
// FOCUS TOKEN
// =============================================================================

/// Weak handle to one claim.
///
/// Holds only the claim's unique id; every query re-checks the live stack.
/// Dropping a token does NOT release the claim: shadowed claims must stay on
/// the stack until their scope explicitly lets go.
#[derive(Clone, Debug)]
pub struct FocusToken {
    stack: Weak<RefCell<FocusStackInner>>,
    claimant_id: String,
    unique_id: u64,
}

impl FocusToken {
    /// True iff this claim is currently the top of the stack.
    pub fn is_acquired(&self) -> bool {
        self.stack
            .upgrade()
            .is_some_and(|inner| is_top_in(&inner, self.unique_id))
    }

    /// Remove this claim. Idempotent.
    pub fn release(&self) {
        if let Some(inner) = self.stack.upgrade() {
            release_in(&inner, self.unique_id);
        }
    }

    /// Whether the claim is still on the stack (active or shadowed).
    pub fn is_live(&self) -> bool {
        self.stack.upgrade().is_some_and(|inner| {
            inner
                .borrow()
                .claims
                .iter()
                .any(|c| c.unique_id == self.unique_id)
        })
    }

    pub fn claimant_id(&self) -> &str {
        &self.claimant_id
    }

    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }
}

// =============================================================================
// TESTS
// =============================================================================
