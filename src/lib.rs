//! # lutris-input
//!
//! Focus-stack input routing for a gamepad-driven Lutris front-end.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! the reactive pieces (input type, pad count).
//!
//! ## Architecture
//!
//! Keyboard and gamepad input are reduced to a small set of canonical buttons
//! and broadcast to every subscriber in order. UI scopes claim focus on a
//! stack; only the top claim handles an event, and the first handler to
//! consume it wins.
//!
//! ```text
//! crossterm keys ──► KeyNormalizer ──┐
//!                                    ├──► window gate ──► BroadcastBus ──► GlobalShortcuts
//! gilrs pads ──► GamepadPoller ──────┘                                 └─► ScopedInput (top of FocusStack)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Canonical buttons, events, envelopes
//! - [`state`] - Bus, focus stack, normalizers, scoped/global consumers, context
//! - [`pipeline`] - Frame scheduling, gamepad source, event loop
//! - [`config`] - TOML configuration
//! - [`backend`] - External collaborator interfaces

pub mod backend;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{InputConfig, GamepadConfig, KeyboardConfig, StickSource};
pub use error::{BackendError, ConfigError, InputError};

pub use pipeline::{EventLoop, FrameLoop, GamepadSource, GilrsSource};

pub use state::{
    // Core
    BroadcastBus, FocusStack, FocusToken, InputContext, InputTypeTracker,
    // Consumers
    ScopedInput, GlobalShortcut, GlobalKeysHandle, setup_global_shortcuts,
    RowMenu, MenuOutcome,
    // Sources
    KeyboardEvent, KeyNormalizer, GamepadPoller, PadSnapshot, HostEvent, TerminalSession,
};
