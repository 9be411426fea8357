//! Input Pipeline
//!
//! Scheduling around the state core: host events are pushed in as they
//! arrive, gamepads are sampled once per frame while any are connected.
//!
//! ```text
//! crossterm ──► input::route_event ──┐
//!                                    ├──► InputContext ──► BroadcastBus
//! GamepadSource ──► FrameLoop::due ──┘
//! ```

pub mod event_loop;
pub mod frame;
pub mod gamepad_source;

pub use event_loop::EventLoop;
pub use frame::{FRAME_INTERVAL, FrameLoop};
pub use gamepad_source::{GamepadSource, GilrsSource};
