//! State Module - The input focus-stack and event-routing core
//!
//! - **Bus** - Snapshot broadcast of consumption envelopes
//! - **Focus** - Claim/release stack, top claim is the only acquired one
//! - **Input Type** - Latest device family, change notifications
//! - **Keyboard** - Key event types, key-to-button normalization
//! - **Autorepeat** - Per-button fire gating while held
//! - **Gamepad** - Per-frame pad sampling, stick-to-dpad, SUPER chord
//! - **Scoped** - Focus-gated handler per UI scope
//! - **Global Keys** - Focus-independent shortcuts
//! - **Row Menu** - Wrap-around list navigation
//! - **Context** - Owns all of the above, applies window-focus gating
//! - **Input** - crossterm bridge

pub mod autorepeat;
pub mod bus;
pub mod context;
pub mod focus;
pub mod gamepad;
pub mod global_keys;
pub mod input;
pub mod input_type;
pub mod keyboard;
pub mod row_menu;
pub mod scoped;

pub use autorepeat::AutorepeatTable;
pub use bus::{BroadcastBus, Subscriber};
pub use context::InputContext;
pub use focus::{FocusClaim, FocusStack, FocusToken};
pub use gamepad::{GamepadPoller, PadFrame, PadSnapshot, stick_direction};
pub use global_keys::{GlobalKeysHandle, GlobalShortcut, setup_global_shortcuts};
pub use input::{HostEvent, TerminalSession, poll_event, read_event, route_event};
pub use input_type::{InputTypeListener, InputTypeTracker};
pub use keyboard::{KeyNormalizer, KeyOutcome, KeyState, KeyboardEvent, Modifiers};
pub use row_menu::{MenuOutcome, RowMenu};
pub use scoped::{ScopedHandler, ScopedInput};
