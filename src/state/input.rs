//! Input Module - Host event conversion and polling
//!
//! Bridges crossterm's event system with the input context.
//! Key events feed the key normalizer; focus gained/lost events drive the
//! window-focus gate.
//!
//! # API
//!
//! - `convert_key_event` - Convert crossterm KeyEvent to our KeyboardEvent
//! - `poll_event` - Non-blocking event check with timeout
//! - `read_event` - Blocking event read
//! - `route_event` - Hand an event to the input context
//! - `enable_focus_reporting` / `disable_focus_reporting` - Focus change events
//! - `enable_key_event_types` / `disable_key_event_types` - Press/repeat/release reporting
//! - `TerminalSession` - Raw mode plus both of the above, restored on drop
//!
//! # Example
//!
//! ```ignore
//! use lutris_input::state::input::{poll_event, route_event};
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         route_event(&ctx, event);
//!     }
//! }
//! ```

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{
    DisableFocusChange, EnableFocusChange, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags, poll, read,
};
use crossterm::execute;
use crossterm::terminal;
use log::{debug, info};

use crate::error::Result;

use super::context::InputContext;
use super::keyboard::{KeyState, KeyboardEvent, Modifiers};

// =============================================================================
// HOST EVENT ENUM
// =============================================================================

/// Host event after conversion
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Keyboard event (key press, repeat, release)
    Key(KeyboardEvent),
    /// The terminal window gained input focus
    FocusGained,
    /// The terminal window lost input focus
    FocusLost,
    /// Terminal resize event (new width, height)
    Resize(u16, u16),
    /// No event or unhandled event type
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent {
        key,
        modifiers: convert_modifiers(event.modifiers),
        state,
    }
}

/// Convert crossterm KeyModifiers to our Modifiers
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
    }
}

/// Convert any crossterm event to a host event
pub fn convert_event(event: CrosstermEvent) -> HostEvent {
    match event {
        CrosstermEvent::Key(key) => HostEvent::Key(convert_key_event(key)),
        CrosstermEvent::FocusGained => HostEvent::FocusGained,
        CrosstermEvent::FocusLost => HostEvent::FocusLost,
        CrosstermEvent::Resize(w, h) => HostEvent::Resize(w, h),
        _ => HostEvent::None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<HostEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<HostEvent> {
    Ok(convert_event(read()?))
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Route a host event into the input context.
/// Returns true if an input event was broadcast.
pub fn route_event(ctx: &InputContext, event: HostEvent) -> bool {
    match event {
        HostEvent::Key(key) => ctx.handle_key_event(&key),
        HostEvent::FocusGained => {
            ctx.set_window_focused(true);
            false
        }
        HostEvent::FocusLost => {
            ctx.set_window_focused(false);
            false
        }
        HostEvent::Resize(_, _) | HostEvent::None => false,
    }
}

// =============================================================================
// FOCUS REPORTING
// =============================================================================

/// Ask the terminal to report focus gained/lost.
pub fn enable_focus_reporting() -> std::io::Result<()> {
    execute!(stdout(), EnableFocusChange)
}

/// Stop focus change reporting.
pub fn disable_focus_reporting() -> std::io::Result<()> {
    execute!(stdout(), DisableFocusChange)
}

// =============================================================================
// KEY EVENT TYPES
// =============================================================================

/// Ask the terminal to report key repeat and release as their own kinds.
///
/// Returns false (and changes nothing) when the terminal cannot. Held keys
/// then arrive as repeated presses with no release; the key normalizer
/// collapses those.
pub fn enable_key_event_types() -> std::io::Result<bool> {
    if !terminal::supports_keyboard_enhancement()? {
        return Ok(false);
    }
    execute!(
        stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )?;
    Ok(true)
}

/// Undo `enable_key_event_types`.
pub fn disable_key_event_types() -> std::io::Result<()> {
    execute!(stdout(), PopKeyboardEnhancementFlags)
}

// =============================================================================
// TERMINAL SESSION
// =============================================================================

/// Terminal set up for input: raw mode, focus reporting, and key event
/// types where supported. Everything is undone on drop (best effort).
pub struct TerminalSession {
    key_event_types: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on, drop restores raw mode even if a later step fails
        let mut session = Self {
            key_event_types: false,
        };
        enable_focus_reporting()?;
        session.key_event_types = enable_key_event_types()?;
        if session.key_event_types {
            debug!("terminal reports key repeat/release");
        } else {
            info!("terminal lacks key release reporting; collapsing held-key presses");
        }
        Ok(session)
    }

    /// Whether repeat and release arrive as their own event kinds.
    pub fn reports_key_event_types(&self) -> bool {
        self.key_event_types
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.key_event_types {
            let _ = disable_key_event_types();
        }
        let _ = disable_focus_reporting();
        let _ = terminal::disable_raw_mode();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Button;
    use crossterm::event::KeyEventState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(code: KeyCode) -> CrosstermKeyEvent {
        key(code, KeyModifiers::empty(), KeyEventKind::Press)
    }

    #[test]
    fn test_convert_key_char() {
        let event = convert_key_event(press(KeyCode::Char('a')));

        assert_eq!(event.key, "a");
        assert_eq!(event.state, KeyState::Press);
        assert!(!event.modifiers.ctrl);
    }

    #[test]
    fn test_convert_key_all_arrows() {
        let arrows = [
            (KeyCode::Up, "ArrowUp"),
            (KeyCode::Down, "ArrowDown"),
            (KeyCode::Left, "ArrowLeft"),
            (KeyCode::Right, "ArrowRight"),
        ];

        for (code, expected) in arrows {
            assert_eq!(convert_key_event(press(code)).key, expected);
        }
    }

    #[test]
    fn test_convert_key_navigation() {
        let nav_keys = [
            (KeyCode::Home, "Home"),
            (KeyCode::End, "End"),
            (KeyCode::PageUp, "PageUp"),
            (KeyCode::PageDown, "PageDown"),
            (KeyCode::Enter, "Enter"),
            (KeyCode::Esc, "Escape"),
            (KeyCode::F(5), "F5"),
        ];

        for (code, expected) in nav_keys {
            assert_eq!(convert_key_event(press(code)).key, expected);
        }
    }

    #[test]
    fn test_convert_key_with_ctrl() {
        let event = convert_key_event(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        ));

        assert_eq!(event.key, "c");
        assert!(event.modifiers.ctrl);
        assert!(!event.modifiers.alt);
        assert!(!event.modifiers.shift);
    }

    #[test]
    fn test_convert_key_states() {
        let states = [
            (KeyEventKind::Press, KeyState::Press),
            (KeyEventKind::Repeat, KeyState::Repeat),
            (KeyEventKind::Release, KeyState::Release),
        ];

        for (kind, expected) in states {
            let event = convert_key_event(key(KeyCode::Char('a'), KeyModifiers::empty(), kind));
            assert_eq!(event.state, expected);
        }
    }

    #[test]
    fn test_convert_focus_events() {
        assert_eq!(convert_event(CrosstermEvent::FocusGained), HostEvent::FocusGained);
        assert_eq!(convert_event(CrosstermEvent::FocusLost), HostEvent::FocusLost);
        assert_eq!(convert_event(CrosstermEvent::Resize(80, 24)), HostEvent::Resize(80, 24));
    }

    #[test]
    fn test_route_focus_lost_gates_keys() {
        let ctx = InputContext::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _cleanup = ctx.subscribe(move |envelope| seen_clone.borrow_mut().push(envelope.button()));

        route_event(&ctx, HostEvent::FocusLost);
        assert!(!ctx.window_focused());
        assert!(!route_event(&ctx, convert_event(CrosstermEvent::Key(press(KeyCode::Up)))));

        route_event(&ctx, HostEvent::FocusGained);
        let up_release = key(KeyCode::Up, KeyModifiers::empty(), KeyEventKind::Release);
        route_event(&ctx, convert_event(CrosstermEvent::Key(up_release)));
        assert!(route_event(&ctx, convert_event(CrosstermEvent::Key(press(KeyCode::Up)))));
        assert_eq!(seen.borrow().iter().flatten().count(), 1);
    }

    #[test]
    fn test_route_held_key_without_event_types() {
        let ctx = InputContext::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _cleanup = ctx.subscribe(move |envelope| seen_clone.borrow_mut().push(envelope.button()));

        // Legacy terminals send a held key as a stream of plain presses
        for _ in 0..3 {
            route_event(&ctx, convert_event(CrosstermEvent::Key(press(KeyCode::Down))));
        }
        assert_eq!(*seen.borrow(), vec![Some(Button::Down)]);
    }

    #[test]
    fn test_route_held_key_with_event_types() {
        let ctx = InputContext::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _cleanup = ctx.subscribe(move |envelope| seen_clone.borrow_mut().push(envelope.button()));

        let kinds = [
            KeyEventKind::Press,
            KeyEventKind::Repeat,
            KeyEventKind::Repeat,
            KeyEventKind::Release,
            KeyEventKind::Press,
        ];
        for kind in kinds {
            let event = key(KeyCode::Down, KeyModifiers::empty(), kind);
            route_event(&ctx, convert_event(CrosstermEvent::Key(event)));
        }
        assert_eq!(
            *seen.borrow(),
            vec![Some(Button::Down), None, Some(Button::Down)]
        );
    }

    #[test]
    fn test_route_ctrl_chord_not_broadcast() {
        let ctx = InputContext::default();
        let ctrl_a = key(KeyCode::Char('a'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert!(!route_event(&ctx, convert_event(CrosstermEvent::Key(ctrl_a))));
    }

    #[test]
    fn test_route_resize_is_ignored() {
        let ctx = InputContext::default();
        assert!(!route_event(&ctx, HostEvent::Resize(100, 30)));
        assert!(!route_event(&ctx, HostEvent::None));
    }

    #[test]
    fn test_terminal_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::Unsupported, "not a tty");
        let err = crate::error::InputError::from(io);
        assert_eq!(err.to_string(), "terminal I/O failed: not a tty");
    }
}
