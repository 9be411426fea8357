//! Routing behavior through the public `InputContext` surface.
//!
//! Everything here goes in the way the host loop feeds the context:
//! key events, gamepad frames, window focus changes.
//!
//! Run with: cargo test --test routing

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use lutris_input::state::keyboard::KeyState;
use lutris_input::{
    Button, GlobalShortcut, InputConfig, InputContext, InputEvent, InputType, KeyboardEvent,
    PadButtons, PadSnapshot, ScopedInput, setup_global_shortcuts,
};

// =============================================================================
// HELPERS
// =============================================================================

fn recording_scope(
    ctx: &InputContext,
    focus_id: &str,
) -> (ScopedInput, Rc<RefCell<Vec<Button>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let scope = ScopedInput::new(ctx, focus_id, true, move |event| {
        seen_clone.borrow_mut().push(event.button);
    });
    (scope, seen)
}

fn press(ctx: &InputContext, key: &str) -> bool {
    ctx.handle_key_event(&KeyboardEvent::new(key))
}

fn release(ctx: &InputContext, key: &str) -> bool {
    ctx.handle_key_event(&KeyboardEvent::new(key).with_state(KeyState::Release))
}

// =============================================================================
// FOCUS
// =============================================================================

#[test]
fn top_claim_receives_until_released() {
    let ctx = InputContext::default();
    let (first, first_seen) = recording_scope(&ctx, "A");
    let (second, second_seen) = recording_scope(&ctx, "B");

    press(&ctx, "ArrowDown");
    assert!(first_seen.borrow().is_empty());
    assert_eq!(*second_seen.borrow(), vec![Button::Down]);

    second.release();
    press(&ctx, "ArrowUp");
    assert_eq!(*first_seen.borrow(), vec![Button::Up]);
    assert_eq!(*second_seen.borrow(), vec![Button::Down]);
    drop(first);
}

#[test]
fn middle_release_keeps_top_active() {
    let ctx = InputContext::default();
    let (c1, c1_seen) = recording_scope(&ctx, "C1");
    let (c2, c2_seen) = recording_scope(&ctx, "C2");
    let (c3, c3_seen) = recording_scope(&ctx, "C3");

    c2.set_active(false);
    let ids: Vec<String> = ctx
        .focus_stack()
        .claims()
        .into_iter()
        .map(|c| c.claimant_id)
        .collect();
    assert_eq!(ids, vec!["C1", "C3"]);

    press(&ctx, "a");
    assert_eq!(*c3_seen.borrow(), vec![Button::A]);

    drop(c3);
    press(&ctx, "b");
    assert_eq!(*c1_seen.borrow(), vec![Button::B]);
    assert!(c2_seen.borrow().is_empty());
    assert!(c1.has_focus());
}

#[test]
fn release_twice_leaves_other_claims_alone() {
    let ctx = InputContext::default();
    let stale = ctx.claim_input_focus("menu");
    stale.release();
    stale.release();

    let fresh = ctx.claim_input_focus("menu");
    assert_ne!(stale.unique_id(), fresh.unique_id());
    stale.release();
    assert!(fresh.is_acquired());
    assert_eq!(ctx.focus_stack().len(), 1);
}

// =============================================================================
// CONSUMPTION
// =============================================================================

#[test]
fn first_scope_to_consume_wins() {
    let ctx = InputContext::default();
    let x_calls = Rc::new(Cell::new(0));
    let y_calls = Rc::new(Cell::new(0));

    // X hands the top claim to Y from inside its handler, so Y is focused
    // when the same envelope reaches it.
    let y_slot: Rc<RefCell<Option<ScopedInput>>> = Rc::new(RefCell::new(None));
    let x_calls_clone = x_calls.clone();
    let y_slot_clone = y_slot.clone();
    let _x = ScopedInput::new(&ctx, "X", true, move |_| {
        x_calls_clone.set(x_calls_clone.get() + 1);
        if let Some(y) = y_slot_clone.borrow().as_ref() {
            y.set_active(true);
        }
    });
    let y_calls_clone = y_calls.clone();
    *y_slot.borrow_mut() = Some(ScopedInput::new(&ctx, "Y", false, move |_| {
        y_calls_clone.set(y_calls_clone.get() + 1);
    }));

    let observed = Rc::new(Cell::new(false));
    let observed_clone = observed.clone();
    let _tap = ctx.subscribe(move |envelope| {
        if envelope.event().is_some() {
            observed_clone.set(envelope.is_consumed());
        }
    });

    press(&ctx, "ArrowLeft");
    assert_eq!(x_calls.get(), 1);
    assert_eq!(y_calls.get(), 0);
    assert!(observed.get());

    // Next event goes to Y only
    release(&ctx, "ArrowLeft");
    press(&ctx, "ArrowLeft");
    assert_eq!(x_calls.get(), 1);
    assert_eq!(y_calls.get(), 1);
}

proptest! {
    /// SUPER reaches an earlier-subscribed global shortcut before any
    /// scope, whatever the stack looks like.
    #[test]
    fn super_shortcut_preempts_any_stack(active in proptest::collection::vec(any::<bool>(), 0..6)) {
        let ctx = InputContext::default();
        let fired = Rc::new(Cell::new(0));
        let fired_clone = fired.clone();
        let _shortcuts = setup_global_shortcuts(
            &ctx,
            vec![GlobalShortcut::new(Button::Super, move || {
                fired_clone.set(fired_clone.get() + 1);
            })],
        );

        let scoped_calls = Rc::new(Cell::new(0));
        let scopes: Vec<ScopedInput> = active
            .iter()
            .enumerate()
            .map(|(i, &on)| {
                let calls = scoped_calls.clone();
                ScopedInput::new(&ctx, format!("scope-{}", i), on, move |_| {
                    calls.set(calls.get() + 1);
                })
            })
            .collect();

        prop_assert!(ctx.process_input(Some(InputEvent::gamepad(Button::Super)), None));
        prop_assert_eq!(fired.get(), 1);
        prop_assert_eq!(scoped_calls.get(), 0);
        drop(scopes);
    }
}

// =============================================================================
// GAMEPAD
// =============================================================================

#[test]
fn held_button_repeats_on_interval() {
    let ctx = InputContext::default();
    let (_scope, seen) = recording_scope(&ctx, "list");
    ctx.set_gamepad_count(1);

    let pad = PadSnapshot::new("Xbox Wireless Controller").with_buttons(PadButtons::SOUTH);
    let t0 = Instant::now();
    // 150ms interval, 50ms frames, 9 frames held: fires at 0, 150, 300, 450
    for i in 0..=9u64 {
        ctx.process_gamepad_frame(&[pad.clone()], t0 + Duration::from_millis(50 * i));
    }
    assert_eq!(seen.borrow().len(), 4);
    assert_eq!(ctx.latest_input_type(), InputType::Xbox);

    // Release then press again: immediate
    let released = PadSnapshot::new("Xbox Wireless Controller");
    ctx.process_gamepad_frame(&[released], t0 + Duration::from_millis(500));
    ctx.process_gamepad_frame(&[pad], t0 + Duration::from_millis(516));
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn stick_maps_to_dpad() {
    let ctx = InputContext::default();
    let (_scope, seen) = recording_scope(&ctx, "list");
    let t0 = Instant::now();

    let up = PadSnapshot::new("pad").with_axes([0.0, -0.8, 0.0, 0.0]);
    ctx.process_gamepad_frame(&[up], t0);
    let centered = PadSnapshot::new("pad");
    ctx.process_gamepad_frame(&[centered.clone()], t0 + Duration::from_millis(16));
    let right = PadSnapshot::new("pad").with_axes([0.6, 0.1, 0.0, 0.0]);
    ctx.process_gamepad_frame(&[right], t0 + Duration::from_millis(32));
    ctx.process_gamepad_frame(&[centered], t0 + Duration::from_millis(48));
    let weak = PadSnapshot::new("pad").with_axes([0.3, 0.3, 0.0, 0.0]);
    ctx.process_gamepad_frame(&[weak], t0 + Duration::from_millis(64));

    assert_eq!(*seen.borrow(), vec![Button::Up, Button::Right]);
}

#[test]
fn polling_follows_pad_count() {
    let ctx = InputContext::new(InputConfig::default());
    assert!(!ctx.is_polling());
    ctx.set_gamepad_count(2);
    assert!(ctx.is_polling());
    assert_eq!(ctx.gamepad_count_signal().get(), 2);
    ctx.set_gamepad_count(0);
    assert!(!ctx.is_polling());
}

// =============================================================================
// WINDOW FOCUS
// =============================================================================

#[test]
fn unfocused_window_only_passes_super() {
    let ctx = InputContext::default();
    let (_scope, seen) = recording_scope(&ctx, "list");
    ctx.set_window_focused(false);

    assert!(!press(&ctx, "ArrowDown"));
    assert!(!press(&ctx, "a"));

    let guide = PadSnapshot::new("Xbox").with_buttons(PadButtons::GUIDE);
    assert_eq!(ctx.process_gamepad_frame(&[guide], Instant::now()), 1);
    assert_eq!(*seen.borrow(), vec![Button::Super]);

    // Release sentinel still gets through
    assert!(release(&ctx, "a"));

    ctx.set_window_focused(true);
    release(&ctx, "ArrowDown");
    assert!(press(&ctx, "ArrowDown"));
    assert_eq!(*seen.borrow(), vec![Button::Super, Button::Down]);
}

#[test]
fn held_key_on_legacy_terminal_fires_once() {
    let ctx = InputContext::default();
    let (_scope, seen) = recording_scope(&ctx, "list");

    // No event-type reporting: a held key arrives as repeated presses
    assert!(press(&ctx, "ArrowDown"));
    assert!(!press(&ctx, "ArrowDown"));
    assert!(!press(&ctx, "ArrowDown"));
    assert_eq!(*seen.borrow(), vec![Button::Down]);

    release(&ctx, "ArrowDown");
    assert!(press(&ctx, "ArrowDown"));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn input_type_tracks_last_source() {
    let ctx = InputContext::default();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let changes_clone = changes.clone();
    let _stop = ctx.subscribe_to_input_type(move |t| changes_clone.borrow_mut().push(t));

    let pad = PadSnapshot::new("Sony DualSense").with_buttons(PadButtons::EAST);
    ctx.process_gamepad_frame(&[pad], Instant::now());
    press(&ctx, "ArrowUp");

    assert_eq!(
        *changes.borrow(),
        vec![InputType::PlayStation, InputType::Keyboard]
    );
}
