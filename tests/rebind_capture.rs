mod common;

use common::{registry_in, FakeJoysticks, Harness};
use map_viewer::dispatch::DispatchOutcome;
use map_viewer::input::{Action, Binding, CaptureOutcome, HeldKeys, KeybindTable};
use map_viewer::keys::KeyCode;
use std::time::Instant;

fn pad_with_held_button(button: usize) -> FakeJoysticks {
    let joysticks = FakeJoysticks::default();
    joysticks.connect(0, 4);
    joysticks.set(0, button, true);
    joysticks
}

#[test]
fn button_held_at_start_must_be_released_first() {
    let mut h = Harness::with_joysticks(pad_with_held_button(2));
    h.controller.start_rebind(Action::ZoomIn);

    assert_eq!(h.controller.capture_tick(), CaptureOutcome::Pending);
    h.joysticks.set(0, 2, false);
    assert_eq!(h.controller.capture_tick(), CaptureOutcome::Pending);
    h.joysticks.set(0, 2, true);

    let expected = Binding::joystick(0, 2);
    assert_eq!(
        h.controller.capture_tick(),
        CaptureOutcome::Bound {
            action: Action::ZoomIn,
            binding: expected,
        }
    );
    assert!(!h.controller.is_capturing());
    assert_eq!(h.controller.registry().get(Action::ZoomIn), Some(expected));
    assert_eq!(registry_in(h.dir.path()).get(Action::ZoomIn), Some(expected));
}

#[test]
fn fresh_press_of_another_button_binds_immediately() {
    let mut h = Harness::with_joysticks(pad_with_held_button(2));
    h.controller.start_rebind(Action::PanDown);

    h.joysticks.set(0, 3, true);
    assert_eq!(
        h.controller.capture_tick(),
        CaptureOutcome::Bound {
            action: Action::PanDown,
            binding: Binding::joystick(0, 3),
        }
    );
}

#[test]
fn capture_suspends_every_delivery_path() {
    let mut h = Harness::new();
    h.gate().set_window_focused(false);
    h.controller.start_rebind(Action::PanLeft);

    assert!(h.controller.is_capturing());
    assert_eq!(h.controller.capture_target(), Some(Action::PanLeft));
    assert!(h.gate().is_suspended());
    assert!(!h.hook.is_active());

    let held: HeldKeys = [KeyCode::PLUS].into_iter().collect();
    assert!(h.controller.tick(&held, Instant::now()).is_empty());
    assert_eq!(
        h.controller.dispatcher().dispatch(Action::ZoomIn),
        DispatchOutcome::Suspended
    );
    assert_eq!(h.zoom(), 1.0);
}

#[test]
fn key_press_binds_and_rearms_hotkeys() {
    let mut h = Harness::new();
    let q = KeyCode::from_char('q').unwrap();
    h.controller.start_rebind(Action::ResetView);

    assert_eq!(
        h.controller.capture_key(q),
        CaptureOutcome::Bound {
            action: Action::ResetView,
            binding: Binding::key(q),
        }
    );
    assert!(!h.gate().is_suspended());
    assert!(h.hook.is_active());
    let routes = h.controller.bridge().routes().unwrap();
    assert_eq!(routes.actions_for(q), &[Action::ResetView]);
    assert!(routes.actions_for(KeyCode::from_char('r').unwrap()).is_empty());
}

#[test]
fn escape_cancels_without_changes() {
    let mut h = Harness::new();
    h.controller.start_rebind(Action::Refresh);

    assert_eq!(
        h.controller.capture_key(KeyCode::ESCAPE),
        CaptureOutcome::Cancelled {
            action: Action::Refresh
        }
    );
    assert_eq!(h.controller.registry().table(), &KeybindTable::default());
    assert!(!h.gate().is_suspended());
    assert!(h.hook.is_active());
    assert_eq!(h.hook.installs(), 2);
}

#[test]
fn second_start_is_ignored_while_capturing() {
    let mut h = Harness::new();
    h.controller.start_rebind(Action::PanUp);
    h.controller.start_rebind(Action::PanDown);
    assert_eq!(h.controller.capture_target(), Some(Action::PanUp));
}

#[test]
fn shutdown_during_capture_leaves_no_hook_behind() {
    let mut h = Harness::new();
    h.controller.start_rebind(Action::ZoomOut);
    h.controller.shutdown();

    assert!(!h.controller.is_capturing());
    assert!(!h.hook.is_active());
    assert_eq!(
        h.controller.registry().get(Action::ZoomOut),
        Some(KeybindTable::default_binding(Action::ZoomOut))
    );
}

#[test]
fn tick_outside_capture_is_idle() {
    let mut h = Harness::new();
    assert_eq!(h.controller.capture_tick(), CaptureOutcome::Idle);
    assert_eq!(h.controller.cancel_rebind(), CaptureOutcome::Idle);
}

#[test]
fn key_that_ended_capture_must_be_released_before_it_fires() {
    let mut h = Harness::new();
    let f2 = KeyCode(0x71);
    h.controller.start_rebind(Action::ToggleSettings);
    h.controller.capture_key(f2);

    let held: HeldKeys = [f2].into_iter().collect();
    let now = Instant::now();
    assert!(h.controller.tick(&held, now).is_empty());
    assert!(!h.controller.dispatcher().settings_visible());

    h.controller.tick(&HeldKeys::new(), now);
    h.controller.tick(&held, now);
    assert!(h.controller.dispatcher().settings_visible());
}
