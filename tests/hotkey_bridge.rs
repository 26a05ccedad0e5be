mod common;

use common::{dispatcher, CountingRefresh, Harness, RecordingHook};
use map_viewer::hotkey::HotkeyBridge;
use map_viewer::input::{Action, KeybindTable};
use map_viewer::keys::KeyCode;
use std::sync::Arc;

const F1: KeyCode = KeyCode::F1;
const F5: KeyCode = KeyCode::F5;

#[test]
fn install_replaces_previous_registration() {
    let hook = RecordingHook::default();
    let mut bridge = HotkeyBridge::new(
        Box::new(hook.clone()),
        dispatcher(Arc::new(CountingRefresh::default())),
    );
    let table = KeybindTable::default();

    assert_eq!(bridge.install(&table), Action::ALL.len());
    assert_eq!(bridge.install(&table), Action::ALL.len());
    assert!(bridge.is_installed());
    assert_eq!(hook.installs(), 2);
    assert_eq!(hook.uninstalls(), 1);

    bridge.uninstall();
    bridge.uninstall();
    assert!(!bridge.is_installed());
    assert!(bridge.routes().is_none());
    assert_eq!(hook.uninstalls(), 2);
}

#[test]
fn dropping_the_bridge_removes_the_hook() {
    let hook = RecordingHook::default();
    {
        let mut bridge = HotkeyBridge::new(
            Box::new(hook.clone()),
            dispatcher(Arc::new(CountingRefresh::default())),
        );
        bridge.install(&KeybindTable::default());
        assert!(hook.is_active());
    }
    assert!(!hook.is_active());
}

#[test]
fn keys_dispatch_only_while_unfocused() {
    let h = Harness::new();
    h.controller.dispatcher().dispatch(Action::ZoomIn);

    h.hook.press(KeyCode::LEFT);
    assert_eq!(h.offset(), (0.0, 0.0));

    h.gate().set_window_focused(false);
    h.hook.press(KeyCode::LEFT);
    assert_eq!(h.offset(), (20.0, 0.0));

    h.hook.press(KeyCode::from_char('z').unwrap());
    assert_eq!(h.offset(), (20.0, 0.0));
}

#[test]
fn suspended_gate_silences_hotkeys() {
    let h = Harness::new();
    h.gate().set_window_focused(false);
    h.gate().suspend();

    h.hook.press(KeyCode::PLUS);
    h.hook.press(F5);
    assert_eq!(h.zoom(), 1.0);
    assert_eq!(h.refresh.count(), 0);
}

#[test]
fn settings_overlay_blocks_hotkey_navigation() {
    let h = Harness::new();
    h.gate().set_window_focused(false);

    h.hook.press(F1);
    assert!(h.controller.dispatcher().settings_visible());
    h.hook.press(KeyCode::PLUS);
    assert_eq!(h.zoom(), 1.0);

    h.hook.press(F5);
    assert_eq!(h.refresh.count(), 1);

    h.hook.press(F1);
    h.hook.press(KeyCode::PLUS);
    assert!(h.zoom() > 1.0);
}

#[test]
fn auto_repeat_fires_one_shot_actions_once() {
    let h = Harness::new();
    h.gate().set_window_focused(false);

    let mut visible = Vec::new();
    for _ in 0..4 {
        h.hook.hold(F1);
        visible.push(h.controller.dispatcher().settings_visible());
    }
    assert_eq!(visible, vec![true; 4]);

    for _ in 0..4 {
        h.hook.hold(F5);
    }
    assert_eq!(h.refresh.count(), 1);

    h.hook.release(F1);
    h.hook.hold(F1);
    assert!(!h.controller.dispatcher().settings_visible());
}

#[test]
fn auto_repeat_keeps_panning() {
    let h = Harness::new();
    h.controller.dispatcher().dispatch(Action::ZoomIn);
    h.gate().set_window_focused(false);

    h.hook.hold(KeyCode::LEFT);
    h.hook.hold(KeyCode::LEFT);
    assert_eq!(h.offset(), (40.0, 0.0));
    h.hook.release(KeyCode::LEFT);
}
