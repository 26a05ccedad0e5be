use criterion::{criterion_group, criterion_main, Criterion};
use map_viewer::dispatch::{ActionDispatcher, NoRefresh};
use map_viewer::hotkey::HotkeyBridge;
use map_viewer::input::{
    DeviceRegistry, HeldKeys, InputController, InputGate, KeybindRegistry, NoJoysticks,
};
use map_viewer::keyboard_hook::UnsupportedHook;
use map_viewer::keys::KeyCode;
use map_viewer::settings::Settings;
use map_viewer::settings_store::SettingsStore;
use map_viewer::viewport::Viewport;
use std::sync::Arc;
use std::time::Instant;

fn bench_tick(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    let viewport = Viewport::new(settings.view, 1280.0, 720.0).shared();
    let dispatcher = ActionDispatcher::new(viewport, InputGate::new(), Arc::new(NoRefresh));
    let registry = KeybindRegistry::with_settings(
        SettingsStore::new(dir.path().join("settings.json")),
        settings,
    );
    let bridge = HotkeyBridge::new(Box::new(UnsupportedHook), dispatcher.clone());
    let devices = DeviceRegistry::new(Box::new(NoJoysticks));
    let mut controller = InputController::new(registry, devices, bridge, dispatcher);

    let held: HeldKeys = [KeyCode::LEFT, KeyCode::UP, KeyCode::PLUS]
        .into_iter()
        .collect();
    c.bench_function("tick_three_held", |b| {
        b.iter(|| controller.tick(&held, Instant::now()))
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
