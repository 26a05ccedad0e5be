#![allow(dead_code)]

use map_viewer::dispatch::{ActionDispatcher, MapRefresh};
use map_viewer::hotkey::HotkeyBridge;
use map_viewer::input::{
    DeviceRegistry, InputController, InputGate, JoystickBackend, JoystickInfo, KeybindRegistry,
};
use map_viewer::keyboard_hook::{HookBackend, KeySink, KeyState};
use map_viewer::keys::KeyCode;
use map_viewer::settings::Settings;
use map_viewer::settings_store::{SettingsStore, SETTINGS_FILE_NAME};
use map_viewer::viewport::{SharedViewport, Viewport};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Joysticks whose buttons tests press and release by hand.
#[derive(Clone, Default)]
pub struct FakeJoysticks {
    pads: Arc<Mutex<BTreeMap<u32, Vec<bool>>>>,
}

impl FakeJoysticks {
    pub fn connect(&self, id: u32, buttons: usize) {
        self.pads.lock().unwrap().insert(id, vec![false; buttons]);
    }

    pub fn disconnect(&self, id: u32) {
        self.pads.lock().unwrap().remove(&id);
    }

    pub fn set(&self, id: u32, button: usize, pressed: bool) {
        if let Some(buttons) = self.pads.lock().unwrap().get_mut(&id) {
            buttons[button] = pressed;
        }
    }
}

impl JoystickBackend for FakeJoysticks {
    fn enumerate(&mut self) -> Vec<JoystickInfo> {
        self.pads
            .lock()
            .unwrap()
            .iter()
            .map(|(&id, buttons)| JoystickInfo {
                id,
                name: format!("Fake pad {id}"),
                button_count: buttons.len() as u32,
            })
            .collect()
    }

    fn read_buttons(&self, id: u32) -> Option<Vec<bool>> {
        self.pads.lock().unwrap().get(&id).cloned()
    }
}

#[derive(Default)]
struct HookState {
    sink: Option<KeySink>,
    installs: usize,
    uninstalls: usize,
}

/// Hook backend that lets tests inject key-downs as if from the OS.
#[derive(Clone, Default)]
pub struct RecordingHook {
    state: Arc<Mutex<HookState>>,
}

impl RecordingHook {
    fn send(&self, key: KeyCode, state: KeyState) {
        let sink = self.state.lock().unwrap().sink.clone();
        if let Some(sink) = sink {
            sink(key, state);
        }
    }

    /// Key-down without release; calling it again is an auto-repeat.
    pub fn hold(&self, key: KeyCode) {
        self.send(key, KeyState::Down);
    }

    pub fn release(&self, key: KeyCode) {
        self.send(key, KeyState::Up);
    }

    /// A full press and release.
    pub fn press(&self, key: KeyCode) {
        self.hold(key);
        self.release(key);
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().sink.is_some()
    }

    pub fn installs(&self) -> usize {
        self.state.lock().unwrap().installs
    }

    pub fn uninstalls(&self) -> usize {
        self.state.lock().unwrap().uninstalls
    }
}

impl HookBackend for RecordingHook {
    fn install(&mut self, sink: KeySink) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sink = Some(sink);
        state.installs += 1;
        Ok(())
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.sink.take().is_some() {
            state.uninstalls += 1;
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.is_active()
    }

    fn supports(&self, _key: KeyCode) -> bool {
        true
    }
}

#[derive(Default)]
pub struct CountingRefresh(AtomicUsize);

impl CountingRefresh {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl MapRefresh for CountingRefresh {
    fn request_refresh(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn viewport(width: f64, height: f64) -> SharedViewport {
    Viewport::new(Settings::default().view, width, height).shared()
}

pub fn dispatcher(refresh: Arc<CountingRefresh>) -> ActionDispatcher {
    ActionDispatcher::new(viewport(800.0, 600.0), InputGate::new(), refresh)
}

pub fn registry_in(dir: &std::path::Path) -> KeybindRegistry {
    KeybindRegistry::load(SettingsStore::new(dir.join(SETTINGS_FILE_NAME)))
}

/// Everything a test needs to drive the input stack end to end.
pub struct Harness {
    pub controller: InputController,
    pub joysticks: FakeJoysticks,
    pub hook: RecordingHook,
    pub refresh: Arc<CountingRefresh>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_joysticks(FakeJoysticks::default())
    }

    pub fn with_joysticks(joysticks: FakeJoysticks) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let refresh = Arc::new(CountingRefresh::default());
        let dispatcher = dispatcher(refresh.clone());
        let hook = RecordingHook::default();
        let bridge = HotkeyBridge::new(Box::new(hook.clone()), dispatcher.clone());
        let devices = DeviceRegistry::new(Box::new(joysticks.clone()));
        let controller = InputController::new(registry_in(dir.path()), devices, bridge, dispatcher);
        Self {
            controller,
            joysticks,
            hook,
            refresh,
            dir,
        }
    }

    pub fn gate(&self) -> &InputGate {
        self.controller.dispatcher().gate()
    }

    pub fn offset(&self) -> (f64, f64) {
        self.controller.dispatcher().viewport().lock().unwrap().offset()
    }

    pub fn zoom(&self) -> f64 {
        self.controller.dispatcher().viewport().lock().unwrap().zoom()
    }
}
