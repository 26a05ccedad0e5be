use super::{
    poll, Action, Binding, CaptureOutcome, DeviceRegistry, HeldKeys, KeybindRegistry,
    RebindCapture,
};
use crate::dispatch::{ActionDispatcher, DispatchOutcome};
use crate::hotkey::HotkeyBridge;
use crate::keys::KeyCode;
use std::collections::BTreeSet;
use std::time::Instant;

/// Ties the input components together for the render loop: one call to
/// [`InputController::tick`] per frame, plus the rebind capture lifecycle.
pub struct InputController {
    registry: KeybindRegistry,
    devices: DeviceRegistry,
    bridge: HotkeyBridge,
    capture: RebindCapture,
    dispatcher: ActionDispatcher,
    /// Actions whose input was active on the previous tick.
    held_last: BTreeSet<Action>,
}

impl InputController {
    /// Scans devices and arms the hotkey bridge from the loaded table.
    pub fn new(
        registry: KeybindRegistry,
        mut devices: DeviceRegistry,
        mut bridge: HotkeyBridge,
        dispatcher: ActionDispatcher,
    ) -> Self {
        devices.rescan();
        bridge.install(registry.table());
        Self {
            registry,
            devices,
            bridge,
            capture: RebindCapture::new(),
            dispatcher,
            held_last: BTreeSet::new(),
        }
    }

    pub fn registry(&self) -> &KeybindRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut KeybindRegistry {
        &mut self.registry
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    pub fn bridge(&self) -> &HotkeyBridge {
        &self.bridge
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Poll held inputs and dispatch the result. Navigation actions fire on
    /// every tick their input is held; the others fire only on the tick the
    /// input goes down. Returns the actions dispatched. Rescans joysticks
    /// when the rescan interval has passed. Does nothing while a capture is
    /// running.
    pub fn tick(&mut self, held: &HeldKeys, now: Instant) -> BTreeSet<Action> {
        if self.capture.is_active() {
            return BTreeSet::new();
        }
        self.devices.rescan_if_due(now);

        let active = poll(self.registry.table(), held, &self.devices);
        let fired: BTreeSet<Action> = active
            .iter()
            .copied()
            .filter(|a| a.is_navigation() || !self.held_last.contains(a))
            .collect();
        for &action in &fired {
            let outcome = self.dispatcher.dispatch(action);
            if outcome != DispatchOutcome::Applied {
                tracing::trace!(%action, ?outcome, "polled action not applied");
            }
        }
        self.held_last = active;
        fired
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_active()
    }

    pub fn capture_target(&self) -> Option<Action> {
        self.capture.target()
    }

    /// Enter capture for `action`: suspend dispatch, drop the OS hook,
    /// rescan joysticks and snapshot their buttons as the baseline.
    pub fn start_rebind(&mut self, action: Action) {
        if self.capture.is_active() {
            tracing::debug!(%action, "rebind already in progress");
            return;
        }
        self.dispatcher.gate().suspend();
        self.bridge.uninstall();
        self.devices.rescan();
        self.capture.begin(action, self.devices.snapshot());
    }

    /// Feed a key-down seen by the window while capturing.
    pub fn capture_key(&mut self, key: KeyCode) -> CaptureOutcome {
        let outcome = self.capture.on_key_down(key);
        self.finish_if_done(outcome);
        outcome
    }

    /// Sample joystick buttons while capturing. Call once per frame.
    pub fn capture_tick(&mut self) -> CaptureOutcome {
        if !self.capture.is_active() {
            return CaptureOutcome::Idle;
        }
        let sample = self.devices.snapshot();
        let outcome = self.capture.on_joystick_sample(&sample);
        self.finish_if_done(outcome);
        outcome
    }

    /// Abort a running capture, restoring hotkeys and dispatch.
    pub fn cancel_rebind(&mut self) -> CaptureOutcome {
        let outcome = self.capture.cancel();
        self.finish_if_done(outcome);
        outcome
    }

    fn finish_if_done(&mut self, outcome: CaptureOutcome) {
        if !outcome.is_finished() {
            return;
        }
        if let CaptureOutcome::Bound { action, binding } = outcome {
            self.bind(action, binding);
        }
        self.bridge.install(self.registry.table());
        // The input that ended the capture may still be down; it must be
        // released before a one-shot action fires.
        self.held_last = Action::ALL
            .into_iter()
            .filter(|a| !a.is_navigation())
            .collect();
        self.dispatcher.gate().resume();
    }

    fn bind(&mut self, action: Action, binding: Binding) {
        if let Err(err) = self.registry.set(action, binding) {
            tracing::warn!(%action, %err, "binding kept for this session only");
        }
    }

    /// Release the OS hook. Called on shutdown.
    pub fn shutdown(&mut self) {
        if self.capture.is_active() {
            self.cancel_rebind();
        }
        self.bridge.uninstall();
    }
}
