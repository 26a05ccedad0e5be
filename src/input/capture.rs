use super::{Action, Binding, ButtonSnapshot};
use crate::keys::KeyCode;

/// Key that aborts a capture without changing the binding.
pub const CANCEL_KEY: KeyCode = KeyCode::ESCAPE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    AwaitingInput {
        action: Action,
        /// Buttons that were held when capture began. An entry flips to
        /// `false` once the button is seen released.
        baseline: ButtonSnapshot,
    },
}

/// Result of feeding one input to the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// No capture is running.
    Idle,
    /// Still waiting for a qualifying input.
    Pending,
    Bound { action: Action, binding: Binding },
    Cancelled { action: Action },
}

impl CaptureOutcome {
    pub fn is_finished(self) -> bool {
        matches!(self, CaptureOutcome::Bound { .. } | CaptureOutcome::Cancelled { .. })
    }
}

/// Waits for the next deliberate key or joystick button press for one
/// action. Leaves the state machine on the first qualifying input.
#[derive(Debug, Clone)]
pub struct RebindCapture {
    state: CaptureState,
}

impl Default for RebindCapture {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }
}

impl RebindCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn target(&self) -> Option<Action> {
        match &self.state {
            CaptureState::Idle => None,
            CaptureState::AwaitingInput { action, .. } => Some(*action),
        }
    }

    pub fn is_active(&self) -> bool {
        self.target().is_some()
    }

    /// Start waiting for input for `action`. `baseline` is the button state
    /// of every connected joystick at this moment.
    pub fn begin(&mut self, action: Action, baseline: ButtonSnapshot) {
        tracing::info!(%action, devices = baseline.len(), "rebind capture started");
        self.state = CaptureState::AwaitingInput { action, baseline };
    }

    pub fn on_key_down(&mut self, key: KeyCode) -> CaptureOutcome {
        let Some(action) = self.target() else {
            return CaptureOutcome::Idle;
        };
        self.state = CaptureState::Idle;
        if key == CANCEL_KEY {
            tracing::info!(%action, "rebind capture cancelled");
            CaptureOutcome::Cancelled { action }
        } else {
            let binding = Binding::key(key);
            tracing::info!(%action, %binding, "rebind captured key");
            CaptureOutcome::Bound { action, binding }
        }
    }

    /// Compare a fresh button sample with the baseline. A button counts only
    /// when it goes from released to pressed; buttons held since capture
    /// began must be released first. Devices or buttons that appear after
    /// capture began are recorded on first sight and never accepted on it.
    pub fn on_joystick_sample(&mut self, sample: &ButtonSnapshot) -> CaptureOutcome {
        let CaptureState::AwaitingInput { action, baseline } = &mut self.state else {
            return CaptureOutcome::Idle;
        };
        let action = *action;

        let mut pressed_fresh = None;
        for (&joy_id, buttons) in sample {
            let known = baseline.entry(joy_id).or_default();
            for (index, &pressed) in buttons.iter().enumerate() {
                match known.get(index).copied() {
                    None => {
                        known.resize(index + 1, false);
                        known[index] = pressed;
                    }
                    Some(true) if !pressed => known[index] = false,
                    Some(false) if pressed => {
                        pressed_fresh = Some((joy_id, index as u32));
                        break;
                    }
                    Some(_) => {}
                }
            }
            if pressed_fresh.is_some() {
                break;
            }
        }

        match pressed_fresh {
            Some((joy_id, button)) => {
                self.state = CaptureState::Idle;
                let binding = Binding::joystick(joy_id, button);
                tracing::info!(%action, %binding, "rebind captured joystick button");
                CaptureOutcome::Bound { action, binding }
            }
            None => CaptureOutcome::Pending,
        }
    }

    /// Abort the capture, e.g. when the window is closing.
    pub fn cancel(&mut self) -> CaptureOutcome {
        match self.target() {
            Some(action) => {
                self.state = CaptureState::Idle;
                tracing::info!(%action, "rebind capture aborted");
                CaptureOutcome::Cancelled { action }
            }
            None => CaptureOutcome::Idle,
        }
    }
}
