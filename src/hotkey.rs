use crate::dispatch::ActionDispatcher;
use crate::error::ViewerError;
use crate::input::{Action, Binding, KeybindTable};
use crate::keyboard_hook::{HookBackend, KeySink, KeyState};
use crate::keys::KeyCode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Key to action routing derived from a keybind table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotkeyRoutes {
    by_key: HashMap<KeyCode, Vec<Action>>,
}

impl HotkeyRoutes {
    /// Keyboard bindings the backend can watch become routes; the rest are
    /// returned as registration errors. Joystick bindings are ignored.
    pub fn from_table(
        table: &KeybindTable,
        supports: impl Fn(KeyCode) -> bool,
    ) -> (Self, Vec<ViewerError>) {
        let mut routes = Self::default();
        let mut rejected = Vec::new();
        for (action, binding) in table.iter() {
            let Binding::Keyboard { value: key } = binding else {
                continue;
            };
            if supports(key) {
                routes.by_key.entry(key).or_default().push(action);
            } else {
                rejected.push(ViewerError::HotkeyRegistration { action, key });
            }
        }
        (routes, rejected)
    }

    pub fn actions_for(&self, key: KeyCode) -> &[Action] {
        self.by_key.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of routed key/action pairs.
    pub fn len(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Focus-independent hotkeys backed by an OS keyboard hook.
///
/// Key-downs matching a route are dispatched straight from the hook thread
/// through the shared dispatcher, but only while the viewer window is
/// unfocused: with focus the per-frame poller already sees the key.
pub struct HotkeyBridge {
    backend: Box<dyn HookBackend>,
    dispatcher: ActionDispatcher,
    routes: Option<Arc<HotkeyRoutes>>,
}

impl HotkeyBridge {
    pub fn new(backend: Box<dyn HookBackend>, dispatcher: ActionDispatcher) -> Self {
        Self {
            backend,
            dispatcher,
            routes: None,
        }
    }

    /// Replace any current registration with routes built from `table`.
    /// Returns the number of routed bindings.
    pub fn install(&mut self, table: &KeybindTable) -> usize {
        self.uninstall();

        let (routes, rejected) = HotkeyRoutes::from_table(table, |k| self.backend.supports(k));
        for err in &rejected {
            tracing::warn!(%err, "global hotkey inactive until rebound");
        }
        if routes.is_empty() {
            tracing::info!("no global hotkeys to register");
            return 0;
        }

        let routes = Arc::new(routes);
        let sink = make_sink(routes.clone(), self.dispatcher.clone());
        match self.backend.install(sink) {
            Ok(()) => {
                let count = routes.len();
                tracing::info!(count, "global hotkeys installed");
                self.routes = Some(routes);
                count
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "global hotkeys unavailable");
                0
            }
        }
    }

    /// Remove every registration. No-op when nothing is installed.
    pub fn uninstall(&mut self) {
        if let Err(err) = self.backend.uninstall() {
            tracing::warn!(error = %format!("{err:#}"), "failed to remove keyboard hook");
        }
        if self.routes.take().is_some() {
            tracing::info!("global hotkeys removed");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.routes.is_some() && self.backend.is_installed()
    }

    pub fn routes(&self) -> Option<&HotkeyRoutes> {
        self.routes.as_deref()
    }
}

impl Drop for HotkeyBridge {
    fn drop(&mut self) {
        self.uninstall();
    }
}

fn make_sink(routes: Arc<HotkeyRoutes>, dispatcher: ActionDispatcher) -> KeySink {
    // Keys currently down, so auto-repeat key-downs can be told apart from
    // fresh presses.
    let down: Mutex<HashSet<KeyCode>> = Mutex::new(HashSet::new());
    Arc::new(move |key, state| {
        let repeat = match down.lock() {
            Ok(mut down) => match state {
                KeyState::Up => {
                    down.remove(&key);
                    return;
                }
                KeyState::Down => !down.insert(key),
            },
            Err(_) => state == KeyState::Down,
        };
        if state == KeyState::Up || dispatcher.gate().window_focused() {
            return;
        }
        for &action in routes.actions_for(key) {
            if repeat && !action.is_navigation() {
                continue;
            }
            let outcome = dispatcher.dispatch(action);
            tracing::debug!(%action, %key, repeat, ?outcome, "global hotkey");
        }
    })
}
