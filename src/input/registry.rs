use super::{Action, Binding, KeybindTable};
use crate::error::ViewerError;
use crate::settings::Settings;
use crate::settings_store::SettingsStore;

/// Holds the action to binding table together with the rest of the
/// persisted settings document, and writes through on every change.
pub struct KeybindRegistry {
    store: SettingsStore,
    settings: Settings,
}

impl KeybindRegistry {
    /// Load from `store`, falling back to defaults on any problem.
    pub fn load(store: SettingsStore) -> Self {
        let settings = store.load_or_default();
        Self { store, settings }
    }

    pub fn with_settings(store: SettingsStore, settings: Settings) -> Self {
        Self { store, settings }
    }

    pub fn get(&self, action: Action) -> Option<Binding> {
        self.settings.keybinds.get(action)
    }

    /// Overwrite the binding for `action` and persist immediately.
    ///
    /// The in-memory table is updated even when the write fails; the next
    /// successful mutation writes the whole document again.
    pub fn set(&mut self, action: Action, binding: Binding) -> Result<(), ViewerError> {
        let previous = self.settings.keybinds.set(action, binding);
        tracing::info!(%action, %binding, ?previous, "keybind updated");
        self.persist()
    }

    /// All bindings in stable action order, for the settings menu.
    pub fn all(&self) -> Vec<(Action, Binding)> {
        self.settings.keybinds.iter().collect()
    }

    pub fn table(&self) -> &KeybindTable {
        &self.settings.keybinds
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a change to the non-keybind settings and persist it.
    pub fn update_settings(
        &mut self,
        update: impl FnOnce(&mut Settings),
    ) -> Result<(), ViewerError> {
        update(&mut self.settings);
        self.persist()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    fn persist(&self) -> Result<(), ViewerError> {
        self.store.save(&self.settings).map_err(|err| {
            let err = ViewerError::Persistence(format!("{err:#}"));
            tracing::warn!(%err, "settings kept in memory only");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyCode;
    use crate::settings_store::SETTINGS_FILE_NAME;

    #[test]
    fn set_writes_through_and_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let mut registry = KeybindRegistry::load(SettingsStore::new(&path));
        registry
            .set(Action::ZoomIn, Binding::joystick(0, 3))
            .expect("persist");
        assert!(path.exists());

        let reloaded = KeybindRegistry::load(SettingsStore::new(&path));
        assert_eq!(reloaded.get(Action::ZoomIn), Some(Binding::joystick(0, 3)));
        assert_eq!(reloaded.all(), registry.all());
    }

    #[test]
    fn write_failure_keeps_in_memory_binding() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("blocked");
        std::fs::create_dir_all(&path).expect("mkdir");

        let mut registry =
            KeybindRegistry::with_settings(SettingsStore::new(&path), Settings::default());
        let result = registry.set(Action::PanUp, Binding::key(KeyCode::from_char('w').unwrap()));

        assert!(matches!(result, Err(ViewerError::Persistence(_))));
        assert_eq!(
            registry.get(Action::PanUp),
            Some(Binding::key(KeyCode::from_char('W').unwrap()))
        );
    }

    #[test]
    fn all_is_in_declaration_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = KeybindRegistry::load(SettingsStore::new(dir.path().join("none.json")));
        let order: Vec<Action> = registry.all().into_iter().map(|(a, _)| a).collect();
        assert_eq!(order, Action::ALL.to_vec());
    }
}
