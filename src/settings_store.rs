use crate::error::ViewerError;
use crate::settings::Settings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "map_viewer_config.json";
pub const SETTINGS_PATH_ENV: &str = "MAP_VIEWER_CONFIG";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

/// Settings file location: `$MAP_VIEWER_CONFIG` if set, otherwise next to
/// the executable.
pub fn resolve_settings_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

/// Owns the location of the settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, substituting defaults for a missing, unreadable
    /// or malformed file. Never fails.
    pub fn load_or_default(&self) -> Settings {
        match self.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                tracing::info!(path = %self.path.display(), "no settings file; using defaults");
                Settings::default()
            }
            Err(err) => {
                let err = ViewerError::ConfigLoad {
                    path: self.path.clone(),
                    reason: format!("{err:#}"),
                };
                tracing::warn!(%err, "using default settings");
                Settings::default()
            }
        }
    }

    pub fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read settings file {}", self.path.display()))?;

        if content.trim().is_empty() {
            return Ok(Some(Settings::default()));
        }

        Settings::from_json(&content)
            .with_context(|| format!("deserialize settings file {}", self.path.display()))
            .map(Some)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("create settings parent folder {}", parent.display())
                })?;
            }
        }

        let json = settings.to_json().context("serialize settings")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write settings file {}", self.path.display()))
    }
}
