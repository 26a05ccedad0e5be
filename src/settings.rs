use crate::input::KeybindTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Window resolutions offered by the settings menu.
pub const RESOLUTION_OPTIONS: [Resolution; 4] = [
    Resolution::new(1920, 1080),
    Resolution::new(1600, 900),
    Resolution::new(1366, 768),
    Resolution::new(1280, 720),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        RESOLUTION_OPTIONS[0]
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pan/zoom tuning for the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Pixels moved per pan action.
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f64,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f64,
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
}

fn default_pan_speed() -> f64 {
    20.0
}

fn default_zoom_step() -> f64 {
    0.1
}

fn default_min_zoom() -> f64 {
    0.2
}

fn default_max_zoom() -> f64 {
    3.0
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            pan_speed: default_pan_speed(),
            zoom_step: default_zoom_step(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
        }
    }
}

impl ViewSettings {
    /// Replace nonsensical values with defaults and order the zoom range.
    pub fn sanitize(&mut self) {
        if !(self.pan_speed.is_finite() && self.pan_speed > 0.0) {
            self.pan_speed = default_pan_speed();
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            self.zoom_step = default_zoom_step();
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            self.min_zoom = default_min_zoom();
        }
        if !(self.max_zoom.is_finite() && self.max_zoom > 0.0) {
            self.max_zoom = default_max_zoom();
        }
        if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFeedSettings {
    /// Page scraped for the link to the current map image.
    #[serde(default = "default_page_url")]
    pub page_url: String,
    /// Seconds between automatic checks for a new map.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
}

fn default_page_url() -> String {
    "https://combatbox.net/en/".into()
}

fn default_check_interval() -> u64 {
    30
}

impl Default for MapFeedSettings {
    fn default() -> Self {
        Self {
            page_url: default_page_url(),
            check_interval_secs: default_check_interval(),
        }
    }
}

/// Everything persisted in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub resolution: Resolution,
    /// Zoom with the mouse wheel. Defaults to `true`.
    #[serde(default = "default_use_scroll_wheel")]
    pub use_scroll_wheel: bool,
    #[serde(default)]
    pub keybinds: KeybindTable,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Also write logs to this file.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub map_feed: MapFeedSettings,
}

fn default_use_scroll_wheel() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            use_scroll_wheel: default_use_scroll_wheel(),
            keybinds: KeybindTable::default(),
            debug_logging: false,
            log_file: None,
            view: ViewSettings::default(),
            map_feed: MapFeedSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let mut settings: Settings = serde_json::from_str(content)?;
        settings.view.sanitize();
        if settings.map_feed.check_interval_secs == 0 {
            settings.map_feed.check_interval_secs = default_check_interval();
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
