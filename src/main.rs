use map_viewer::dispatch::{ActionDispatcher, MapRefresh, NoRefresh};
use map_viewer::gui::MapViewerApp;
use map_viewer::hotkey::HotkeyBridge;
use map_viewer::input::{
    default_joystick_backend, DeviceRegistry, InputController, InputGate, KeybindRegistry,
};
use map_viewer::map_feed::MapFeed;
use map_viewer::settings_store::{resolve_settings_path, SettingsStore};
use map_viewer::viewport::Viewport;
use map_viewer::{keyboard_hook, logging};

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings_path = resolve_settings_path()?;
    let registry = KeybindRegistry::load(SettingsStore::new(&settings_path));
    let settings = registry.settings().clone();

    let _log_guard = logging::init(
        settings.debug_logging,
        settings.log_file.as_ref().map(PathBuf::from),
    );
    tracing::info!(path = %settings_path.display(), "settings loaded");

    let resolution = settings.resolution;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Map Viewer")
            .with_inner_size([resolution.width as f32, resolution.height as f32])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Map Viewer",
        native_options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();

            let feed = {
                let ctx = ctx.clone();
                match MapFeed::from_settings(&settings.map_feed, move || ctx.request_repaint()) {
                    Ok(feed) => Some(feed),
                    Err(err) => {
                        tracing::error!(error = %format!("{err:#}"), "map feed disabled");
                        None
                    }
                }
            };
            let refresh: Arc<dyn MapRefresh> = match &feed {
                Some(feed) => Arc::new(feed.handle()),
                None => Arc::new(NoRefresh),
            };

            // Sized to the window; the first frame corrects it to the map area.
            let viewport = Viewport::new(
                settings.view,
                resolution.width as f64,
                resolution.height as f64,
            );

            let dispatcher = ActionDispatcher::new(viewport.shared(), InputGate::new(), refresh)
                .with_repaint(move || ctx.request_repaint());
            let bridge = HotkeyBridge::new(keyboard_hook::default_backend(), dispatcher.clone());
            let devices = DeviceRegistry::new(default_joystick_backend());
            let controller = InputController::new(registry, devices, bridge, dispatcher);

            Box::new(MapViewerApp::new(controller, feed))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
