mod settings_dialog;

pub use settings_dialog::SettingsDialog;

use crate::dispatch::ActionDispatcher;
use crate::input::{Action, CaptureOutcome, HeldKeys, InputController};
use crate::keys::KeyCode;
use crate::map_feed::{MapFeed, MapUpdate};
use eframe::egui;
use std::time::{Duration, Instant};

const JOYSTICK_POLL: Duration = Duration::from_millis(16);
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct MapViewerApp {
    controller: InputController,
    feed: Option<MapFeed>,
    texture: Option<egui::TextureHandle>,
    map_name: Option<String>,
    settings_dialog: SettingsDialog,
}

impl MapViewerApp {
    pub fn new(controller: InputController, feed: Option<MapFeed>) -> Self {
        Self {
            controller,
            feed,
            texture: None,
            map_name: None,
            settings_dialog: SettingsDialog::default(),
        }
    }

    pub fn controller(&self) -> &InputController {
        &self.controller
    }

    fn apply_map_update(&mut self, ctx: &egui::Context, update: MapUpdate) {
        let size = [update.image.width as usize, update.image.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &update.image.rgba);
        self.texture = Some(ctx.load_texture(&update.name, image, egui::TextureOptions::LINEAR));
        if let Ok(mut vp) = self.controller.dispatcher().viewport().lock() {
            vp.set_image_size(update.image.width as f64, update.image.height as f64);
        }
        tracing::info!(name = %update.name, "map displayed");
        self.map_name = Some(update.name);
    }

    fn status_line(&self) -> String {
        let zoom = self
            .controller
            .dispatcher()
            .viewport()
            .lock()
            .map(|vp| vp.zoom())
            .unwrap_or(1.0);
        let name = self.map_name.as_deref().unwrap_or("loading...");
        format!("Map: {name} | Zoom: {zoom:.1}x")
    }

    fn capture_frame(&mut self, ctx: &egui::Context) {
        let pressed: Vec<KeyCode> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => KeyCode::from_egui(*key),
                    _ => None,
                })
                .collect()
        });

        let mut outcome = CaptureOutcome::Pending;
        for key in pressed {
            outcome = self.controller.capture_key(key);
            if outcome.is_finished() {
                break;
            }
        }
        if !outcome.is_finished() {
            outcome = self.controller.capture_tick();
        }
        log_capture(outcome);

        if let Some(action) = self.controller.capture_target() {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.heading(format!(
                        "Press key or button for {action} (ESC to cancel)..."
                    ));
                });
            });
            ctx.request_repaint_after(JOYSTICK_POLL);
        } else {
            ctx.request_repaint();
        }
    }

    fn toolbar(&self, ctx: &egui::Context) {
        let dispatcher = self.controller.dispatcher();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Settings").clicked() {
                    dispatcher.dispatch(Action::ToggleSettings);
                }
                if ui.button("Refresh map").clicked() {
                    dispatcher.dispatch(Action::Refresh);
                }
            });
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.status_line());
        });
    }

    fn map_panel(&self, ctx: &egui::Context) {
        let dispatcher = self.controller.dispatcher();
        let use_scroll_wheel = self.controller.registry().settings().use_scroll_wheel;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let area = ui.max_rect();
                let response = ui.interact(area, ui.id().with("map"), egui::Sense::drag());

                let Ok(mut vp) = dispatcher.viewport().lock() else {
                    return;
                };
                vp.set_viewport_size(area.width() as f64, area.height() as f64);

                let navigable = !dispatcher.settings_visible() && !dispatcher.gate().is_suspended();
                if navigable && response.dragged() {
                    let delta = response.drag_delta();
                    vp.apply_pan(delta.x as f64, delta.y as f64);
                }

                let (x, y, w, h) = vp.image_rect().to_pixels();
                let image_rect = egui::Rect::from_min_size(
                    area.min + egui::vec2(x as f32, y as f32),
                    egui::vec2(w as f32, h as f32),
                );
                drop(vp);

                let painter = ui.painter_at(area);
                match &self.texture {
                    Some(tex) => {
                        painter.image(
                            tex.id(),
                            image_rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    None => {
                        painter.rect_filled(image_rect, 0.0, egui::Color32::DARK_GRAY);
                        painter.text(
                            image_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "Waiting for map...",
                            egui::FontId::proportional(20.0),
                            egui::Color32::WHITE,
                        );
                    }
                }

                if use_scroll_wheel && response.hovered() {
                    let scroll = ui.input(|i| i.raw_scroll_delta.y);
                    if scroll > 0.0 {
                        dispatcher.dispatch(Action::ZoomIn);
                    } else if scroll < 0.0 {
                        dispatcher.dispatch(Action::ZoomOut);
                    }
                }
            });
    }
}

/// The newest map from the feed, or `None` while the settings overlay is
/// open. Updates received meanwhile stay queued until it closes.
fn pending_map_update(feed: &MapFeed, dispatcher: &ActionDispatcher) -> Option<MapUpdate> {
    if dispatcher.settings_visible() {
        return None;
    }
    feed.try_latest()
}

fn log_capture(outcome: CaptureOutcome) {
    match outcome {
        CaptureOutcome::Bound { action, binding } => {
            tracing::info!(%action, %binding, "rebound");
        }
        CaptureOutcome::Cancelled { action } => {
            tracing::info!(%action, "rebind cancelled");
        }
        CaptureOutcome::Idle | CaptureOutcome::Pending => {}
    }
}

impl eframe::App for MapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (focused, close_requested) =
            ctx.input(|i| (i.viewport().focused.unwrap_or(true), i.viewport().close_requested()));
        self.controller
            .dispatcher()
            .gate()
            .set_window_focused(focused);

        if close_requested && self.controller.is_capturing() {
            log_capture(self.controller.cancel_rebind());
        }

        let pending = self
            .feed
            .as_ref()
            .and_then(|feed| pending_map_update(feed, self.controller.dispatcher()));
        if let Some(update) = pending {
            self.apply_map_update(ctx, update);
        }

        if self.controller.is_capturing() {
            self.capture_frame(ctx);
            return;
        }

        let dispatcher = self.controller.dispatcher().clone();
        if dispatcher.settings_visible() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            dispatcher.set_settings_visible(false);
        }

        let held = ctx.input(|i| HeldKeys::from_egui(&i.keys_down));
        let fired = self.controller.tick(&held, Instant::now());
        if !fired.is_empty() {
            ctx.request_repaint();
        }

        self.toolbar(ctx);
        self.map_panel(ctx);

        let mut dlg = std::mem::take(&mut self.settings_dialog);
        dlg.ui(ctx, &mut self.controller);
        self.settings_dialog = dlg;

        if self.controller.devices().devices().next().is_some() || self.controller.is_capturing() {
            ctx.request_repaint_after(JOYSTICK_POLL);
        } else {
            ctx.request_repaint_after(IDLE_POLL);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();
        self.feed = None;
    }
}
