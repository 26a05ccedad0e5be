use crate::input::{Action, InputController};
use crate::settings::{Resolution, RESOLUTION_OPTIONS};
use eframe::egui;

/// The settings overlay. Visibility lives on the dispatcher so the
/// `toggle_settings` binding and the hotkey hook see the same flag.
#[derive(Default)]
pub struct SettingsDialog {
    error: Option<String>,
}

impl SettingsDialog {
    pub fn ui(&mut self, ctx: &egui::Context, controller: &mut InputController) {
        let dispatcher = controller.dispatcher().clone();
        if !dispatcher.settings_visible() {
            self.error = None;
            return;
        }

        let mut open = true;
        let mut close = false;
        let mut rebind: Option<Action> = None;
        let mut resolution: Option<Resolution> = None;

        let settings = controller.registry().settings().clone();
        let mut use_scroll_wheel = settings.use_scroll_wheel;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Resolution");
                    egui::ComboBox::from_id_source("resolution")
                        .selected_text(settings.resolution.to_string())
                        .show_ui(ui, |ui| {
                            for option in RESOLUTION_OPTIONS {
                                if ui
                                    .selectable_label(
                                        option == settings.resolution,
                                        option.to_string(),
                                    )
                                    .clicked()
                                {
                                    resolution = Some(option);
                                }
                            }
                        });
                });
                ui.checkbox(&mut use_scroll_wheel, "Zoom with scroll wheel");

                ui.separator();
                ui.label("Keybinds (click to rebind)");
                egui::Grid::new("keybinds")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (action, binding) in controller.registry().all() {
                            ui.label(action.as_str());
                            if ui.button(binding.to_string()).clicked() {
                                rebind = Some(action);
                            }
                            ui.end_row();
                        }
                    });

                if let Some(err) = &self.error {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
                ui.separator();
                if ui.button("Close").clicked() {
                    close = true;
                }
            });

        if let Some(res) = resolution {
            match controller
                .registry_mut()
                .update_settings(|s| s.resolution = res)
            {
                Ok(()) => self.error = None,
                Err(err) => self.error = Some(err.to_string()),
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                res.width as f32,
                res.height as f32,
            )));
        }
        if use_scroll_wheel != settings.use_scroll_wheel {
            if let Err(err) = controller
                .registry_mut()
                .update_settings(|s| s.use_scroll_wheel = use_scroll_wheel)
            {
                self.error = Some(err.to_string());
            }
        }
        if let Some(action) = rebind {
            tracing::info!(%action, "waiting for new binding");
            controller.start_rebind(action);
        }
        if close || !open {
            dispatcher.set_settings_visible(false);
        }
    }
}
