//! Application menu bar and settings window

use eframe::egui;

use crate::state::{AppSettings, AppState, ModeState};
use crate::viewport::ViewportPanel;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        if ui.button("Open parameters…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open parameters")
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                match ModeState::load_from(&path) {
                    Ok(modes) => {
                        state.replace_params(modes.params);
                        tracing::info!("Loaded parameters from {}", path.display());
                    }
                    Err(e) => {
                        tracing::error!("Failed to load parameters: {e}");
                        state.notice = Some(e.to_string());
                    }
                }
            }
        }
        if ui.button("Save parameters…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Save parameters")
                .add_filter("JSON", &["json"])
                .set_file_name("params.json")
                .save_file()
            {
                match serde_json::to_string_pretty(state.params()) {
                    Ok(json) => {
                        if let Err(e) = std::fs::write(&path, json) {
                            tracing::error!("Failed to write parameters: {e}");
                        } else {
                            tracing::info!("Saved parameters to {}", path.display());
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize parameters: {e}"),
                }
            }
        }
        ui.separator();
        if ui.button("Export STL…").clicked() {
            ui.close_menu();
            state.export.fire();
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button("View", |ui| {
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
        ui.checkbox(&mut state.settings.viewport.show_grid, "Grid");
    });
}

pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    if ui.button("Settings").clicked() {
        state.show_settings_window = true;
    }
}

pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_settings_window;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(true)
        .default_width(380.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_backend_settings(ui, state);
                show_viewport_settings(ui, state);
                show_ui_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open && state.show_settings_window;
}

fn show_backend_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Backend");
    ui.horizontal(|ui| {
        ui.label("Address");
        ui.text_edit_singleline(&mut state.settings.backend_url);
    });
    ui.horizontal(|ui| {
        ui.label("Steps");
        ui.add(
            egui::DragValue::new(&mut state.settings.quality.steps)
                .speed(1)
                .range(1..=500),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Guidance");
        ui.add(
            egui::DragValue::new(&mut state.settings.quality.guidance)
                .speed(0.1)
                .range(0.0..=50.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Export file name");
        ui.text_edit_singleline(&mut state.settings.export_file_name);
    });
    ui.add_space(10.0);
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Viewport");
    let viewport = &mut state.settings.viewport;
    for (label, rgb) in [
        ("Background", &mut viewport.background_color),
        ("Model", &mut viewport.model_color),
    ] {
        ui.horizontal(|ui| {
            ui.label(label);
            let mut color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
            if ui.color_edit_button_srgba(&mut color).changed() {
                *rgb = [color.r(), color.g(), color.b()];
            }
        });
    }
    ui.checkbox(&mut viewport.show_grid, "Show grid");
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.apply_settings();
        }
        if ui.button("Reset").clicked() {
            state.settings = AppSettings::default();
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
}
