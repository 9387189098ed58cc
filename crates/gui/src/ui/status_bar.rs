use egui::Ui;

use crate::state::AppState;
use crate::text::fonts::font_label;
use crate::units::scene_to_cm;

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let mode = state.modes.active();
        ui.label(mode.display_name());
        ui.separator();

        let triangles: usize = state
            .preview
            .meshes()
            .iter()
            .map(|(_, mesh)| mesh.triangle_count())
            .sum();
        ui.weak(format!("Triangles: {triangles}"));

        if let Some(aabb) = state.preview.aabb() {
            let size = aabb.size();
            ui.weak(format!(
                "{:.1} × {:.1} × {:.1} cm",
                scene_to_cm(size.x),
                scene_to_cm(size.y),
                scene_to_cm(size.z)
            ));
        }

        if let Some(reference) = state.model_reference() {
            ui.separator();
            ui.label(format!("Model: {reference}"));
        } else if let Some(message) = state.generation.backend_message(mode) {
            ui.separator();
            ui.weak(message);
        }

        if state.is_loading() {
            ui.separator();
            ui.colored_label(egui::Color32::from_rgb(255, 200, 100), "Generating…");
        }

        if let Some(font) = state.required_fonts().first() {
            ui.separator();
            match state.fonts.typeface(font) {
                Some(tf) => ui.weak(format!("Font: {}", tf.family)),
                None if state.fonts.is_loading() => ui.weak(format!("Loading {}…", font_label(font))),
                None => ui.weak(format!("Font unavailable: {}", font_label(font))),
            };
        }

        // Right-aligned backend address
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(&state.settings.backend_url);
        });
    });
}
