//! Parameters panel: mode selector plus the active mode's inputs

use egui::{DragValue, TextEdit, Ui};
use shared::{GenerationMode, ShapeKind, TextSpec};

use crate::state::images::{display_name, IMAGE_EXTENSIONS};
use crate::state::{AppState, ImageSlot};
use crate::text::fonts::font_label;
use crate::text::FONT_CHOICES;

/// Smallest dimension the inputs accept, in centimeters
const MIN_CM: f64 = 0.1;
const MAX_CM: f64 = 200.0;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Fast3dPrint");
    ui.add_space(4.0);

    ui.horizontal_wrapped(|ui| {
        let active = state.modes.active();
        for mode in GenerationMode::all() {
            if ui.selectable_label(active == *mode, mode.display_name()).clicked() {
                state.set_mode(*mode);
            }
        }
    });
    ui.separator();

    match state.modes.active() {
        GenerationMode::Ai => show_ai(ui, state),
        GenerationMode::Text => {
            if let Some(font) = text_inputs(ui, "text", &mut state.params_mut().text) {
                state.fonts.request(&font);
            }
        }
        GenerationMode::Image => show_images(ui, state),
        GenerationMode::Shapes => show_shapes(ui, state),
    }

    ui.separator();
    show_actions(ui, state);
}

/// Dispatch the active mode's request; errors surface as a notice
pub fn request_generation(state: &mut AppState) {
    match state.generate() {
        Ok(Some(ticket)) => tracing::debug!("request #{} started", ticket.seq),
        Ok(None) => {}
        Err(e) => state.notice = Some(e.to_string()),
    }
}

fn show_ai(ui: &mut Ui, state: &mut AppState) {
    ui.label("Describe the object");
    ui.add(
        TextEdit::multiline(&mut state.params_mut().ai.prompt)
            .hint_text("a low-poly fox")
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
}

fn show_images(ui: &mut Ui, state: &mut AppState) {
    for slot in [ImageSlot::Front, ImageSlot::Back] {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(slot.label());
                if slot.is_required() {
                    ui.colored_label(egui::Color32::from_rgb(255, 120, 120), "*");
                }
            });
            let field = slot.field(&mut state.params_mut().image);
            ui.horizontal(|ui| {
                match field.as_deref() {
                    Some(path) => ui.label(display_name(path)).on_hover_text(path),
                    None => ui.weak("No file chosen"),
                };
                if ui.button("Choose…").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title(slot.label())
                        .add_filter("Images", IMAGE_EXTENSIONS)
                        .pick_file()
                    {
                        *field = Some(path.to_string_lossy().into_owned());
                    }
                }
                if field.is_some() && ui.small_button("✖").on_hover_text("Clear").clicked() {
                    *field = None;
                }
            });
        });
    }
    ui.weak("Tip: drop image files onto the window");
}

fn show_shapes(ui: &mut Ui, state: &mut AppState) {
    let mut picked = None;
    let shapes = &mut state.params_mut().shapes;

    ui.horizontal(|ui| {
        ui.label("Shape");
        egui::ComboBox::from_id_salt("shape_kind")
            .selected_text(shapes.shape.kind.display_name())
            .show_ui(ui, |ui| {
                for kind in ShapeKind::all() {
                    ui.selectable_value(&mut shapes.shape.kind, *kind, kind.display_name());
                }
            });
    });

    egui::Grid::new("shape_dims").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("Width", &mut shapes.shape.width),
            ("Height", &mut shapes.shape.height),
            ("Depth", &mut shapes.shape.depth),
        ] {
            ui.label(label);
            ui.add(cm_value(value));
            ui.end_row();
        }
    });

    if shapes.shape.kind == ShapeKind::Trophy {
        ui.add_space(6.0);
        ui.collapsing("Plaque text", |ui| {
            picked = picked.take().or(text_inputs(ui, "plaque", &mut shapes.plaque_text));
        });
        ui.collapsing("Base text", |ui| {
            picked = picked.take().or(text_inputs(ui, "base", &mut shapes.base_text));
        });
    }

    if let Some(font) = picked {
        state.fonts.request(&font);
    }
}

/// Content, font and size inputs shared by every text record.
/// Returns the font the user picked this frame, if any.
fn text_inputs(ui: &mut Ui, id: &str, text: &mut TextSpec) -> Option<String> {
    let mut picked = None;
    ui.add(
        TextEdit::singleline(&mut text.content)
            .hint_text("Text")
            .desired_width(f32::INFINITY),
    );
    ui.horizontal(|ui| {
        ui.label("Font");
        egui::ComboBox::from_id_salt(format!("{id}_font"))
            .selected_text(font_label(&text.font).to_string())
            .show_ui(ui, |ui| {
                for choice in FONT_CHOICES {
                    let option =
                        ui.selectable_value(&mut text.font, choice.url.to_string(), choice.label);
                    if option.clicked() {
                        picked = Some(choice.url.to_string());
                    }
                }
            });
    });
    egui::Grid::new(format!("{id}_dims")).num_columns(2).show(ui, |ui| {
        ui.label("Size");
        ui.add(cm_value(&mut text.size));
        ui.end_row();
        ui.label("Depth");
        ui.add(DragValue::new(&mut text.depth).speed(0.05).range(0.01..=MAX_CM).suffix(" cm"));
        ui.end_row();
        ui.label("Spacing");
        ui.add(DragValue::new(&mut text.letter_spacing).speed(0.01).range(-5.0..=5.0).suffix(" cm"));
        ui.end_row();
    });
    picked
}

fn cm_value(value: &mut f64) -> DragValue<'_> {
    DragValue::new(value)
        .speed(0.1)
        .range(MIN_CM..=MAX_CM)
        .max_decimals(2)
        .suffix(" cm")
}

fn show_actions(ui: &mut Ui, state: &mut AppState) {
    if state.modes.active().uses_backend() {
        ui.horizontal(|ui| {
            let button = ui.add_enabled(state.can_generate(), egui::Button::new("Generate"));
            if button.clicked() {
                request_generation(state);
            }
            if state.is_loading() {
                ui.spinner();
                ui.weak("Generating…");
            }
        });
        if let Some(message) = state.generation.backend_message(state.modes.active()) {
            ui.weak(message);
        }
    }

    ui.add_space(4.0);
    if ui.button("⬇ Export STL").clicked() {
        state.export.fire();
    }
}
