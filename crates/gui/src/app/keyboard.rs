//! Keyboard shortcut handling

use eframe::egui;
use shared::GenerationMode;

use crate::state::AppState;
use crate::ui::parameters;
use crate::viewport::ViewportPanel;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, state: &mut AppState, viewport: &mut ViewportPanel) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (export, generate, reset_view, mode) = ctx.input(|i| {
        let mode = [egui::Key::Num1, egui::Key::Num2, egui::Key::Num3, egui::Key::Num4]
            .iter()
            .zip(GenerationMode::all())
            .find(|(key, _)| i.key_pressed(**key) && !i.modifiers.command)
            .map(|(_, mode)| *mode);
        (
            // Ctrl+E: export STL
            i.modifiers.command && i.key_pressed(egui::Key::E),
            // Ctrl+Enter: generate
            i.modifiers.command && i.key_pressed(egui::Key::Enter),
            // F: reframe the model
            i.key_pressed(egui::Key::F) && !i.modifiers.command,
            mode,
        )
    });

    if export {
        state.export.fire();
    }
    if generate && state.can_generate() {
        parameters::request_generation(state);
    }
    if reset_view {
        viewport.reset_camera();
    }
    if let Some(mode) = mode {
        state.set_mode(mode);
    }
}
