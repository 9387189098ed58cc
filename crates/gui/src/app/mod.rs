//! Main application module

mod keyboard;
mod menus;
mod styles;

use eframe::egui;

use crate::state::{is_supported_image, AppState, ImageSlot};
use crate::ui::{parameters, status_bar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct Fast3dApp {
    state: AppState,
    viewport: ViewportPanel,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl Fast3dApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        // Apply initial styles with font size from settings
        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let last_font_size = state.settings.ui.font_size;
        Self {
            state,
            viewport: ViewportPanel::new(),
            last_font_size,
        }
    }

    /// Save the exported bytes where the user picks; cancelling discards them.
    fn handle_export(&mut self) {
        let bytes = match self.state.take_export() {
            None => return,
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                tracing::error!("STL export failed: {e}");
                self.state.notice = Some(format!("Export failed: {e}"));
                return;
            }
        };

        let Some(path) = rfd::FileDialog::new()
            .set_title("Export STL")
            .add_filter("STL", &["stl"])
            .set_file_name(&self.state.settings.export_file_name)
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, &bytes) {
            Ok(()) => tracing::info!("Saved {} bytes to {}", bytes.len(), path.display()),
            Err(e) => {
                tracing::error!("Failed to write STL: {e}");
                self.state.notice = Some(format!("Could not save {}: {e}", path.display()));
            }
        }
    }

    /// Dropped image files fill the front slot first, then the back slot
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() || self.state.modes.active() != shared::GenerationMode::Image {
            return;
        }

        let mut slots = [ImageSlot::Front, ImageSlot::Back].into_iter();
        for path in dropped.into_iter().filter_map(|f| f.path) {
            if !is_supported_image(&path) {
                tracing::warn!("Ignoring dropped file {}", path.display());
                continue;
            }
            let Some(slot) = slots.next() else { break };
            *slot.field(&mut self.state.params_mut().image) = Some(path.to_string_lossy().into_owned());
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.state.notice.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(6.0);
                ui.vertical_centered(|ui| {
                    dismissed = ui.button("OK").clicked();
                });
            });
        if dismissed {
            self.state.notice = None;
        }
    }
}

impl eframe::App for Fast3dApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        self.state.poll();
        if self.state.is_loading() || self.state.fonts.is_loading() {
            // results arrive off the UI thread
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.handle_dropped_files(ctx);
        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Left panel: parameters ───────────────────────────
        egui::SidePanel::left("parameters")
            .default_width(300.0)
            .width_range(240.0..=460.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    parameters::show(ui, &mut self.state);
                });
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state);
            });

        self.show_notice(ctx);
        self.handle_export();
    }
}
