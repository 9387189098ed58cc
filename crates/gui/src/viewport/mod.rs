//! 3D preview panel.
//!
//! Triangles from the preview cache are projected on the CPU, flat shaded and
//! painted back to front as one `egui::Mesh`. The ground grid and axis labels
//! are overlays; they never enter the scene tree, so export never sees them.

mod camera;
mod overlays;
pub use fast3dprint_lib::viewport::mesh;

use egui::{Color32, Ui};
use glam::Vec3;
use shared::GenerationMode;

use crate::state::AppState;
use camera::ArcBallCamera;
use mesh::face_normal;

/// Light direction relative to the camera (towards the light)
const KEY_LIGHT: Vec3 = Vec3::new(0.35, 0.6, 0.7);
const AMBIENT: f32 = 0.3;

/// 3D viewport panel
pub struct ViewportPanel {
    camera: ArcBallCamera,
    /// Mode the camera was last framed for
    framed_for: Option<GenerationMode>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            framed_for: None,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
        self.framed_for = None;
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // ── Camera controls ─────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.camera.rotate(-delta.x * 0.5, delta.y * 0.5);
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.camera.pan(-delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.zoom(scroll * 0.002);
            }
        }
        if response.double_clicked() {
            self.framed_for = None;
        }

        // ── Scene ─────────────────────────────
        state.scene();
        let mode = state.modes.active();
        if self.framed_for != Some(mode) {
            if let Some(aabb) = state.preview.aabb() {
                self.camera.frame(&aabb);
            }
            self.framed_for = Some(mode);
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        let viewport = &state.settings.viewport;
        let painter = ui.painter_at(rect);
        let [r, g, b] = viewport.background_color;
        painter.rect_filled(rect, 0.0, Color32::from_rgb(r, g, b));

        if viewport.show_grid {
            overlays::draw_grid(&painter, rect, &self.camera);
        }

        let triangles: Vec<[Vec3; 3]> = state
            .preview
            .meshes()
            .iter()
            .flat_map(|(_, mesh)| mesh.triangles().collect::<Vec<_>>())
            .collect();
        painter.add(egui::Shape::mesh(self.shade(&triangles, rect, viewport.model_color)));

        overlays::draw_axis_labels(&painter, rect, &self.camera);
        overlays::draw_camera_info(&painter, rect, &self.camera);

        let remote = state
            .preview
            .scene()
            .and_then(|scene| scene.remote_models().first().map(|url| url.to_string()));
        if let Some(reference) = remote {
            overlays::draw_remote_model_hint(&painter, rect, &reference);
        } else if state.is_loading() {
            overlays::draw_center_message(&painter, rect, "Generating…");
        }
    }

    /// Project, cull, shade and depth-sort triangles into one mesh
    fn shade(&self, triangles: &[[Vec3; 3]], rect: egui::Rect, color: [u8; 3]) -> egui::Mesh {
        let eye = self.camera.eye_position();
        let view = self.camera.view_matrix();
        let light = view
            .inverse()
            .transform_vector3(KEY_LIGHT)
            .normalize_or_zero();

        let mut projected: Vec<(f32, [egui::Pos2; 3], Color32)> = triangles
            .iter()
            .filter_map(|tri| {
                let normal = face_normal(tri);
                let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
                // back faces
                if normal.dot(eye - centroid) <= 0.0 {
                    return None;
                }
                let mut pts = [egui::Pos2::ZERO; 3];
                let mut depth = 0.0;
                for (i, v) in tri.iter().enumerate() {
                    let (p, w) = self.camera.project(*v, rect)?;
                    pts[i] = p;
                    depth += w;
                }
                let intensity = AMBIENT + (1.0 - AMBIENT) * normal.dot(light).max(0.0);
                let [r, g, b] = color.map(|c| (c as f32 * intensity).min(255.0) as u8);
                Some((depth, pts, Color32::from_rgb(r, g, b)))
            })
            .collect();

        // painter's algorithm: far first
        projected.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut mesh = egui::Mesh::default();
        for (_, pts, color) in projected {
            let base = mesh.vertices.len() as u32;
            for p in pts {
                mesh.colored_vertex(p, color);
            }
            mesh.add_triangle(base, base + 1, base + 2);
        }
        mesh
    }
}
