//! Viewport overlay drawing (grid, axis labels, camera info, messages)

use egui::{Color32, Painter};
use glam::Vec3;

use crate::units::cm_to_scene;

use super::camera::ArcBallCamera;

/// Grid cell: 1 cm
const GRID_STEP_CM: f64 = 1.0;
/// Lines on each side of the origin
const GRID_RANGE: i32 = 15;

/// Ground grid on the y = 0 plane
pub fn draw_grid(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera) {
    let step = cm_to_scene(GRID_STEP_CM);
    let extent = step * GRID_RANGE as f32;
    let minor = egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 150, 40));
    let major = egui::Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 150, 90));

    for i in -GRID_RANGE..=GRID_RANGE {
        let t = i as f32 * step;
        let stroke = if i % 5 == 0 { major } else { minor };
        for (a, b) in [
            (Vec3::new(t, 0.0, -extent), Vec3::new(t, 0.0, extent)),
            (Vec3::new(-extent, 0.0, t), Vec3::new(extent, 0.0, t)),
        ] {
            if let (Some((pa, _)), Some((pb, _))) = (camera.project(a, rect), camera.project(b, rect)) {
                painter.line_segment([pa, pb], stroke);
            }
        }
    }
}

/// Draw axis labels in the viewport
pub fn draw_axis_labels(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera) {
    let reach = cm_to_scene(GRID_STEP_CM) * (GRID_RANGE as f32 + 1.0);
    let labels = [
        (Vec3::X * reach, "X", Color32::from_rgb(220, 70, 70)),
        (Vec3::Y * reach, "Y", Color32::from_rgb(70, 200, 70)),
        (Vec3::Z * reach, "Z", Color32::from_rgb(70, 110, 220)),
    ];

    for (pos, label, color) in &labels {
        if let Some((screen, _)) = camera.project(*pos, rect) {
            if rect.contains(screen) {
                painter.text(
                    screen,
                    egui::Align2::LEFT_BOTTOM,
                    *label,
                    egui::FontId::monospace(12.0),
                    *color,
                );
            }
        }
    }
}

pub fn draw_camera_info(painter: &Painter, rect: egui::Rect, camera: &ArcBallCamera) {
    let overlay_rect = egui::Rect::from_min_size(
        egui::pos2(rect.right() - 150.0, rect.top() + 4.0),
        egui::vec2(146.0, 44.0),
    );
    painter.rect_filled(
        overlay_rect,
        4.0,
        Color32::from_rgba_premultiplied(0, 0, 0, 140),
    );
    painter.text(
        overlay_rect.min + egui::vec2(6.0, 4.0),
        egui::Align2::LEFT_TOP,
        format!(
            "Dist: {:.0} mm\nYaw: {:.0}  Pitch: {:.0}",
            camera.distance,
            camera.yaw.to_degrees(),
            camera.pitch.to_degrees(),
        ),
        egui::FontId::monospace(10.0),
        Color32::from_rgb(160, 160, 170),
    );
}

/// Generated models are fetched by reference, not rendered
pub fn draw_remote_model_hint(painter: &Painter, rect: egui::Rect, reference: &str) {
    draw_center_message(painter, rect, &format!("Model ready\n{reference}"));
}

pub fn draw_center_message(painter: &Painter, rect: egui::Rect, message: &str) {
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::proportional(14.0),
        Color32::from_rgb(190, 200, 215),
    );
}
