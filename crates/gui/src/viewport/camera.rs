use glam::{Mat4, Vec3, Vec4};

use crate::viewport::mesh::Aabb;

/// Arc-ball camera for the preview (scene units are millimeters)
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.4,
            distance: 250.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(5.0, 5000.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        // scale with distance so panning feels the same at any zoom
        let offset = (right * dx + up * dy) * (self.distance / 500.0);
        self.target += offset;
    }

    /// Center on `aabb` and back off until it fits the view
    pub fn frame(&mut self, aabb: &Aabb) {
        if aabb.is_empty() {
            return;
        }
        self.target = aabb.center();
        let radius = (aabb.size().length() * 0.5).max(1.0);
        self.distance = (radius / (self.fov * 0.5).sin() * 1.1).clamp(5.0, 5000.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let near = (self.distance * 0.01).max(0.1);
        Mat4::perspective_rh_gl(self.fov, aspect, near, self.distance * 20.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a 3D point to screen coords plus view depth (larger is farther)
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<(egui::Pos2, f32)> {
        let aspect = rect.width() / rect.height();
        let vp = self.view_projection(aspect);
        let p = vp * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let screen_x = rect.center().x + ndc.x * rect.width() * 0.5;
        let screen_y = rect.center().y - ndc.y * rect.height() * 0.5;
        Some((egui::pos2(screen_x, screen_y), p.w))
    }
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn target_projects_to_center() {
        let cam = ArcBallCamera::new();
        let (pos, depth) = cam.project(cam.target, rect()).unwrap();
        assert!((pos.x - 400.0).abs() < 1e-2);
        assert!((pos.y - 300.0).abs() < 1e-2);
        assert!((depth - cam.distance).abs() < 1e-2);
    }

    #[test]
    fn point_behind_camera_is_culled() {
        let cam = ArcBallCamera::new();
        let behind = cam.eye_position() + (cam.eye_position() - cam.target);
        assert!(cam.project(behind, rect()).is_none());
    }

    #[test]
    fn frame_centers_on_box() {
        let mut cam = ArcBallCamera::new();
        let mut aabb = Aabb::empty();
        aabb.include(Vec3::new(0.0, 0.0, 0.0));
        aabb.include(Vec3::new(100.0, 200.0, 50.0));
        cam.frame(&aabb);
        assert_eq!(cam.target, Vec3::new(50.0, 100.0, 25.0));
        assert!(cam.distance > 100.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = ArcBallCamera::new();
        cam.rotate(0.0, 1000.0);
        assert!(cam.pitch <= 1.5);
    }
}
