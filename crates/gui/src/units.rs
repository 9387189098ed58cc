//! Centimeter → scene unit conversion.
//!
//! Users author every dimension in centimeters. Geometry is built in scene
//! units where 1 unit = 1 mm, which is what slicers assume for STL files.

/// Scene units per centimeter
pub const UNIT_SCALE: f32 = 10.0;

/// Convert a user-entered centimeter value to scene units (millimeters).
pub fn cm_to_scene(cm: f64) -> f32 {
    cm as f32 * UNIT_SCALE
}

/// Convert scene units back to centimeters (for display).
pub fn scene_to_cm(units: f32) -> f64 {
    (units / UNIT_SCALE) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cm_to_scene_scales_by_ten() {
        assert_eq!(cm_to_scene(1.0), 10.0);
        assert_eq!(cm_to_scene(5.0), 50.0);
        assert_eq!(cm_to_scene(0.25), 2.5);
    }

    #[test]
    fn scene_to_cm_inverts() {
        assert!((scene_to_cm(cm_to_scene(7.3)) - 7.3).abs() < 1e-5);
    }
}
