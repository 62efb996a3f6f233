use glam::Vec3;

use crate::scene::BoundingBox;

/// Camera placement that frames a bounding volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Point the camera looks at (bounds centre)
    pub center: Vec3,
    /// Distance from `center` to the camera
    pub distance: f32,
    /// Camera position along `-view_dir` from the centre
    pub position: Vec3,
}

/// Computes a camera pose that keeps `bounds` fully in view.
///
/// The bounding sphere is fitted against the narrower of the vertical and
/// horizontal fields of view, then pushed back by `margin`.
#[must_use]
pub fn frame_bounds(
    bounds: &BoundingBox,
    fov_y: f32,
    aspect: f32,
    margin: f32,
    min_radius: f32,
    view_dir: Vec3,
) -> CameraFrame {
    let center = bounds.center();
    let radius = bounds.radius().max(min_radius);

    let half_y = fov_y * 0.5;
    let half_x = (half_y.tan() * aspect.max(f32::EPSILON)).atan();
    let half_fit = half_y.min(half_x);

    let distance = radius / half_fit.sin() * margin;
    let dir = view_dir.try_normalize().unwrap_or(Vec3::NEG_Z);

    CameraFrame {
        center,
        distance,
        position: center - dir * distance,
    }
}
