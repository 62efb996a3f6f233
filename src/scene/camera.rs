use glam::{Affine3A, Vec2, Vec3};

use crate::math::Ray;

/// Perspective camera projection.
///
/// The camera's placement lives on its scene node; methods taking a
/// `world` matrix expect that node's world transform (rotation + translation,
/// no scale). Screen coordinates are pixels with the origin at the top-left.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view, radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Creates a perspective camera. `fov_degrees` is the vertical field of view.
    #[must_use]
    pub fn new_perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Updates the aspect ratio from a viewport size.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        if viewport.y > 0.0 {
            self.aspect = viewport.x / viewport.y;
        }
    }

    /// Converts pixel coordinates to normalized device coordinates in [-1, 1].
    #[must_use]
    pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
        let size = viewport.max(Vec2::ONE);
        Vec2::new(screen.x / size.x * 2.0 - 1.0, 1.0 - screen.y / size.y * 2.0)
    }

    /// Builds a world-space ray through an NDC position.
    #[must_use]
    pub fn ray_from_ndc(&self, world: &Affine3A, ndc: Vec2) -> Ray {
        let tan_half = (self.fov * 0.5).tan();
        let view_dir = Vec3::new(ndc.x * tan_half * self.aspect, ndc.y * tan_half, -1.0);
        let origin = world.translation.into();
        Ray::new(origin, world.transform_vector3(view_dir))
    }

    /// Builds a world-space ray through a pixel position.
    #[must_use]
    pub fn screen_ray(&self, world: &Affine3A, screen: Vec2, viewport: Vec2) -> Ray {
        self.ray_from_ndc(world, Self::screen_to_ndc(screen, viewport))
    }

    /// World-space viewing direction.
    #[must_use]
    pub fn forward(world: &Affine3A) -> Vec3 {
        world.transform_vector3(Vec3::NEG_Z).normalize_or_zero()
    }

    /// World-space right axis.
    #[must_use]
    pub fn right(world: &Affine3A) -> Vec3 {
        world.transform_vector3(Vec3::X).normalize_or_zero()
    }

    /// Projects a world point to pixel coordinates; `None` behind the camera.
    #[must_use]
    pub fn project(&self, world: &Affine3A, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let view = world.inverse().transform_point3(point);
        if view.z >= 0.0 {
            return None;
        }
        let tan_half = (self.fov * 0.5).tan();
        let depth = -view.z;
        let ndc = Vec2::new(view.x / (depth * tan_half * self.aspect), view.y / (depth * tan_half));
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * viewport.x, (1.0 - ndc.y) * 0.5 * viewport.y))
    }

    /// Size of one pixel, in world units, on a screen-parallel plane at `depth`.
    #[must_use]
    pub fn world_units_per_pixel(&self, depth: f32, viewport_height: f32) -> f32 {
        2.0 * depth * (self.fov * 0.5).tan() / viewport_height.max(1.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(50.0, 1.0, 0.01, 100.0)
    }
}
