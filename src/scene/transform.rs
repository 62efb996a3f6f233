use glam::{Affine3A, Mat3, Quat, Vec3};

/// Position, rotation and scale of a node relative to its parent.
///
/// Interaction code edits the public TRS fields directly. The cached
/// matrices are only refreshed by the propagation pass in
/// [`transform_system`](crate::scene::transform_system), which uses
/// [`update_local_matrix`](Self::update_local_matrix) to skip untouched nodes.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    /// TRS the cached local matrix was built from; `None` forces a rebuild.
    composed_from: Option<(Vec3, Quat, Vec3)>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self::from_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            composed_from: None,
        }
    }

    /// Rebuilds the cached local matrix when TRS moved since the last call.
    ///
    /// Returns whether the cache changed.
    pub fn update_local_matrix(&mut self) -> bool {
        let current = (self.position, self.rotation, self.scale);
        if self.composed_from == Some(current) {
            return false;
        }
        self.local_matrix = self.compose();
        self.composed_from = Some(current);
        true
    }

    /// Local matrix from the current TRS, ignoring the cache.
    #[inline]
    #[must_use]
    pub fn compose(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Turns about the parent-space vertical axis, keeping any tilt.
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.rotation = (Quat::from_rotation_y(angle) * self.rotation).normalize();
    }

    /// Points local -Z at `target`; both arguments are in parent space.
    ///
    /// Leaves the rotation alone when `target` lies along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(back) = (self.position - target).try_normalize() else {
            return;
        };
        let side = up.cross(back);
        if side.length_squared() < 1e-4 {
            return;
        }
        let right = side.normalize();
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, back.cross(right), back));
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Forces the next [`update_local_matrix`](Self::update_local_matrix) to rebuild.
    pub fn mark_dirty(&mut self) {
        self.composed_from = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
