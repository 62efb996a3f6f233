use bitflags::bitflags;
use glam::{Vec2, Vec3};

use crate::config::OrbitSettings;
use crate::controls::framing::CameraFrame;
use crate::input::{Input, MouseButton};
use crate::scene::transform::Transform;

bitflags! {
    /// Orbit gestures currently allowed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct OrbitFeatures: u8 {
        const ROTATE = 1 << 0;
        const PAN    = 1 << 1;
        const ZOOM   = 1 << 2;
    }
}

/// Orbit camera: left-drag rotates, right-drag pans, scroll zooms.
pub struct OrbitControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,

    pub center: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    enabled: OrbitFeatures,
    rotate_delta: Vec2,
}

impl OrbitControls {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self::from_settings(&OrbitSettings::default(), center, radius)
    }

    #[must_use]
    pub fn from_settings(settings: &OrbitSettings, center: Vec3, radius: f32) -> Self {
        Self {
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            pan_speed: settings.pan_speed,
            damping_factor: settings.damping_factor,
            enable_damping: settings.enable_damping,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,

            center,
            radius: radius.clamp(settings.min_distance, settings.max_distance),
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,

            enabled: OrbitFeatures::all(),
            rotate_delta: Vec2::ZERO,
        }
    }

    /// Disables rotate, pan and zoom, and drops any pending damped motion.
    pub fn suspend(&mut self) {
        self.enabled = OrbitFeatures::empty();
        self.rotate_delta = Vec2::ZERO;
    }

    /// Re-enables rotate, pan and zoom.
    pub fn resume(&mut self) {
        self.enabled = OrbitFeatures::all();
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.enabled.is_empty()
    }

    #[must_use]
    pub fn features(&self) -> OrbitFeatures {
        self.enabled
    }

    pub fn set_features(&mut self, features: OrbitFeatures) {
        self.enabled = features;
        if !features.contains(OrbitFeatures::ROTATE) {
            self.rotate_delta = Vec2::ZERO;
        }
    }

    /// Re-targets the orbit at a fitted frame, keeping the current angles.
    pub fn apply_frame(&mut self, frame: &CameraFrame) {
        self.center = frame.center;
        if frame.distance > self.max_distance {
            self.max_distance = frame.distance;
        }
        self.radius = frame.distance.clamp(self.min_distance, self.max_distance);
        self.rotate_delta = Vec2::ZERO;
    }

    /// Offset from the orbit centre to the camera for the current angles.
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }

    /// Applies this frame's input and writes the camera transform.
    ///
    /// Does nothing while suspended, so the camera stays exactly where the
    /// manipulation session found it.
    pub fn update(&mut self, transform: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        if self.is_suspended() {
            return;
        }

        let screen_height = input.screen_size().y.max(1.0);
        let cursor_delta = input.mouse_delta();

        if self.enabled.contains(OrbitFeatures::ROTATE) && input.get_mouse_button(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * std::f32::consts::PI / screen_height;
            self.rotate_delta.x -= cursor_delta.x * rotate_per_pixel * self.rotate_speed;
            self.rotate_delta.y -= cursor_delta.y * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let target_fps = 60.0;
            let retention = (1.0 - self.damping_factor).powf(dt * target_fps);
            let delta_apply = self.rotate_delta * (1.0 - retention);

            self.theta += delta_apply.x;
            self.phi += delta_apply.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        const EPS: f32 = 0.0001;
        self.phi = self.phi.clamp(EPS, std::f32::consts::PI - EPS);

        let scroll = input.scroll_delta();
        if self.enabled.contains(OrbitFeatures::ZOOM) && scroll.y != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.y.abs());
            if scroll.y > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
            self.radius = self.radius.clamp(self.min_distance, self.max_distance);
        }

        if self.enabled.contains(OrbitFeatures::PAN) && input.get_mouse_button(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let target_world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world_ratio = target_world_height / screen_height;

            let forward = -self.offset().normalize();
            let right = forward.cross(Vec3::Y).normalize();
            let up = right.cross(forward).normalize();

            let pan_delta_world =
                (right * -cursor_delta.x + up * cursor_delta.y) * pixels_to_world_ratio * self.pan_speed;
            self.center += pan_delta_world;
        }

        transform.position = self.center + self.offset();
        transform.look_at(self.center, Vec3::Y);
    }
}
