//! Viewer Configuration
//!
//! [`ViewerConfig`] gathers the tunables of every subsystem. All sections
//! implement [`Default`] and deserialize with `#[serde(default)]`, so a JSON
//! file only needs to name the values it overrides.
//!
//! ```rust,ignore
//! use arview::ViewerConfig;
//!
//! let config = ViewerConfig::from_json_str(r#"{ "placement": { "yaw_step_degrees": 30.0 } }"#)?;
//! assert_eq!(config.placement.yaw_step_degrees, 30.0);
//! ```

use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::collab::SessionRole;
use crate::errors::{Result, ViewerError};

/// Physical form factor of the device running the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFactor {
    #[default]
    Desktop,
    /// Touch-capable phone or tablet (handheld AR).
    Handheld,
    /// Head-mounted display with tracked controllers.
    Headset,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraSettings,
    pub orbit: OrbitSettings,
    pub interaction: InteractionSettings,
    pub placement: PlacementSettings,
    pub framing: FramingSettings,
}

impl ViewerConfig {
    /// Parses a configuration from JSON text and validates it.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects values that would make the math degenerate.
    pub fn validate(&self) -> Result<()> {
        if !(1.0..179.0).contains(&self.camera.fov_degrees) {
            return Err(ViewerError::Config(format!(
                "camera.fov_degrees must be within [1, 179), got {}",
                self.camera.fov_degrees
            )));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(ViewerError::Config("camera near/far planes are inverted or non-positive".into()));
        }
        if self.orbit.min_distance > self.orbit.max_distance {
            return Err(ViewerError::Config("orbit.min_distance exceeds orbit.max_distance".into()));
        }
        if self.interaction.handheld_translation_scale <= 0.0 {
            return Err(ViewerError::Config("interaction.handheld_translation_scale must be positive".into()));
        }
        if self.framing.margin < 1.0 {
            return Err(ViewerError::Config("framing.margin must be at least 1.0".into()));
        }
        Ok(())
    }
}

/// Perspective camera parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial orbit target.
    pub target: Vec3,
    /// Initial distance from the target.
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.01,
            far: 100.0,
            target: Vec3::ZERO,
            distance: 4.0,
        }
    }
}

/// Orbit camera behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: true,
            min_distance: 0.1,
            max_distance: 1000.0,
        }
    }
}

/// Drag / XR manipulation behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub form_factor: FormFactor,
    /// Multi-user role; only [`SessionRole::Host`] emits transform updates.
    pub role: SessionRole,
    /// Multiplier applied to XR controller translation on handheld devices,
    /// compensating for the shorter physical reach.
    pub handheld_translation_scale: f32,
    /// Releases a session whose input source vanished without a release event.
    pub liveness_check: bool,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            form_factor: FormFactor::Desktop,
            role: SessionRole::Solo,
            handheld_translation_scale: 2.0,
            liveness_check: true,
        }
    }
}

impl InteractionSettings {
    /// Scale applied to per-frame XR controller translation.
    #[must_use]
    pub fn xr_translation_scale(&self) -> f32 {
        match self.form_factor {
            FormFactor::Handheld => self.handheld_translation_scale,
            FormFactor::Desktop | FormFactor::Headset => 1.0,
        }
    }
}

/// AR tap-to-place behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Discrete yaw nudge applied by the rotate controls once placed.
    pub yaw_step_degrees: f32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self { yaw_step_degrees: 15.0 }
    }
}

/// Scene fit / frame behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FramingSettings {
    /// Multiplier on the fitted distance (1.0 = bounds touch the frustum).
    pub margin: f32,
    /// Lower bound on the framed radius, for degenerate (flat or empty) bounds.
    pub min_radius: f32,
    /// Re-frame the camera after every successful load.
    pub frame_on_load: bool,
}

impl Default for FramingSettings {
    fn default() -> Self {
        Self {
            margin: 1.25,
            min_radius: 0.05,
            frame_on_load: true,
        }
    }
}
