use glam::{Quat, Vec2, Vec3};

use crate::input::ControllerId;
use crate::scene::NodeHandle;

/// Screen input that owns a pointer drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch(u64),
}

/// Manipulation state of the interaction core.
///
/// Exactly one variant is live at a time, so a mouse drag, a touch drag, a
/// two-finger rotation and an XR grab can never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Manipulation {
    #[default]
    Idle,
    /// Screen-space drag on a camera-facing plane.
    PointerDrag {
        source: PointerSource,
        target: NodeHandle,
        /// Pointer position of the last processed press or move.
        last_screen: Vec2,
        /// Previous plane intersection; `None` until the first move.
        last_hit: Option<Vec3>,
    },
    /// Two-finger yaw of the model root.
    TwoFingerRotate { ids: [u64; 2], last_angle: f32 },
    /// XR select held: the object follows controller translation.
    XrTranslate {
        controller: ControllerId,
        target: NodeHandle,
        last_position: Vec3,
    },
    /// XR select + squeeze held: the object follows controller rotation.
    XrRotate {
        controller: ControllerId,
        target: NodeHandle,
        controller_snapshot: Quat,
        object_snapshot: Quat,
        last_position: Vec3,
    },
}

impl Manipulation {
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The manipulated object, if the session targets one.
    #[must_use]
    pub fn target(&self) -> Option<NodeHandle> {
        match *self {
            Self::PointerDrag { target, .. } | Self::XrTranslate { target, .. } | Self::XrRotate { target, .. } => {
                Some(target)
            }
            Self::Idle | Self::TwoFingerRotate { .. } => None,
        }
    }

    #[must_use]
    pub fn is_xr(&self) -> bool {
        matches!(self, Self::XrTranslate { .. } | Self::XrRotate { .. })
    }

    #[must_use]
    pub fn controller(&self) -> Option<ControllerId> {
        match *self {
            Self::XrTranslate { controller, .. } | Self::XrRotate { controller, .. } => Some(controller),
            _ => None,
        }
    }

    /// Whether the session is driven by the touch point `id`.
    #[must_use]
    pub fn uses_touch(&self, id: u64) -> bool {
        match *self {
            Self::PointerDrag {
                source: PointerSource::Touch(touch),
                ..
            } => touch == id,
            Self::TwoFingerRotate { ids, .. } => ids.contains(&id),
            _ => false,
        }
    }
}
