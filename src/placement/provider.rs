use crate::errors::Result;
use crate::math::Pose;

/// Tracking frame the hit-test feed is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceSpaceKind {
    /// Environment-relative, stable across head motion.
    #[default]
    Local,
    /// Viewer-relative fallback.
    Viewer,
}

/// Reference space granted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSpace {
    pub kind: ReferenceSpaceKind,
    /// Host-defined handle
    pub id: u64,
}

/// Continuous hit-test subscription granted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitTestSource(pub u64);

/// Environment hit-testing supplied by the XR host.
pub trait XrHitTestProvider {
    fn request_reference_space(&mut self, kind: ReferenceSpaceKind) -> Result<ReferenceSpace>;

    fn request_hit_test_source(&mut self, space: &ReferenceSpace) -> Result<HitTestSource>;

    /// This frame's hits against real-world surfaces, best first. Empty on a miss.
    fn hit_test_results(&mut self, source: HitTestSource) -> Vec<Pose>;

    fn cancel_hit_test_source(&mut self, source: HitTestSource);
}
