//! Platform-agnostic input system
//!
//! Defines input types and state containers that do not depend on any GUI
//! library or XR runtime. Platform adapters (e.g. the winit adapter) translate
//! native events into these types.

use glam::Vec2;
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::math::Pose;

/// Mouse button enumeration
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Whether a handler claimed an input event.
///
/// A consumed event must not be observed by later handlers (in particular the
/// orbit camera).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputResponse {
    Consumed,
    Ignored,
}

impl InputResponse {
    #[inline]
    #[must_use]
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// One active touch point, in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Touch {
    pub id: u64,
    pub position: Vec2,
}

impl Touch {
    #[must_use]
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Identifies a tracked XR controller (or hand) for the lifetime of a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ControllerId(pub u32);

/// Pose of one controller for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerPose {
    pub id: ControllerId,
    pub pose: Pose,
}

/// Per-frame snapshot supplied by the XR host.
///
/// Only controllers that are currently tracked appear in `controllers`; a
/// controller missing from the list is treated as disconnected.
#[derive(Debug, Clone, Default)]
pub struct XrFrameInput {
    pub controllers: SmallVec<[ControllerPose; 2]>,
}

impl XrFrameInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a controller pose (builder style).
    #[must_use]
    pub fn with_controller(mut self, id: ControllerId, pose: Pose) -> Self {
        self.set_controller(id, pose);
        self
    }

    pub fn set_controller(&mut self, id: ControllerId, pose: Pose) {
        if let Some(entry) = self.controllers.iter_mut().find(|c| c.id == id) {
            entry.pose = pose;
        } else {
            self.controllers.push(ControllerPose { id, pose });
        }
    }

    #[must_use]
    pub fn pose_of(&self, id: ControllerId) -> Option<Pose> {
        self.controllers.iter().find(|c| c.id == id).map(|c| c.pose)
    }
}

/// Platform-agnostic input state container
#[derive(Debug, Clone)]
pub struct Input {
    // Mouse button state
    pressed_mouse: HashSet<MouseButton>,

    // Mouse position and movement
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    has_position: bool,

    // Active touches, in arrival order
    touches: SmallVec<[Touch; 4]>,

    // Window state
    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pressed_mouse: HashSet::new(),
            mouse_position: Vec2::ZERO,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            has_position: false,
            touches: SmallVec::new(),
            screen_size: Vec2::ZERO,
        }
    }

    // ========== System API (called by the viewer / adapters) ==========

    /// Clears the per-frame pointer and scroll deltas once consumed.
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Injects a mouse button event
    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                self.pressed_mouse.insert(button);
            }
            ButtonState::Released => {
                self.pressed_mouse.remove(&button);
            }
        }
    }

    /// Injects a mouse position update, accumulating the movement delta.
    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if self.has_position {
            self.mouse_delta += new_pos - self.mouse_position;
        }
        self.mouse_position = new_pos;
        self.has_position = true;
    }

    /// Moves the pointer without producing a delta (e.g. a touch landing far
    /// from where the previous one lifted).
    pub fn warp_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse_position = Vec2::new(x, y);
        self.has_position = true;
    }

    /// Injects a scroll wheel event
    pub fn inject_scroll(&mut self, delta_x: f32, delta_y: f32) {
        self.scroll_delta += Vec2::new(delta_x, delta_y);
    }

    /// Injects a window resize event
    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    /// Adds or moves a touch point.
    pub fn inject_touch(&mut self, touch: Touch) {
        if let Some(existing) = self.touches.iter_mut().find(|t| t.id == touch.id) {
            existing.position = touch.position;
        } else {
            self.touches.push(touch);
        }
    }

    /// Removes a touch point (ended or cancelled).
    pub fn remove_touch(&mut self, id: u64) {
        self.touches.retain(|t| t.id != id);
    }

    /// Drops every held button and touch, e.g. when the window loses focus and
    /// release events will never arrive.
    pub fn release_all(&mut self) {
        self.pressed_mouse.clear();
        self.touches.clear();
    }

    // ========== User API (for interaction/camera logic queries) ==========

    /// Checks whether a mouse button is currently held down
    #[must_use]
    pub fn get_mouse_button(&self, button: MouseButton) -> bool {
        self.pressed_mouse.contains(&button)
    }

    /// Returns the current mouse position
    #[must_use]
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Returns the mouse movement delta for this frame
    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Returns the scroll wheel delta for this frame
    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// Returns the active touches in arrival order
    #[must_use]
    pub fn touches(&self) -> &[Touch] {
        &self.touches
    }

    #[must_use]
    pub fn has_touch(&self, id: u64) -> bool {
        self.touches.iter().any(|t| t.id == id)
    }

    /// Returns the window dimensions
    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
