use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::input::{InputResponse, Touch};
use crate::interaction::{InteractionCore, Manipulation, PointerSource, ViewContext};
use crate::scene::Scene;

impl InteractionCore {
    /// A finger touched down. `active` holds every live touch, this one included.
    ///
    /// One finger starts a drag exactly like a mouse press. Two fingers on a
    /// visible model, with no session running, start the yaw gesture.
    pub fn touch_start(&mut self, scene: &Scene, view: &ViewContext<'_>, touch: Touch, active: &[Touch]) -> InputResponse {
        if self.xr_active || self.state.is_active() {
            return InputResponse::Ignored;
        }

        match active {
            [_] => self.begin_pointer_drag(scene, view, PointerSource::Touch(touch.id), touch.position),
            [a, b] => {
                let model_visible = self
                    .model_root
                    .is_some_and(|root| scene.is_visible_in_hierarchy(root));
                if !model_visible {
                    return InputResponse::Ignored;
                }
                self.begin_session(Manipulation::TwoFingerRotate {
                    ids: [a.id, b.id],
                    last_angle: touch_angle(a.position, b.position),
                });
                InputResponse::Consumed
            }
            _ => InputResponse::Ignored,
        }
    }

    /// A finger moved. `active` holds every live touch with current positions.
    pub fn touch_move(&mut self, scene: &mut Scene, view: &ViewContext<'_>, touch: Touch, active: &[Touch]) -> InputResponse {
        match self.state {
            Manipulation::PointerDrag {
                source: PointerSource::Touch(id),
                ..
            } if id == touch.id => {
                self.drag_step(scene, view, touch.position);
                InputResponse::Consumed
            }
            Manipulation::TwoFingerRotate { ids, last_angle } if ids.contains(&touch.id) => {
                let find = |id: u64| active.iter().find(|t| t.id == id).map(|t| t.position);
                let (Some(a), Some(b)) = (find(ids[0]), find(ids[1])) else {
                    return InputResponse::Consumed;
                };

                let angle = touch_angle(a, b);
                let delta = wrap_angle(angle - last_angle);
                if let Some(root) = self.model_root
                    && let Some(node) = scene.get_node_mut(root)
                {
                    node.transform.rotate_yaw(delta);
                }
                self.state = Manipulation::TwoFingerRotate { ids, last_angle: angle };
                InputResponse::Consumed
            }
            _ => InputResponse::Ignored,
        }
    }

    /// A finger lifted. Ends the session if that finger drives it.
    pub fn touch_end(&mut self, id: u64) -> InputResponse {
        if self.state.uses_touch(id) {
            self.end_session();
            InputResponse::Consumed
        } else {
            InputResponse::Ignored
        }
    }

    /// The platform cancelled a touch (e.g. a system gesture took over).
    pub fn touch_cancel(&mut self, id: u64) {
        if self.state.uses_touch(id) {
            log::debug!("Touch {id} cancelled");
            self.end_session();
        }
    }
}

/// Angle of the vector from `a` to `b`, radians.
fn touch_angle(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Maps an angle difference into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_crosses_branch_cut() {
        let delta = wrap_angle((-PI + 0.1) - (PI - 0.1));
        assert!((delta - 0.2).abs() < 1e-5);
        let delta = wrap_angle((PI - 0.1) - (-PI + 0.1));
        assert!((delta + 0.2).abs() < 1e-5);
    }

    #[test]
    fn touch_angle_is_screen_space() {
        assert!((touch_angle(Vec2::ZERO, Vec2::new(1.0, 0.0))).abs() < 1e-6);
        assert!((touch_angle(Vec2::ZERO, Vec2::new(0.0, 1.0)) - PI / 2.0).abs() < 1e-6);
    }
}
