use crate::input::{ControllerId, InputResponse, XrFrameInput};
use crate::interaction::picking::pick_scene;
use crate::interaction::{InteractionCore, Manipulation};
use crate::math::{Pose, Ray};
use crate::scene::Scene;

impl InteractionCore {
    /// Controller select pressed.
    ///
    /// Casts along the controller's forward axis against the whole scene and
    /// resolves the hit to its registered ancestor. The controller then owns
    /// the object until `select_end`.
    pub fn select_start(&mut self, scene: &Scene, controller: ControllerId, pose: Pose) -> InputResponse {
        if !self.xr_active || self.state.is_active() {
            return InputResponse::Ignored;
        }

        let ray = Ray::new(pose.position, pose.forward());
        let Some((slot, _hit)) = pick_scene(scene, &self.index, &ray) else {
            return InputResponse::Ignored;
        };

        let target = self.draggables[slot].node;
        self.begin_session(Manipulation::XrTranslate {
            controller,
            target,
            last_position: pose.position,
        });
        InputResponse::Consumed
    }

    /// Controller select released: clears selection and rotation mode.
    pub fn select_end(&mut self, controller: ControllerId) -> InputResponse {
        if self.state.controller() == Some(controller) {
            self.end_session();
            InputResponse::Consumed
        } else {
            InputResponse::Ignored
        }
    }

    /// Squeeze pressed while this controller holds an object: enter rotation.
    ///
    /// Rotation can't be entered without an active select.
    pub fn squeeze_start(&mut self, scene: &Scene, controller: ControllerId, pose: Pose) -> InputResponse {
        let Manipulation::XrTranslate {
            controller: owner,
            target,
            ..
        } = self.state
        else {
            return InputResponse::Ignored;
        };
        if owner != controller {
            return InputResponse::Ignored;
        }
        let Some(object_snapshot) = scene.world_rotation(target) else {
            return InputResponse::Ignored;
        };

        self.state = Manipulation::XrRotate {
            controller,
            target,
            controller_snapshot: pose.orientation,
            object_snapshot,
            last_position: pose.position,
        };
        log::debug!("Controller {} entered rotation mode", controller.0);
        InputResponse::Consumed
    }

    /// Squeeze released: back to translation while select is still held.
    pub fn squeeze_end(&mut self, controller: ControllerId) -> InputResponse {
        let Manipulation::XrRotate {
            controller: owner,
            target,
            last_position,
            ..
        } = self.state
        else {
            return InputResponse::Ignored;
        };
        if owner != controller {
            return InputResponse::Ignored;
        }

        self.state = Manipulation::XrTranslate {
            controller,
            target,
            last_position,
        };
        InputResponse::Consumed
    }

    /// Integrates one frame of controller motion into the held object.
    pub(crate) fn xr_frame(&mut self, scene: &mut Scene, xr: &XrFrameInput) {
        match &mut self.state {
            Manipulation::XrTranslate {
                controller,
                target,
                last_position,
            } => {
                let Some(pose) = xr.pose_of(*controller) else {
                    return;
                };
                let delta = (pose.position - *last_position) * self.settings.xr_translation_scale();
                *last_position = pose.position;
                let target = *target;

                scene.translate_world(target, delta);
                self.restore_scale(scene, target);
            }
            Manipulation::XrRotate {
                controller,
                target,
                controller_snapshot,
                object_snapshot,
                last_position,
            } => {
                let Some(pose) = xr.pose_of(*controller) else {
                    return;
                };
                // Track position so releasing squeeze doesn't jump.
                *last_position = pose.position;

                let relative = pose.orientation * controller_snapshot.inverse();
                scene.set_world_rotation(*target, (relative * *object_snapshot).normalize());
            }
            Manipulation::Idle | Manipulation::PointerDrag { .. } | Manipulation::TwoFingerRotate { .. } => {}
        }
    }
}
