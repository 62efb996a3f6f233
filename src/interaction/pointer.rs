use glam::Vec2;

use crate::input::InputResponse;
use crate::interaction::picking::pick_draggable;
use crate::interaction::{InteractionCore, Manipulation, PointerSource, ViewContext};
use crate::math::Plane;
use crate::scene::{Camera, Scene};

impl InteractionCore {
    /// Primary mouse button pressed at `screen` (pixels).
    ///
    /// Picks the nearest draggable; on a hit the session starts, the orbit is
    /// suspended and the event is consumed.
    pub fn pointer_down(&mut self, scene: &Scene, view: &ViewContext<'_>, screen: Vec2) -> InputResponse {
        self.begin_pointer_drag(scene, view, PointerSource::Mouse, screen)
    }

    /// Mouse moved; drags the selected object when a mouse session is live.
    pub fn pointer_move(&mut self, scene: &mut Scene, view: &ViewContext<'_>, screen: Vec2) -> InputResponse {
        if !matches!(
            self.state,
            Manipulation::PointerDrag {
                source: PointerSource::Mouse,
                ..
            }
        ) {
            return InputResponse::Ignored;
        }
        self.drag_step(scene, view, screen);
        InputResponse::Consumed
    }

    /// Primary mouse button released. A release with no session is a no-op.
    pub fn pointer_up(&mut self) -> InputResponse {
        if matches!(
            self.state,
            Manipulation::PointerDrag {
                source: PointerSource::Mouse,
                ..
            }
        ) {
            self.end_session();
            InputResponse::Consumed
        } else {
            InputResponse::Ignored
        }
    }

    /// Pointer left the surface or the window lost focus.
    pub fn pointer_cancel(&mut self) {
        if matches!(
            self.state,
            Manipulation::PointerDrag {
                source: PointerSource::Mouse,
                ..
            }
        ) {
            self.end_session();
        }
    }

    pub(crate) fn begin_pointer_drag(
        &mut self,
        scene: &Scene,
        view: &ViewContext<'_>,
        source: PointerSource,
        screen: Vec2,
    ) -> InputResponse {
        if self.xr_active || self.state.is_active() {
            return InputResponse::Ignored;
        }

        let ray = view.camera.screen_ray(&view.camera_world, screen, view.viewport);
        let Some((slot, _hit)) = pick_draggable(scene, &self.draggables, &self.index, &ray) else {
            return InputResponse::Ignored;
        };

        let target = self.draggables[slot].node;
        self.begin_session(Manipulation::PointerDrag {
            source,
            target,
            last_screen: screen,
            last_hit: None,
        });
        InputResponse::Consumed
    }

    /// Moves the dragged object by the change of its camera-facing plane hit.
    ///
    /// The first intersection only seeds the reference point. Every later one
    /// adds the difference to the previous intersection, so the net motion
    /// depends only on the first and last hits. A seeded drag ignores moves
    /// that report the same pixel again.
    pub(crate) fn drag_step(&mut self, scene: &mut Scene, view: &ViewContext<'_>, screen: Vec2) {
        let Manipulation::PointerDrag {
            target,
            last_screen,
            last_hit,
            ..
        } = &mut self.state
        else {
            return;
        };
        if last_hit.is_some() && *last_screen == screen {
            return;
        }
        *last_screen = screen;
        let target = *target;

        let Some(origin) = scene.world_position(target) else {
            return;
        };
        let plane = Plane::new(origin, Camera::forward(&view.camera_world));
        let ray = view.camera.screen_ray(&view.camera_world, screen, view.viewport);
        let Some(point) = plane.intersect_ray(&ray) else {
            return;
        };

        let Some(previous) = last_hit.replace(point) else {
            return;
        };

        scene.translate_world(target, point - previous);
        self.restore_scale(scene, target);
        self.broadcast(scene, target);
    }
}
