//! Winit input event adapter
//!
//! Translates winit window events into [`Viewer`] calls.

use winit::event::{ElementState, MouseScrollDelta, TouchPhase, WindowEvent};

use crate::app::Viewer;
use crate::input::{ButtonState, InputResponse, MouseButton};

/// Converts a winit MouseButton to the viewer's MouseButton
#[must_use]
pub fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Back,
        winit::event::MouseButton::Forward => MouseButton::Forward,
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

/// Converts a winit ElementState to the viewer's ButtonState
#[must_use]
pub fn translate_element_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Routes one window event into the viewer.
pub fn process_window_event(viewer: &mut Viewer, event: &WindowEvent) -> InputResponse {
    match event {
        WindowEvent::CursorMoved { position, .. } => viewer.pointer_moved(position.x as f32, position.y as f32),

        WindowEvent::MouseInput { state, button, .. } => {
            viewer.pointer_button(translate_mouse_button(*button), translate_element_state(*state))
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => {
                    const PIXEL_SCALE: f32 = 0.01;
                    (pos.x as f32 * PIXEL_SCALE, pos.y as f32 * PIXEL_SCALE)
                }
            };
            viewer.scroll(dx, dy);
            InputResponse::Ignored
        }

        WindowEvent::Touch(touch) => {
            let (x, y) = (touch.location.x as f32, touch.location.y as f32);
            match touch.phase {
                TouchPhase::Started => viewer.touch_started(touch.id, x, y),
                TouchPhase::Moved => viewer.touch_moved(touch.id, x, y),
                TouchPhase::Ended => viewer.touch_ended(touch.id),
                TouchPhase::Cancelled => {
                    viewer.touch_cancelled(touch.id);
                    InputResponse::Ignored
                }
            }
        }

        WindowEvent::Resized(size) => {
            viewer.resize(size.width, size.height);
            InputResponse::Ignored
        }

        WindowEvent::Focused(false) => {
            viewer.focus_lost();
            InputResponse::Ignored
        }

        _ => InputResponse::Ignored,
    }
}
