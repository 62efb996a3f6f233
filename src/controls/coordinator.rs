use std::cell::RefCell;
use std::rc::Rc;

use crate::controls::orbit::OrbitControls;
use crate::input::Input;
use crate::scene::transform::Transform;

/// Orbit controls shared between the app and the interaction core.
pub type SharedOrbit = Rc<RefCell<OrbitControls>>;

/// Keeps every orbit instance bound to one camera in the same state.
///
/// The primary instance drives the camera each frame; linked instances are
/// only suspended and resumed alongside it so none of them keeps rotating
/// the camera during a drag.
pub struct OrbitCoordinator {
    primary: SharedOrbit,
    linked: Vec<SharedOrbit>,
    suspended: bool,
}

impl OrbitCoordinator {
    #[must_use]
    pub fn new(primary: SharedOrbit) -> Self {
        Self {
            primary,
            linked: Vec::new(),
            suspended: false,
        }
    }

    /// Adds another instance that must follow suspend / resume.
    pub fn link(&mut self, orbit: SharedOrbit) {
        if Rc::ptr_eq(&orbit, &self.primary) || self.linked.iter().any(|o| Rc::ptr_eq(o, &orbit)) {
            return;
        }
        if self.suspended {
            orbit.borrow_mut().suspend();
        }
        self.linked.push(orbit);
    }

    #[must_use]
    pub fn primary(&self) -> &SharedOrbit {
        &self.primary
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
        for orbit in self.all() {
            orbit.borrow_mut().suspend();
        }
        log::debug!("Camera orbit suspended");
    }

    pub fn resume(&mut self) {
        self.suspended = false;
        for orbit in self.all() {
            orbit.borrow_mut().resume();
        }
        log::debug!("Camera orbit resumed");
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Drives the primary instance; a no-op while suspended.
    pub fn update(&self, camera: &mut Transform, input: &Input, fov_degrees: f32, dt: f32) {
        if self.suspended {
            return;
        }
        self.primary.borrow_mut().update(camera, input, fov_degrees, dt);
    }

    fn all(&self) -> impl Iterator<Item = &SharedOrbit> {
        std::iter::once(&self.primary).chain(self.linked.iter())
    }
}
