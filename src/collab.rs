//! Collaboration Hook
//!
//! The core only ever emits: while acting as host, every drag step sends a
//! [`TransformUpdate`] through the injected [`CollaborationChannel`]. Nothing
//! is awaited and send failures are logged and dropped.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of this viewer in a shared session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    #[default]
    Solo,
    Host,
    Guest,
}

impl SessionRole {
    #[inline]
    #[must_use]
    pub fn broadcasts(self) -> bool {
        matches!(self, SessionRole::Host)
    }
}

/// World transform of one object after a manipulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformUpdate {
    pub name: String,
    pub id: Uuid,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// Fire-and-forget outbound notification sink.
pub trait CollaborationChannel {
    fn send_transform(&self, update: &TransformUpdate);
}

impl CollaborationChannel for flume::Sender<TransformUpdate> {
    fn send_transform(&self, update: &TransformUpdate) {
        if let Err(err) = self.send(update.clone()) {
            log::warn!("Dropping transform update for '{}': {err}", update.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_serializes_to_json() {
        let update = TransformUpdate {
            name: "blade".into(),
            id: Uuid::nil(),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("\"name\":\"blade\""));
        assert!(json.contains("\"position\":[1.0,2.0,3.0]"));
    }

    #[test]
    fn disconnected_channel_does_not_panic() {
        let (tx, rx) = flume::unbounded::<TransformUpdate>();
        drop(rx);
        tx.send_transform(&TransformUpdate {
            name: "x".into(),
            id: Uuid::nil(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        });
    }
}
