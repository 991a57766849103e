use bevy::prelude::*;

use crate::bodies::BodyId;

/// Identifies one requested transition. A completion is only honored when
/// its id matches the view's pending record, so a superseded transition can
/// never mis-attribute focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionId(pub u64);

#[derive(Resource, Default)]
pub struct TransitionIds(u64);

impl TransitionIds {
    pub fn next(&mut self) -> TransitionId {
        self.0 = self.0.wrapping_add(1);
        TransitionId(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Fly to a framing offset and keep tracking the body.
    Follow,
    /// Pivot toward a body without moving the camera.
    LookAt,
    /// Return to the default pose, dropping focus and follow.
    FollowClear,
    /// Pivot toward an arbitrary point; focus and follow are untouched.
    Point,
}

/// High-level camera intents. Every command names the view it addresses;
/// nothing in the subsystem is reachable through a global.
#[derive(Event, Debug, Clone)]
pub enum CameraCommand {
    MoveTo {
        view: Entity,
        body: BodyId,
        distance_factor: Option<f32>,
    },
    LookAt {
        view: Entity,
        body: BodyId,
    },
    Follow {
        view: Entity,
        body: Option<BodyId>,
        distance_factor: Option<f32>,
    },
    PointAt {
        view: Entity,
        position: Vec3,
    },
    SetFov {
        view: Entity,
        degrees: f32,
    },
}

impl CameraCommand {
    pub fn reset_view(view: Entity) -> Self {
        Self::Follow {
            view,
            body: None,
            distance_factor: None,
        }
    }

    pub fn clear_focus(view: Entity) -> Self {
        Self::reset_view(view)
    }
}

/// Emitted by the transition engine when a flight finishes. `position` and
/// `target` are where the camera actually ended up and are authoritative.
#[derive(Event, Debug, Clone)]
pub struct TransitionComplete {
    pub view: Entity,
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub position: Vec3,
    pub target: Vec3,
    pub body: Option<BodyId>,
}

/// The user grabbed the controls (drag, pan or zoom).
#[derive(Event, Debug, Clone)]
pub struct UserCameraInput {
    pub view: Entity,
    pub position: Vec3,
    pub target: Vec3,
}

/// Fired when the focused body changes; the one notification channel
/// distinct from observing `CameraState` itself.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FocusChanged {
    pub view: Entity,
    pub body: Option<BodyId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_ids_are_unique_and_increasing() {
        let mut ids = TransitionIds::default();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
    }

    #[test]
    fn reset_view_is_a_follow_of_nothing() {
        let view = Entity::from_raw(1);
        match CameraCommand::reset_view(view) {
            CameraCommand::Follow { body: None, .. } => {}
            other => panic!("unexpected command {other:?}"),
        }
    }
}
