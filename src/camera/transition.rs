use bevy::prelude::*;

use crate::bodies::{find_body, BodyId, CelestialBody};
use crate::constants::TRANSITION_SECS;
use crate::orbits::SimClock;

use super::events::{TransitionComplete, TransitionId, TransitionKind};
use super::state::CameraState;
use super::ViewCamera;

#[derive(Resource, Debug, Clone)]
pub struct TransitionConfig {
    pub duration_secs: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_secs: TRANSITION_SECS,
        }
    }
}

/// An in-flight animated camera move. Requesting a new transition simply
/// replaces this component; the superseded flight never completes and its
/// pending record is overwritten with the new id.
#[derive(Component, Debug, Clone)]
pub struct ActiveTransition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub body: Option<BodyId>,
    /// When set, `to_position`/`to_target` are offsets from this body's live
    /// position, so a moving body stays framed for the whole flight.
    pub relative_to: Option<BodyId>,
    pub anchor: Vec3,
    pub from_position: Vec3,
    pub from_target: Vec3,
    pub to_position: Vec3,
    pub to_target: Vec3,
    pub duration: f32,
    pub elapsed: f32,
}

impl ActiveTransition {
    /// Camera pose at eased progress `s` in [0, 1].
    pub fn sample(&self, s: f32) -> (Vec3, Vec3) {
        let (to_position, to_target) = if self.relative_to.is_some() {
            (self.anchor + self.to_position, self.anchor + self.to_target)
        } else {
            (self.to_position, self.to_target)
        };
        (
            self.from_position.lerp(to_position, s),
            self.from_target.lerp(to_target, s),
        )
    }
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Rigid follow: the camera holds a constant offset from a moving body.
#[derive(Component, Debug, Clone)]
pub struct FollowRig {
    pub body: BodyId,
    pub offset: Vec3,
}

pub fn run_transitions(
    time: Res<Time>,
    mut commands: Commands,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<(Entity, &mut Transform, &mut ActiveTransition), With<ViewCamera>>,
    mut completions: EventWriter<TransitionComplete>,
) {
    for (view, mut transform, mut transition) in cameras.iter_mut() {
        if let Some(id) = transition.relative_to.clone() {
            if let Some(body) = find_body(bodies.iter(), &id) {
                transition.anchor = body.position;
            }
            // a vanished body keeps the last anchor; the reconciler cleans up
        }

        transition.elapsed += time.delta_secs();
        let raw = (transition.elapsed / transition.duration.max(f32::EPSILON)).clamp(0.0, 1.0);
        let (position, target) = transition.sample(ease_in_out_cubic(raw));
        transform.translation = position;
        transform.look_at(target, Vec3::Y);

        if raw >= 1.0 {
            completions.send(TransitionComplete {
                view,
                id: transition.id,
                kind: transition.kind,
                position,
                target,
                body: transition.body.clone(),
            });
            commands.entity(view).remove::<ActiveTransition>();
        }
    }
}

/// Pins a following camera to its offset. Suspended while a transition owns
/// the camera, and while the sim is paused so the user can orbit freely; the
/// resume handler re-snapshots the offset afterwards.
pub fn apply_follow(
    clock: Res<SimClock>,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<
        (&mut Transform, &FollowRig, &CameraState),
        (With<ViewCamera>, Without<ActiveTransition>),
    >,
) {
    if clock.paused {
        return;
    }
    for (mut transform, rig, state) in cameras.iter_mut() {
        let Some(body) = find_body(bodies.iter(), &rig.body) else {
            continue;
        };
        transform.translation = body.position + rig.offset;
        // a look-at may have pointed the view elsewhere; only a plain follow
        // keeps the orientation glued to the body
        if state.focused == state.followed {
            transform.look_at(body.position, Vec3::Y);
        } else {
            transform.look_at(state.target, Vec3::Y);
        }
    }
}
