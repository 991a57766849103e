use bevy::prelude::*;

use crate::bodies::{find_body, BodySnapshot, CelestialBody};
use crate::constants::{
    DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET, DEFAULT_DISTANCE_FACTOR, DEFAULT_VIEW_DIR,
    FOV_EPSILON, MIN_DISTANCE_FACTOR,
};

use super::events::{CameraCommand, TransitionIds, TransitionKind};
use super::reconcile::PendingFocus;
use super::state::CameraState;
use super::transition::{ActiveTransition, FollowRig, TransitionConfig};
use super::ViewCamera;

/// Distance from a body's centre at which to frame it. The factor is floored
/// so the camera can never be placed inside the body.
pub fn framing_distance(radius: f32, factor: Option<f32>) -> f32 {
    radius * factor.unwrap_or(DEFAULT_DISTANCE_FACTOR).max(MIN_DISTANCE_FACTOR)
}

pub fn framing_offset(radius: f32, factor: Option<f32>) -> Vec3 {
    DEFAULT_VIEW_DIR.normalize() * framing_distance(radius, factor)
}

pub fn framing_position(body_position: Vec3, radius: f32, factor: Option<f32>) -> Vec3 {
    body_position + framing_offset(radius, factor)
}

fn usable(snapshot: &BodySnapshot) -> bool {
    snapshot.position.is_finite() && snapshot.radius.is_finite() && snapshot.radius > 0.0
}

/// Turns `CameraCommand` intents into optimistic state updates plus either an
/// instant reposition or an animated transition. Every failure is handled
/// here: a missing view rig aborts with a warning, a missing or degenerate
/// body aborts with an error, and a failed follow additionally clears
/// focus/follow so no stale id survives.
pub fn execute_commands(
    mut commands: Commands,
    config: Res<TransitionConfig>,
    mut ids: ResMut<TransitionIds>,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<
        (
            &mut Transform,
            &mut CameraState,
            &mut PendingFocus,
            &mut Projection,
        ),
        With<ViewCamera>,
    >,
    mut reader: EventReader<CameraCommand>,
) {
    for command in reader.read() {
        match command {
            CameraCommand::MoveTo {
                view,
                body,
                distance_factor,
            } => {
                let Ok((mut transform, mut state, mut pending, _)) = cameras.get_mut(*view) else {
                    warn!("move-to {body} requested before the view camera exists");
                    continue;
                };
                let Some(snapshot) = find_body(bodies.iter(), body).filter(usable) else {
                    error!("move-to: no usable body {body}");
                    continue;
                };

                let position = framing_position(snapshot.position, snapshot.radius, *distance_factor);
                commands
                    .entity(*view)
                    .remove::<(ActiveTransition, FollowRig)>();
                transform.translation = position;
                transform.look_at(snapshot.position, Vec3::Y);
                *pending = PendingFocus::Idle;

                let mut next = state.clone();
                next.position = position;
                next.target = snapshot.position;
                next.focused = Some(body.clone());
                next.followed = None;
                state.set_if_neq(next);
            }
            CameraCommand::LookAt { view, body } => {
                let Ok((transform, mut state, mut pending, _)) = cameras.get_mut(*view) else {
                    warn!("look-at {body} requested before the view camera exists");
                    continue;
                };
                let Some(snapshot) = find_body(bodies.iter(), body).filter(usable) else {
                    error!("look-at: no usable body {body}");
                    continue;
                };

                let id = ids.next();
                commands.entity(*view).insert(ActiveTransition {
                    id,
                    kind: TransitionKind::LookAt,
                    body: Some(body.clone()),
                    relative_to: None,
                    anchor: Vec3::ZERO,
                    from_position: transform.translation,
                    from_target: state.target,
                    to_position: transform.translation,
                    to_target: snapshot.position,
                    duration: config.duration_secs,
                    elapsed: 0.0,
                });
                *pending = PendingFocus::Pending {
                    id,
                    intent: Some(body.clone()),
                };

                // optimistic: focus now, follow untouched
                let mut next = state.clone();
                next.focused = Some(body.clone());
                state.set_if_neq(next);
            }
            CameraCommand::Follow {
                view,
                body: Some(body),
                distance_factor,
            } => {
                let Ok((transform, mut state, mut pending, _)) = cameras.get_mut(*view) else {
                    warn!("follow {body} requested before the view camera exists");
                    continue;
                };
                let Some(snapshot) = find_body(bodies.iter(), body).filter(usable) else {
                    error!("follow: no usable body {body}, clearing focus");
                    commands
                        .entity(*view)
                        .remove::<(ActiveTransition, FollowRig)>();
                    *pending = PendingFocus::Idle;
                    let mut next = state.clone();
                    next.focused = None;
                    next.followed = None;
                    state.set_if_neq(next);
                    continue;
                };

                let id = ids.next();
                let offset = framing_offset(snapshot.radius, *distance_factor);
                // armed immediately so the flight tracks a moving body
                commands.entity(*view).insert(FollowRig {
                    body: body.clone(),
                    offset,
                });
                commands.entity(*view).insert(ActiveTransition {
                    id,
                    kind: TransitionKind::Follow,
                    body: Some(body.clone()),
                    relative_to: Some(body.clone()),
                    anchor: snapshot.position,
                    from_position: transform.translation,
                    from_target: state.target,
                    to_position: offset,
                    to_target: Vec3::ZERO,
                    duration: config.duration_secs,
                    elapsed: 0.0,
                });
                *pending = PendingFocus::Pending {
                    id,
                    intent: Some(body.clone()),
                };

                let mut next = state.clone();
                next.focused = Some(body.clone());
                next.followed = Some(body.clone());
                state.set_if_neq(next);
            }
            CameraCommand::Follow {
                view, body: None, ..
            } => {
                let Ok((transform, mut state, mut pending, _)) = cameras.get_mut(*view) else {
                    warn!("reset-view requested before the view camera exists");
                    continue;
                };

                let id = ids.next();
                commands.entity(*view).remove::<FollowRig>();
                commands.entity(*view).insert(ActiveTransition {
                    id,
                    kind: TransitionKind::FollowClear,
                    body: None,
                    relative_to: None,
                    anchor: Vec3::ZERO,
                    from_position: transform.translation,
                    from_target: state.target,
                    to_position: DEFAULT_CAMERA_POSITION,
                    to_target: DEFAULT_CAMERA_TARGET,
                    duration: config.duration_secs,
                    elapsed: 0.0,
                });
                *pending = PendingFocus::Pending { id, intent: None };

                let mut next = state.clone();
                next.focused = None;
                next.followed = None;
                state.set_if_neq(next);
            }
            CameraCommand::PointAt { view, position } => {
                let Ok((transform, state, mut pending, _)) = cameras.get_mut(*view) else {
                    warn!("point-at requested before the view camera exists");
                    continue;
                };

                let id = ids.next();
                commands.entity(*view).insert(ActiveTransition {
                    id,
                    kind: TransitionKind::Point,
                    body: None,
                    relative_to: None,
                    anchor: Vec3::ZERO,
                    from_position: transform.translation,
                    from_target: state.target,
                    to_position: transform.translation,
                    to_target: *position,
                    duration: config.duration_secs,
                    elapsed: 0.0,
                });
                *pending = PendingFocus::Pending { id, intent: None };
            }
            CameraCommand::SetFov { view, degrees } => {
                let Ok((_, mut state, _, mut projection)) = cameras.get_mut(*view) else {
                    warn!("set-fov requested before the view camera exists");
                    continue;
                };
                if (state.fov - degrees).abs() <= FOV_EPSILON {
                    continue;
                }
                if let Projection::Perspective(ref mut perspective) = *projection {
                    perspective.fov = degrees.to_radians();
                }
                let mut next = state.clone();
                next.fov = *degrees;
                state.set_if_neq(next);
            }
        }
    }
}
