use bevy::prelude::*;

use crate::bodies::{find_body, BodyId, BodySnapshot, CelestialBody};
use crate::constants::FOLLOW_HOLD_FACTOR;
use crate::orbits::SimClock;

use super::events::{FocusChanged, TransitionComplete, TransitionId, TransitionKind, UserCameraInput};
use super::state::CameraState;
use super::transition::FollowRig;
use super::ViewCamera;

/// Per-view record of the transition whose completion we are waiting for.
/// A completion whose id does not match is a superseded flight and is
/// dropped, so stale events can never mis-attribute focus.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub enum PendingFocus {
    #[default]
    Idle,
    Pending {
        id: TransitionId,
        intent: Option<BodyId>,
    },
}

/// Focus/follow outcome of a completion event.
pub fn reconcile_completion(
    prev_focused: &Option<BodyId>,
    prev_followed: &Option<BodyId>,
    kind: TransitionKind,
    body: &Option<BodyId>,
) -> (Option<BodyId>, Option<BodyId>) {
    match kind {
        TransitionKind::Follow => (body.clone(), body.clone()),
        TransitionKind::LookAt => (body.clone(), prev_followed.clone()),
        TransitionKind::FollowClear => (None, None),
        TransitionKind::Point => (prev_focused.clone(), prev_followed.clone()),
    }
}

pub struct UserInputOutcome {
    pub focused: Option<BodyId>,
    pub followed: Option<BodyId>,
    /// Refreshed follow offset when the follow survives the drag.
    pub offset: Option<Vec3>,
}

/// Manual manipulation means free-roam intent, with one exception: while the
/// manipulated target is still on the followed body the user is just
/// orbiting it, and the follow survives with a refreshed offset. Dragging
/// the target off the body clears follow, and focus with it.
pub fn reconcile_user_input(
    focused: &Option<BodyId>,
    followed: &Option<BodyId>,
    position: Vec3,
    target: Vec3,
    followed_body: Option<&BodySnapshot>,
) -> UserInputOutcome {
    match (followed, followed_body) {
        (Some(id), Some(body))
            if target.distance(body.position) <= body.radius * FOLLOW_HOLD_FACTOR =>
        {
            UserInputOutcome {
                focused: focused.clone(),
                followed: Some(id.clone()),
                offset: Some(position - body.position),
            }
        }
        (Some(_), _) => UserInputOutcome {
            focused: None,
            followed: None,
            offset: None,
        },
        (None, _) => UserInputOutcome {
            focused: focused.clone(),
            followed: None,
            offset: None,
        },
    }
}

/// Applies completion events to the state store: the event's pose is
/// authoritative, focus/follow follow the transition kind, and a surviving
/// follow is re-armed against the live registry.
pub fn handle_transition_complete(
    mut commands: Commands,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<(&mut CameraState, &mut PendingFocus), With<ViewCamera>>,
    mut completions: EventReader<TransitionComplete>,
    mut focus_events: EventWriter<FocusChanged>,
) {
    for ev in completions.read() {
        // the view may have been torn down while the flight was in the air
        let Ok((mut state, mut pending)) = cameras.get_mut(ev.view) else {
            continue;
        };
        match *pending {
            PendingFocus::Pending { id, .. } if id == ev.id => {}
            _ => {
                debug!("dropping completion for superseded transition {:?}", ev.id);
                continue;
            }
        }
        *pending = PendingFocus::Idle;

        let (focused, followed) =
            reconcile_completion(&state.focused, &state.followed, ev.kind, &ev.body);

        let mut next = state.clone();
        next.position = ev.position;
        next.target = ev.target;
        next.focused = focused;
        next.followed = followed;

        if let Some(follow_id) = next.followed.clone() {
            if let Some(body) = find_body(bodies.iter(), &follow_id) {
                commands.entity(ev.view).insert(FollowRig {
                    body: follow_id,
                    offset: ev.position - body.position,
                });
            } else {
                warn!("followed body {follow_id} vanished, stopping follow");
                next.followed = None;
                commands.entity(ev.view).remove::<FollowRig>();
            }
        } else {
            commands.entity(ev.view).remove::<FollowRig>();
        }

        let prev_focus = state.focused.clone();
        let focus_moved = next.focused != prev_focus;
        state.set_if_neq(next);
        if focus_moved {
            focus_events.send(FocusChanged {
                view: ev.view,
                body: state.focused.clone(),
            });
        }
    }
}

/// Applies manual drag/pan/zoom to the state store and the follow rig.
pub fn handle_user_input(
    mut commands: Commands,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<(&mut CameraState, &mut PendingFocus, Option<&mut FollowRig>), With<ViewCamera>>,
    mut inputs: EventReader<UserCameraInput>,
    mut focus_events: EventWriter<FocusChanged>,
) {
    for ev in inputs.read() {
        let Ok((mut state, mut pending, rig)) = cameras.get_mut(ev.view) else {
            continue;
        };
        // manual control supersedes whatever flight was pending
        *pending = PendingFocus::Idle;

        let snapshot = state
            .followed
            .as_ref()
            .and_then(|id| find_body(bodies.iter(), id));
        let outcome = reconcile_user_input(
            &state.focused,
            &state.followed,
            ev.position,
            ev.target,
            snapshot.as_ref(),
        );

        if let (Some(body), Some(offset)) = (outcome.followed.clone(), outcome.offset) {
            match rig {
                Some(mut rig) => rig.offset = offset,
                None => {
                    commands.entity(ev.view).insert(FollowRig { body, offset });
                }
            }
        } else {
            commands.entity(ev.view).remove::<FollowRig>();
        }

        let prev_focus = state.focused.clone();
        let mut next = state.clone();
        next.position = ev.position;
        next.target = ev.target;
        next.focused = outcome.focused;
        next.followed = outcome.followed;
        let focus_moved = next.focused != prev_focus;
        state.set_if_neq(next);
        if focus_moved {
            focus_events.send(FocusChanged {
                view: ev.view,
                body: state.focused.clone(),
            });
        }
    }
}

/// Follow watchdog: a followed body that leaves the registry force-stops the
/// follow and clears the stale ids.
pub fn drop_orphaned_follows(
    mut commands: Commands,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<(Entity, &mut CameraState, &FollowRig), With<ViewCamera>>,
    mut focus_events: EventWriter<FocusChanged>,
) {
    for (view, mut state, rig) in cameras.iter_mut() {
        if find_body(bodies.iter(), &rig.body).is_some() {
            continue;
        }
        warn!("followed body {} no longer exists, stopping follow", rig.body);
        commands.entity(view).remove::<FollowRig>();
        let mut next = state.clone();
        next.focused = None;
        next.followed = None;
        state.set_if_neq(next);
        focus_events.send(FocusChanged { view, body: None });
    }
}

/// While paused the body holds still but the user may orbit; on resume the
/// follow continues from the adjusted vantage instead of snapping back.
pub fn refresh_follow_on_resume(
    clock: Res<SimClock>,
    mut was_paused: Local<bool>,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    mut cameras: Query<(&Transform, &mut FollowRig), With<ViewCamera>>,
) {
    let paused = clock.paused;
    if *was_paused && !paused {
        for (transform, mut rig) in cameras.iter_mut() {
            if let Some(body) = find_body(bodies.iter(), &rig.body) {
                rig.offset = transform.translation - body.position;
            }
        }
    }
    *was_paused = paused;
}

#[cfg(test)]
mod tests {
    use super::super::actions::execute_commands;
    use super::super::events::{CameraCommand, TransitionIds};
    use super::super::transition::TransitionConfig;
    use super::*;
    use crate::bodies::BodyKind;

    #[test]
    fn follow_completion_sets_both_ids() {
        let earth = Some(BodyId::new("earth"));
        let (focused, followed) =
            reconcile_completion(&None, &None, TransitionKind::Follow, &earth);
        assert_eq!(focused, earth);
        assert_eq!(followed, earth);
    }

    #[test]
    fn look_at_completion_preserves_follow() {
        let earth = Some(BodyId::new("earth"));
        let luna = Some(BodyId::new("luna"));
        let (focused, followed) =
            reconcile_completion(&earth, &earth, TransitionKind::LookAt, &luna);
        assert_eq!(focused, luna);
        assert_eq!(followed, earth);
    }

    #[test]
    fn follow_clear_completion_clears_both_ids() {
        let earth = Some(BodyId::new("earth"));
        let (focused, followed) =
            reconcile_completion(&earth, &earth, TransitionKind::FollowClear, &None);
        assert_eq!(focused, None);
        assert_eq!(followed, None);
    }

    #[test]
    fn point_completion_touches_nothing() {
        let earth = Some(BodyId::new("earth"));
        let (focused, followed) =
            reconcile_completion(&earth, &earth, TransitionKind::Point, &None);
        assert_eq!(focused, earth);
        assert_eq!(followed, earth);
    }

    #[test]
    fn drag_while_orbiting_keeps_the_follow() {
        let earth = BodyId::new("earth");
        let snapshot = BodySnapshot {
            id: earth.clone(),
            position: Vec3::new(100.0, 0.0, 0.0),
            radius: 10.0,
        };
        let position = Vec3::new(100.0, 20.0, 30.0);
        let target = Vec3::new(102.0, 0.0, 0.0); // still on the body
        let outcome = reconcile_user_input(
            &Some(earth.clone()),
            &Some(earth.clone()),
            position,
            target,
            Some(&snapshot),
        );
        assert_eq!(outcome.followed, Some(earth.clone()));
        assert_eq!(outcome.focused, Some(earth));
        assert_eq!(outcome.offset, Some(position - snapshot.position));
    }

    #[test]
    fn drag_off_the_body_clears_focus_and_follow() {
        let earth = BodyId::new("earth");
        let snapshot = BodySnapshot {
            id: earth.clone(),
            position: Vec3::new(100.0, 0.0, 0.0),
            radius: 10.0,
        };
        let outcome = reconcile_user_input(
            &Some(earth.clone()),
            &Some(earth),
            Vec3::new(500.0, 0.0, 0.0),
            Vec3::new(400.0, 0.0, 0.0), // panned far away
            Some(&snapshot),
        );
        assert_eq!(outcome.focused, None);
        assert_eq!(outcome.followed, None);
        assert_eq!(outcome.offset, None);
    }

    #[test]
    fn drag_without_a_follow_keeps_plain_focus() {
        let earth = Some(BodyId::new("earth"));
        let outcome =
            reconcile_user_input(&earth, &None, Vec3::ONE, Vec3::ZERO, None);
        assert_eq!(outcome.focused, earth);
        assert_eq!(outcome.followed, None);
    }

    fn scenario_app() -> App {
        let mut app = App::new();
        app.add_event::<CameraCommand>();
        app.add_event::<TransitionComplete>();
        app.add_event::<UserCameraInput>();
        app.add_event::<FocusChanged>();
        app.insert_resource(TransitionConfig::default());
        app.insert_resource(TransitionIds::default());
        app.add_systems(
            Update,
            (execute_commands, handle_transition_complete, handle_user_input).chain(),
        );
        app
    }

    fn spawn_view(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                ViewCamera,
                CameraState::default(),
                PendingFocus::default(),
                Transform::from_translation(CameraState::default().position),
                Projection::Perspective(PerspectiveProjection::default()),
            ))
            .id()
    }

    fn spawn_earth(app: &mut App) {
        app.world_mut().spawn((
            CelestialBody {
                id: BodyId::new("earth"),
                kind: BodyKind::Planet,
                radius: 10.0,
                parent: None,
            },
            Transform::from_translation(Vec3::new(100.0, 0.0, 0.0)),
        ));
    }

    fn pending_id(app: &App, view: Entity) -> TransitionId {
        match app.world().entity(view).get::<PendingFocus>().unwrap() {
            PendingFocus::Pending { id, .. } => *id,
            PendingFocus::Idle => panic!("no pending transition"),
        }
    }

    #[test]
    fn follow_earth_end_to_end() {
        let mut app = scenario_app();
        let view = spawn_view(&mut app);
        spawn_earth(&mut app);

        app.world_mut().send_event(CameraCommand::Follow {
            view,
            body: Some(BodyId::new("earth")),
            distance_factor: None,
        });
        app.update();
        let id = pending_id(&app, view);

        let end_position = Vec3::new(100.0, 0.0, 0.0)
            + super::super::actions::framing_offset(10.0, None);
        app.world_mut().send_event(TransitionComplete {
            view,
            id,
            kind: TransitionKind::Follow,
            position: end_position,
            target: Vec3::new(100.0, 0.0, 0.0),
            body: Some(BodyId::new("earth")),
        });
        app.update();

        let state = app.world().entity(view).get::<CameraState>().unwrap();
        assert_eq!(state.focused, Some(BodyId::new("earth")));
        assert_eq!(state.followed, Some(BodyId::new("earth")));
        assert_eq!(state.target, Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(state.position, end_position);
        assert_eq!(
            app.world().entity(view).get::<PendingFocus>().unwrap(),
            &PendingFocus::Idle
        );
        let rig = app.world().entity(view).get::<FollowRig>().unwrap();
        assert_eq!(rig.offset, end_position - Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn clearing_a_follow_ends_with_no_ids() {
        let mut app = scenario_app();
        let view = spawn_view(&mut app);
        spawn_earth(&mut app);

        app.world_mut().send_event(CameraCommand::Follow {
            view,
            body: Some(BodyId::new("earth")),
            distance_factor: None,
        });
        app.update();

        app.world_mut()
            .send_event(CameraCommand::reset_view(view));
        app.update();
        let id = pending_id(&app, view);

        app.world_mut().send_event(TransitionComplete {
            view,
            id,
            kind: TransitionKind::FollowClear,
            position: CameraState::default().position,
            target: CameraState::default().target,
            body: None,
        });
        app.update();

        let state = app.world().entity(view).get::<CameraState>().unwrap();
        assert_eq!(state.focused, None);
        assert_eq!(state.followed, None);
        assert!(app.world().entity(view).get::<FollowRig>().is_none());
    }

    #[test]
    fn stale_completions_are_dropped() {
        let mut app = scenario_app();
        let view = spawn_view(&mut app);
        spawn_earth(&mut app);

        app.world_mut().send_event(CameraCommand::Follow {
            view,
            body: Some(BodyId::new("earth")),
            distance_factor: None,
        });
        app.update();
        let live_id = pending_id(&app, view);

        app.world_mut().send_event(TransitionComplete {
            view,
            id: TransitionId(live_id.0 + 999),
            kind: TransitionKind::FollowClear,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            body: None,
        });
        app.update();

        // the stale clear must not have clobbered the optimistic follow
        let state = app.world().entity(view).get::<CameraState>().unwrap();
        assert_eq!(state.followed, Some(BodyId::new("earth")));
        assert_eq!(pending_id(&app, view), live_id);
    }

    #[test]
    fn manual_drag_keeps_follow_and_adopts_the_event_pose() {
        let mut app = scenario_app();
        let view = spawn_view(&mut app);
        spawn_earth(&mut app);

        app.world_mut().send_event(CameraCommand::Follow {
            view,
            body: Some(BodyId::new("earth")),
            distance_factor: None,
        });
        app.update();

        let position = Vec3::new(100.0, 25.0, 20.0);
        let target = Vec3::new(100.0, 0.0, 0.0);
        app.world_mut().send_event(UserCameraInput {
            view,
            position,
            target,
        });
        app.update();

        let state = app.world().entity(view).get::<CameraState>().unwrap();
        assert_eq!(state.followed, Some(BodyId::new("earth")));
        assert_eq!(state.position, position);
        assert_eq!(state.target, target);
        let rig = app.world().entity(view).get::<FollowRig>().unwrap();
        assert_eq!(rig.offset, position - Vec3::new(100.0, 0.0, 0.0));
    }
}
