use bevy::prelude::*;
use bevy_persistent::prelude::*;

pub mod actions;
pub mod events;
pub mod input;
pub mod reconcile;
pub mod state;
pub mod transition;

pub use events::{
    CameraCommand, FocusChanged, TransitionComplete, TransitionId, TransitionIds, TransitionKind,
    UserCameraInput,
};
pub use reconcile::PendingFocus;
pub use state::CameraState;
pub use transition::{ActiveTransition, FollowRig, TransitionConfig};

use crate::bodies::{main_star, CelestialBody};
use crate::constants::DEFAULT_FOV_DEGREES;
use crate::persistence::ViewerPrefs;
use crate::ui::ViewState;
use actions::framing_position;
use input::OrbitSettings;

/// Marker for a camera entity owned by this subsystem. Each logical 3D view
/// gets one, carrying its own state store, pending record and input tuning.
#[derive(Component, Debug)]
pub struct ViewCamera;

/// The view UI commands are addressed to.
#[derive(Resource, Default)]
pub struct ActiveView(pub Option<Entity>);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraUpdateSet;

pub struct ViewCameraPlugin;

impl Plugin for ViewCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransitionIds>()
            .init_resource::<ActiveView>()
            .init_resource::<TransitionConfig>()
            .add_event::<CameraCommand>()
            .add_event::<TransitionComplete>()
            .add_event::<UserCameraInput>()
            .add_event::<FocusChanged>()
            .add_systems(Update, manage_view_rigs.before(CameraUpdateSet))
            .add_systems(OnExit(ViewState::Viewing), teardown_views)
            .add_systems(
                Update,
                (
                    input::camera_inputs,
                    actions::execute_commands,
                    reconcile::handle_user_input,
                    transition::run_transitions,
                    reconcile::handle_transition_complete,
                    reconcile::refresh_follow_on_resume,
                    transition::apply_follow,
                    reconcile::drop_orphaned_follows,
                )
                    .chain()
                    .in_set(CameraUpdateSet)
                    .run_if(in_state(ViewState::Viewing)),
            );
    }
}

/// View lifecycle: a camera rig exists exactly while simulated bodies do.
/// The initial pose frames the main star when there is one, and falls back
/// to the fixed default pose otherwise.
fn manage_view_rigs(
    mut commands: Commands,
    prefs: Option<Res<Persistent<ViewerPrefs>>>,
    bodies: Query<(&CelestialBody, &Transform), Without<ViewCamera>>,
    views: Query<Entity, With<ViewCamera>>,
    mut active: ResMut<ActiveView>,
) {
    let have_bodies = !bodies.is_empty();
    if have_bodies && views.is_empty() {
        let fov = prefs.map(|prefs| prefs.fov).unwrap_or(DEFAULT_FOV_DEGREES);
        let mut state = CameraState {
            fov,
            ..Default::default()
        };
        if let Some(star) = main_star(bodies.iter()) {
            state.position = framing_position(star.position, star.radius, None);
            state.target = star.position;
        }

        let entity = commands
            .spawn((
                Camera3d::default(),
                Projection::Perspective(PerspectiveProjection {
                    fov: fov.to_radians(),
                    ..default()
                }),
                Transform::from_translation(state.position).looking_at(state.target, Vec3::Y),
                ViewCamera,
                state,
                PendingFocus::default(),
                OrbitSettings::default(),
                Name::new("view camera"),
            ))
            .id();
        active.0 = Some(entity);
        info!("view camera created");
    } else if !have_bodies && !views.is_empty() {
        for entity in views.iter() {
            commands.entity(entity).despawn_recursive();
        }
        active.0 = None;
        info!("view camera destroyed");
    }
}

fn teardown_views(
    mut commands: Commands,
    views: Query<Entity, With<ViewCamera>>,
    mut active: ResMut<ActiveView>,
) {
    for entity in views.iter() {
        commands.entity(entity).despawn_recursive();
    }
    active.0 = None;
}
