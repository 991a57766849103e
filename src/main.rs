use bevy::prelude::*;
use bevy_egui::EguiPlugin;

mod assets;
mod bodies;
mod camera;
mod catalog;
mod constants;
mod orbits;
mod persistence;
mod scene;
mod ui;

use camera::{CameraUpdateSet, ViewCameraPlugin};
use catalog::{CatalogPlugin, CurrentSystem};
use orbits::SimClock;
use ui::ViewState;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Orrery".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins((CatalogPlugin, ViewCameraPlugin))
        .init_state::<ViewState>()
        .insert_resource(SimClock::default())
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 60.0,
        })
        .add_systems(Startup, persistence::setup_persistence)
        .add_systems(OnEnter(ViewState::Viewing), scene::spawn_system)
        .add_systems(OnExit(ViewState::Viewing), scene::despawn_system)
        .add_systems(
            Update,
            ui::system_select_ui.run_if(in_state(ViewState::SystemSelect)),
        )
        .add_systems(
            Update,
            (
                (orbits::advance_clock, orbits::propagate_orbits).chain(),
                ui::viewer_ui,
                ui::announce_focus_changes,
                persistence::persist_fov,
            )
                .before(CameraUpdateSet)
                .run_if(|world: &World| {
                    world.contains_resource::<CurrentSystem>()
                        && matches!(
                            world.resource::<State<ViewState>>().get(),
                            ViewState::Viewing
                        )
                }),
        )
        .run();
}
