use bevy::prelude::*;
use bevy_persistent::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::camera::{CameraState, TransitionConfig, ViewCamera};
use crate::constants::{DEFAULT_FOV_DEGREES, TRANSITION_SECS};

#[derive(Resource, Serialize, Deserialize, Clone)]
pub struct ViewerPrefs {
    pub fov: f32,
    pub transition_secs: f32,
}

impl Default for ViewerPrefs {
    fn default() -> Self {
        Self {
            fov: DEFAULT_FOV_DEGREES,
            transition_secs: TRANSITION_SECS,
        }
    }
}

pub fn setup_persistence(mut commands: Commands) {
    let config_dir = dirs::config_dir()
        .map(|native_config_dir| native_config_dir.join("orrery"))
        .unwrap_or(PathBuf::from("local/configuration"));

    let prefs = Persistent::<ViewerPrefs>::builder()
        .name("viewer_prefs")
        .format(StorageFormat::Json)
        .path(config_dir.join("prefs.json"))
        .default(ViewerPrefs::default())
        .build()
        .expect("Failed to initialize viewer preferences");

    commands.insert_resource(TransitionConfig {
        duration_secs: prefs.transition_secs,
    });
    commands.insert_resource(prefs);
}

/// Remembers the last FOV the user settled on.
pub fn persist_fov(
    cameras: Query<&CameraState, (With<ViewCamera>, Changed<CameraState>)>,
    mut prefs: ResMut<Persistent<ViewerPrefs>>,
) {
    for state in cameras.iter() {
        if (prefs.fov - state.fov).abs() > f32::EPSILON {
            let fov = state.fov;
            if let Err(err) = prefs.update(|prefs| prefs.fov = fov) {
                warn!("failed to persist viewer preferences: {err}");
            }
        }
    }
}
