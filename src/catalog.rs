use bevy::prelude::*;
use bevy::utils::HashMap;
use serde::Deserialize;

use crate::assets::{RonAsset, RonAssetLoader};
use crate::bodies::BodyKind;

// Slots probed for system definition files (systems/system{N}.ron).
const MAX_SYSTEM_SLOTS: usize = 8;

#[derive(Debug, Deserialize, Clone)]
pub struct OrbitConfig {
    pub around: Option<String>, // parent body name; None orbits the system origin
    pub radius: f32,            // orbit radius (scene units)
    pub period: f32,            // days per revolution
    pub phase: f32,             // starting angle (radians)
}

#[derive(Debug, Deserialize, Clone)]
pub struct BodyConfig {
    pub name: String,
    pub kind: BodyKind,
    pub radius: f32, // body radius (scene units)
    pub color: [f32; 3],
    pub orbit: Option<OrbitConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    pub name: String,
    pub description: String,
    pub bodies: Vec<BodyConfig>,
}

#[derive(Default, Resource)]
pub struct SystemCatalog {
    pub systems: HashMap<usize, SystemConfig>,
    pub available: Vec<(usize, String)>, // (slot, display name)
    loading: bool,
    #[allow(dead_code)]
    handles: Vec<Handle<RonAsset>>, // Keep handles alive
}

impl SystemCatalog {
    pub fn new() -> Self {
        Self {
            systems: HashMap::new(),
            available: Vec::new(),
            loading: true,
            handles: Vec::new(),
        }
    }

    pub fn process_system(&mut self, slot: usize, content: &str) {
        match ron::de::from_str::<SystemConfig>(content) {
            Ok(config) => {
                self.available.push((slot, config.name.clone()));
                self.available.sort_by_key(|(slot, _)| *slot);
                self.systems.insert(slot, config);
            }
            Err(err) => error!("bad system definition in slot {slot}: {err}"),
        }
    }

    pub fn get_system(&self, slot: usize) -> Option<SystemConfig> {
        self.systems.get(&slot).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mark_loaded(&mut self) {
        self.loading = false;
    }
}

/// The system currently on display.
#[derive(Resource)]
pub struct CurrentSystem {
    pub config: SystemConfig,
}

// System to ingest loaded definition files
pub fn load_systems(
    mut catalog: ResMut<SystemCatalog>,
    asset_server: Res<AssetServer>,
    ron_assets: Res<Assets<RonAsset>>,
    mut ev_asset: EventReader<AssetEvent<RonAsset>>,
) {
    for ev in ev_asset.read() {
        if let AssetEvent::LoadedWithDependencies { id } = ev {
            if let Some(asset) = ron_assets.get(*id) {
                // Extract the slot number from the asset path
                if let Some(path) = asset_server.get_path(*id) {
                    let path_str = path.path().to_string_lossy();
                    if let Some(file_name) = path_str.split('/').last() {
                        if file_name.starts_with("system") && file_name.ends_with(".ron") {
                            if let Ok(slot) = file_name[6..file_name.len() - 4].parse::<usize>() {
                                catalog.process_system(slot, &asset.0);
                            }
                        }
                    }
                }
            }
        }
    }

    if catalog.is_loading() && !catalog.available.is_empty() {
        catalog.mark_loaded();
    }
}

#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum CatalogLoadState {
    #[default]
    Loading,
    Ready,
}

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<CatalogLoadState>()
            .init_asset::<RonAsset>()
            .init_asset_loader::<RonAssetLoader>()
            .add_systems(Startup, setup_catalog)
            .add_systems(Update, load_systems)
            .add_systems(
                Update,
                check_loading_complete.run_if(in_state(CatalogLoadState::Loading)),
            );
    }
}

fn check_loading_complete(
    catalog: Res<SystemCatalog>,
    mut next_state: ResMut<NextState<CatalogLoadState>>,
) {
    if !catalog.is_loading() {
        next_state.set(CatalogLoadState::Ready);
    }
}

fn setup_catalog(mut commands: Commands, asset_server: Res<AssetServer>) {
    let mut catalog = SystemCatalog::new();

    for slot in 0..MAX_SYSTEM_SLOTS {
        let path = format!("systems/system{}.ron", slot);
        let handle = asset_server.load::<RonAsset>(path);
        catalog.handles.push(handle);
    }

    commands.insert_resource(catalog);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"(
        name: "Test",
        description: "Two bodies.",
        bodies: [
            (
                name: "Star",
                kind: Star,
                radius: 20.0,
                color: [1.0, 0.9, 0.6],
                orbit: None,
            ),
            (
                name: "Planet",
                kind: Planet,
                radius: 3.0,
                color: [0.3, 0.5, 0.9],
                orbit: Some((around: Some("Star"), radius: 150.0, period: 365.0, phase: 0.0)),
            ),
        ],
    )"#;

    #[test]
    fn parses_a_system_definition() {
        let config: SystemConfig = ron::de::from_str(SAMPLE).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.bodies.len(), 2);
        assert_eq!(config.bodies[0].kind, BodyKind::Star);
        let orbit = config.bodies[1].orbit.as_ref().unwrap();
        assert_eq!(orbit.around.as_deref(), Some("Star"));
        assert_eq!(orbit.period, 365.0);
    }

    #[test]
    fn catalog_tracks_available_systems_in_slot_order() {
        let mut catalog = SystemCatalog::new();
        assert!(catalog.is_loading());
        catalog.process_system(1, SAMPLE);
        catalog.process_system(0, SAMPLE);
        assert_eq!(catalog.available[0].0, 0);
        assert_eq!(catalog.available[1].0, 1);
        assert!(catalog.get_system(0).is_some());
        assert!(catalog.get_system(5).is_none());
    }

    #[test]
    fn malformed_definitions_are_skipped() {
        let mut catalog = SystemCatalog::new();
        catalog.process_system(0, "(name: 3)");
        assert!(catalog.available.is_empty());
    }
}
