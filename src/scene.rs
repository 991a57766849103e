use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use rand::Rng;

use crate::bodies::{BodyId, BodyKind, CelestialBody};
use crate::catalog::CurrentSystem;
use crate::orbits::Orbit;

const STARFIELD_COUNT: usize = 400;
const STARFIELD_RADIUS: f32 = 6000.0;
const STAR_LIGHT_INTENSITY: f32 = 5e9;
const STAR_LIGHT_RANGE: f32 = 10_000.0;

// Everything spawned for the current system, for wholesale teardown.
#[derive(Component)]
pub struct SceneObject;

pub fn spawn_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    current: Res<CurrentSystem>,
) {
    info!("spawning system {}", current.config.name);

    for body in &current.config.bodies {
        let color = Color::srgb(body.color[0], body.color[1], body.color[2]);
        let material = if body.kind == BodyKind::Star {
            StandardMaterial {
                base_color: color,
                emissive: LinearRgba::rgb(
                    body.color[0] * 8.0,
                    body.color[1] * 8.0,
                    body.color[2] * 8.0,
                ),
                ..default()
            }
        } else {
            StandardMaterial {
                base_color: color,
                perceptual_roughness: 0.9,
                ..default()
            }
        };

        let orbit = body.orbit.as_ref().map(|orbit| Orbit {
            around: orbit.around.clone().map(BodyId::new),
            radius: orbit.radius,
            period: orbit.period,
            phase: orbit.phase,
        });
        let parent = orbit.as_ref().and_then(|orbit| orbit.around.clone());

        let mut entity = commands.spawn((
            Mesh3d(meshes.add(Sphere::new(body.radius).mesh().uv(48, 24))),
            MeshMaterial3d(materials.add(material)),
            // placed by orbit propagation on the first tick
            Transform::default(),
            CelestialBody {
                id: BodyId::new(&body.name),
                kind: body.kind,
                radius: body.radius,
                parent,
            },
            SceneObject,
            Name::new(body.name.clone()),
        ));
        if let Some(orbit) = orbit {
            entity.insert(orbit);
        }
        if body.kind == BodyKind::Star {
            entity.with_children(|children| {
                children.spawn(PointLight {
                    color: Color::WHITE,
                    intensity: STAR_LIGHT_INTENSITY,
                    range: STAR_LIGHT_RANGE,
                    shadows_enabled: false,
                    ..default()
                });
            });
        }
    }

    spawn_starfield(&mut commands, &mut meshes, &mut materials);
}

fn spawn_starfield(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = rand::thread_rng();
    let mesh = meshes.add(Sphere::new(1.5).mesh().ico(2).unwrap());
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        emissive: LinearRgba::rgb(2.0, 2.0, 2.0),
        unlit: true,
        ..default()
    });

    for _ in 0..STARFIELD_COUNT {
        let direction = loop {
            let candidate = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if candidate.length_squared() > 1e-3 {
                break candidate.normalize();
            }
        };
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(direction * STARFIELD_RADIUS),
            NotShadowCaster,
            SceneObject,
        ));
    }
}

pub fn despawn_system(mut commands: Commands, objects: Query<Entity, With<SceneObject>>) {
    for entity in objects.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
