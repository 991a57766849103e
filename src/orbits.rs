use std::f32::consts::TAU;

use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::bodies::{BodyId, CelestialBody};

// Orbit chains are shallow (star -> planet -> moon); anything deeper is a
// config error and the walk just stops.
const MAX_ORBIT_DEPTH: usize = 8;

/// Simulation clock. `elapsed` counts simulated days; `speed` is days per
/// wall-clock second.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub paused: bool,
    pub speed: f32,
    pub elapsed: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            paused: false,
            speed: 5.0,
            elapsed: 0.0,
        }
    }
}

/// Circular orbit around a named parent body, or around the system origin
/// when no parent is given.
#[derive(Component, Debug, Clone)]
pub struct Orbit {
    pub around: Option<BodyId>,
    pub radius: f32,
    pub period: f32, // days
    pub phase: f32,  // radians
}

pub fn advance_clock(time: Res<Time>, mut clock: ResMut<SimClock>) {
    if !clock.paused {
        let step = time.delta_secs() * clock.speed;
        clock.elapsed += step;
    }
}

/// Offset from the orbit's parent at the given sim time, in the XZ plane.
pub fn orbit_offset(orbit: &Orbit, elapsed: f32) -> Vec3 {
    if orbit.period <= 0.0 {
        return Vec3::ZERO;
    }
    let angle = orbit.phase + TAU * (elapsed / orbit.period);
    Vec3::new(orbit.radius * angle.cos(), 0.0, orbit.radius * angle.sin())
}

/// World position of a body given everyone's local (parent, offset) pairs.
pub fn resolve_position(locals: &HashMap<BodyId, (Option<BodyId>, Vec3)>, id: &BodyId) -> Vec3 {
    let mut position = Vec3::ZERO;
    let mut current = Some(id.clone());
    for _ in 0..MAX_ORBIT_DEPTH {
        let Some(ref id) = current else { break };
        let Some((parent, offset)) = locals.get(id) else {
            break;
        };
        position += *offset;
        current = parent.clone();
    }
    position
}

/// Places every body at its orbital position for the current sim time.
/// Placement is a pure function of the clock, so pausing the clock freezes
/// the system without any extra bookkeeping here.
pub fn propagate_orbits(
    clock: Res<SimClock>,
    mut bodies: Query<(&CelestialBody, Option<&Orbit>, &mut Transform)>,
) {
    let mut locals: HashMap<BodyId, (Option<BodyId>, Vec3)> = HashMap::new();
    for (body, orbit, _) in bodies.iter() {
        let offset = orbit
            .map(|orbit| orbit_offset(orbit, clock.elapsed))
            .unwrap_or(Vec3::ZERO);
        let parent = orbit.and_then(|orbit| orbit.around.clone());
        locals.insert(body.id.clone(), (parent, offset));
    }

    for (body, _, mut transform) in bodies.iter_mut() {
        transform.translation = resolve_position(&locals, &body.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit(around: Option<&str>, radius: f32, period: f32, phase: f32) -> Orbit {
        Orbit {
            around: around.map(BodyId::new),
            radius,
            period,
            phase,
        }
    }

    #[test]
    fn orbit_offset_starts_at_phase_angle() {
        let o = orbit(None, 100.0, 4.0, 0.0);
        let at_start = orbit_offset(&o, 0.0);
        assert!(at_start.abs_diff_eq(Vec3::new(100.0, 0.0, 0.0), 1e-3));

        let quarter = orbit_offset(&o, 1.0);
        assert!(quarter.abs_diff_eq(Vec3::new(0.0, 0.0, 100.0), 1e-3));
    }

    #[test]
    fn orbit_offset_with_zero_period_stays_put() {
        let o = orbit(None, 100.0, 0.0, 0.0);
        assert_eq!(orbit_offset(&o, 12.0), Vec3::ZERO);
    }

    #[test]
    fn moons_stack_on_their_planet() {
        let mut locals = HashMap::new();
        locals.insert(BodyId::new("sol"), (None, Vec3::ZERO));
        locals.insert(
            BodyId::new("earth"),
            (Some(BodyId::new("sol")), Vec3::new(100.0, 0.0, 0.0)),
        );
        locals.insert(
            BodyId::new("luna"),
            (Some(BodyId::new("earth")), Vec3::new(10.0, 0.0, 0.0)),
        );

        assert_eq!(
            resolve_position(&locals, &BodyId::new("luna")),
            Vec3::new(110.0, 0.0, 0.0)
        );
        assert_eq!(
            resolve_position(&locals, &BodyId::new("earth")),
            Vec3::new(100.0, 0.0, 0.0)
        );
    }

    #[test]
    fn unknown_parent_ends_the_walk() {
        let mut locals = HashMap::new();
        locals.insert(
            BodyId::new("stray"),
            (Some(BodyId::new("missing")), Vec3::new(5.0, 0.0, 0.0)),
        );
        assert_eq!(
            resolve_position(&locals, &BodyId::new("stray")),
            Vec3::new(5.0, 0.0, 0.0)
        );
    }
}
