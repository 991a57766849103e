use std::cmp::Ordering;
use std::fmt;

use bevy::prelude::*;
use serde::Deserialize;

use crate::constants::MAIN_STAR_ORIGIN_RADIUS;

/// Identifier a body is known by across the camera subsystem and the UI.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub String);

impl BodyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
}

/// A simulated body. Doubles as the registry the camera subsystem resolves
/// ids against; the camera side never mutates it.
#[derive(Component, Debug, Clone)]
pub struct CelestialBody {
    pub id: BodyId,
    pub kind: BodyKind,
    pub radius: f32,
    pub parent: Option<BodyId>,
}

/// Read-only view of one body at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec3,
    pub radius: f32,
}

pub fn find_body<'a>(
    bodies: impl IntoIterator<Item = (&'a CelestialBody, &'a Transform)>,
    id: &BodyId,
) -> Option<BodySnapshot> {
    bodies
        .into_iter()
        .find(|(body, _)| &body.id == id)
        .map(|(body, transform)| BodySnapshot {
            id: body.id.clone(),
            position: transform.translation,
            radius: body.radius,
        })
}

/// The star used for the initial framing: parentless, kind `Star`, sitting
/// at or near the origin. Nearest to the origin wins.
pub fn main_star<'a>(
    bodies: impl IntoIterator<Item = (&'a CelestialBody, &'a Transform)>,
) -> Option<BodySnapshot> {
    bodies
        .into_iter()
        .filter(|(body, _)| body.kind == BodyKind::Star && body.parent.is_none())
        .map(|(body, transform)| (body, transform.translation))
        .filter(|(_, position)| position.length() <= MAIN_STAR_ORIGIN_RADIUS)
        .min_by(|a, b| {
            a.1.length()
                .partial_cmp(&b.1.length())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(body, position)| BodySnapshot {
            id: body.id.clone(),
            position,
            radius: body.radius,
        })
}
