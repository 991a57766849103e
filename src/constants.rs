use bevy::math::{Vec2, Vec3};

// Default pose a view camera starts from and returns to on "reset view"
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 140.0, 380.0);
pub const DEFAULT_CAMERA_TARGET: Vec3 = Vec3::ZERO;
pub const DEFAULT_FOV_DEGREES: f32 = 60.0; // vertical FOV in degrees

// Framing: the camera sits along this direction from a body at
// radius * factor; the factor is floored so the camera never ends up
// inside the body.
pub const DEFAULT_VIEW_DIR: Vec3 = Vec3::new(0.4, 0.3, 1.0);
pub const DEFAULT_DISTANCE_FACTOR: f32 = 3.0;
pub const MIN_DISTANCE_FACTOR: f32 = 1.5;

pub const TRANSITION_SECS: f32 = 1.2; // camera transition duration
pub const FOV_EPSILON: f32 = 1e-3;

// A drag keeps a follow alive while the manipulated target stays within
// this many radii of the followed body.
pub const FOLLOW_HOLD_FACTOR: f32 = 2.0;

// How far from the origin a parentless star may sit and still count as
// the main star for the initial framing.
pub const MAIN_STAR_ORIGIN_RADIUS: f32 = 50.0;

pub const ROTATE_SENSITIVITY: Vec2 = Vec2::new(0.8, 0.8);
pub const PAN_SENSITIVITY: f32 = 0.2;
pub const ZOOM_SENSITIVITY: f32 = 0.2;
