use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::constants::{PAN_SENSITIVITY, ROTATE_SENSITIVITY, ZOOM_SENSITIVITY};

use super::events::UserCameraInput;
use super::state::CameraState;
use super::transition::ActiveTransition;
use super::ViewCamera;

const MIN_ELEVATION_MARGIN: f32 = 0.05; // radians off the pole

/// Orbit/pan/zoom tuning for one view camera.
#[derive(Component, Debug, Clone)]
pub struct OrbitSettings {
    pub rotate_sensitivity: Vec2,
    pub pan_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: ROTATE_SENSITIVITY,
            pan_sensitivity: PAN_SENSITIVITY,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            min_radius: 1.0,
            max_radius: 20_000.0,
        }
    }
}

pub fn apply_limits(value: f32, upper_limit: Option<f32>, lower_limit: Option<f32>) -> f32 {
    let mut new_val = value;
    if let Some(upper) = upper_limit {
        new_val = f32::min(new_val, upper);
    }
    if let Some(lower) = lower_limit {
        new_val = f32::max(new_val, lower);
    }
    new_val
}

// Keep the orbit from flipping over the pole.
fn clamp_elevation(offset: Vec3, margin: f32) -> Vec3 {
    let radius = offset.length();
    if radius <= f32::EPSILON {
        return offset;
    }
    let max = std::f32::consts::FRAC_PI_2 - margin;
    let elevation = (offset.y / radius).clamp(-1.0, 1.0).asin();
    let clamped = elevation.clamp(-max, max);
    if (clamped - elevation).abs() <= f32::EPSILON {
        return offset;
    }
    let horizontal = Vec2::new(offset.x, offset.z);
    let horizontal_len = horizontal.length().max(f32::EPSILON);
    let scaled = horizontal * (radius * clamped.cos() / horizontal_len);
    Vec3::new(scaled.x, radius * clamped.sin(), scaled.y)
}

/// Orbit with left drag, pan with right drag, zoom with the scroll wheel.
/// Any manual manipulation cancels an in-flight transition and is reported
/// on the `UserCameraInput` channel for reconciliation.
pub fn camera_inputs(
    time: Res<Time>,
    mut contexts: EguiContexts,
    mut commands: Commands,
    mut mouse_wheel: EventReader<MouseWheel>,
    mut mouse_motion: EventReader<MouseMotion>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut cameras: Query<(Entity, &mut Transform, &CameraState, &OrbitSettings), With<ViewCamera>>,
    mut manipulations: EventWriter<UserCameraInput>,
) {
    if contexts.ctx_mut().wants_pointer_input() {
        mouse_motion.clear();
        mouse_wheel.clear();
        return;
    }

    let mouse_delta = mouse_motion
        .read()
        .map(|event| event.delta)
        .sum::<Vec2>();

    let mut scroll = 0.0;
    for ev in mouse_wheel.read() {
        match ev.unit {
            MouseScrollUnit::Line => scroll += ev.y,
            MouseScrollUnit::Pixel => scroll += ev.y * 0.005,
        }
    }

    // Can only control one camera at a time.
    let Some((view, mut transform, state, settings)) = cameras.iter_mut().next() else {
        return;
    };

    let rotating = buttons.pressed(MouseButton::Left) && mouse_delta.length_squared() > 0.0;
    let panning = buttons.pressed(MouseButton::Right) && mouse_delta.length_squared() > 0.0;
    let zooming = scroll.abs() > 0.0;
    if !rotating && !panning && !zooming {
        return;
    }

    let dt = time.delta_secs();
    let mut target = state.target;
    let mut offset = transform.translation - target;

    if rotating {
        let yaw = Quat::from_rotation_y(-mouse_delta.x * settings.rotate_sensitivity.x * dt);
        let pitch = Quat::from_axis_angle(
            *transform.right(),
            -mouse_delta.y * settings.rotate_sensitivity.y * dt,
        );
        offset = clamp_elevation(yaw * pitch * offset, MIN_ELEVATION_MARGIN);
    } else if panning {
        let scale = settings.pan_sensitivity * offset.length() * dt;
        target += (*transform.right() * -mouse_delta.x + *transform.up() * mouse_delta.y) * scale;
    }

    if zooming {
        let factor = 1.0 - scroll * settings.zoom_sensitivity;
        let radius = apply_limits(
            offset.length() * factor,
            Some(settings.max_radius),
            Some(settings.min_radius),
        );
        offset = offset.normalize_or_zero() * radius;
    }

    transform.translation = target + offset;
    transform.look_at(target, Vec3::Y);

    // manual control supersedes any in-flight transition
    commands.entity(view).remove::<ActiveTransition>();
    manipulations.send(UserCameraInput {
        view,
        position: transform.translation,
        target,
    });
}
