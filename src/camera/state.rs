use bevy::prelude::*;

use crate::bodies::BodyId;
use crate::constants::{DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET, DEFAULT_FOV_DEGREES};

/// Authoritative camera state for one 3D view.
///
/// `focused` is the body the camera is conceptually pointed at; `followed`
/// is the body it rigidly tracks. A followed body is always also the focus,
/// never the other way around.
///
/// Mutated only by the action executor (optimistic intent, before a
/// transition starts) and the reconciler (authoritative, once a transition
/// completes or the user grabs the controls). Everyone else observes it via
/// change detection, and writes go through `set_if_neq` so an update that
/// changes nothing is invisible downstream.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32, // degrees
    pub focused: Option<BodyId>,
    pub followed: Option<BodyId>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: DEFAULT_CAMERA_POSITION,
            target: DEFAULT_CAMERA_TARGET,
            fov: DEFAULT_FOV_DEGREES,
            focused: None,
            followed: None,
        }
    }
}

impl CameraState {
    pub fn follow_implies_focus(&self) -> bool {
        self.followed.is_none() || self.focused == self.followed
    }
}
