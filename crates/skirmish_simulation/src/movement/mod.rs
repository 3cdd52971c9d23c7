//! Movement domain: steering и интеграция скорости
//!
//! Содержит:
//! - AvoidanceSteering (локальный объезд статических препятствий)
//! - integrate_velocity (velocity → Transform, fixed step)
//! - face_targets (Facing → цель, variable step)

pub mod avoidance;
pub mod kinematic;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod avoidance_tests;

pub use avoidance::{AvoidanceConfig, AvoidanceSteering, SteerContext, SteerOutcome};
pub use kinematic::{face_targets, integrate_velocity, resolve_step};

use bevy::prelude::*;

/// Movement Plugin
///
/// - integrate_velocity в FixedUpdate (после решений AI, до combat)
/// - face_targets в Update (variable step, только поворот)
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            integrate_velocity.in_set(crate::SimulationSet::Move),
        )
        .add_systems(Update, face_targets);
    }
}
