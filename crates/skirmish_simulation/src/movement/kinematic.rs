//! Kinematic интеграция и поворот к цели
//!
//! - integrate_velocity (FixedUpdate): position += velocity·dt, не заходим в стены
//! - face_targets (Update, variable step): Facing смотрит на CombatTarget
//!
//! Движение пишется ТОЛЬКО в fixed step, facing: только в variable step.

use bevy::prelude::*;

use crate::combat::{Dead, Projectile};
use crate::components::{Body, CombatTarget, Facing};
use crate::navigation::ObstacleMap;

/// Сдвинуть позицию с учётом стен.
///
/// Полный шаг → только X → только Y → стоим. Возвращает новую позицию.
pub fn resolve_step(map: Option<&ObstacleMap>, position: Vec2, step: Vec2, radius: f32) -> Vec2 {
    let Some(map) = map else {
        return position + step;
    };

    let candidates = [step, Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y)];
    for candidate in candidates {
        if candidate == Vec2::ZERO {
            continue;
        }
        let next = position + candidate;
        if !map.circle_blocked(next, radius) {
            return next;
        }
    }
    position
}

/// Система: velocity → position
///
/// Записывает `achieved_speed`: steering по нему понимает что агент застрял.
pub fn integrate_velocity(
    mut bodies: Query<(&mut Transform, &mut Body), (Without<Projectile>, Without<Dead>)>,
    obstacles: Option<Res<ObstacleMap>>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }
    let map = obstacles.as_deref();

    for (mut transform, mut body) in bodies.iter_mut() {
        let position = transform.translation.truncate();
        let next = resolve_step(map, position, body.velocity * delta, body.radius);

        body.achieved_speed = next.distance(position) / delta;
        transform.translation.x = next.x;
        transform.translation.y = next.y;
    }
}

/// Система: повернуть Facing к цели (variable step)
pub fn face_targets(
    mut facers: Query<(&Transform, &CombatTarget, &mut Facing), Without<Dead>>,
    targets: Query<&Transform>,
) {
    for (transform, target, mut facing) in facers.iter_mut() {
        let Ok(target_transform) = targets.get(target.entity) else {
            continue;
        };
        let to_target = (target_transform.translation - transform.translation).truncate();
        if let Some(direction) = to_target.try_normalize() {
            facing.forward = direction;
        }
    }
}
