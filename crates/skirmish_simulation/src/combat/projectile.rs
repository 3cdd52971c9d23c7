//! Projectiles: ShotFired → entity → полёт → попадание / стена / таймаут
//!
//! Снаряд движется по прямой каждый fixed тик. Пересечение проверяется по
//! отрезку (старая → новая позиция), чтобы быстрые снаряды не проскакивали цели.

use bevy::prelude::*;

use super::damage::Dead;
use super::events::{HitLanded, HitSource, ShotFired};
use crate::components::{Actor, Body};
use crate::navigation::ObstacleMap;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Projectile {
    pub owner: Entity,
    pub faction_id: u64,
    /// Unit direction
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    /// Сколько ещё жить (сек)
    pub remaining_life: f32,
    pub radius: f32,
}

/// Параметр t ∈ [0, 1] точки отрезка start→end, ближайшей к кругу (None: промах)
pub fn segment_circle_hit(start: Vec2, end: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let segment = end - start;
    let length_sq = segment.length_squared();
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        ((center - start).dot(segment) / length_sq).clamp(0.0, 1.0)
    };
    let closest = start + segment * t;
    (closest.distance_squared(center) <= radius * radius).then_some(t)
}

/// Система: ShotFired → Projectile entity
pub fn spawn_projectiles(mut commands: Commands, mut shots: EventReader<ShotFired>) {
    for shot in shots.read() {
        commands.spawn((
            Projectile {
                owner: shot.shooter,
                faction_id: shot.faction_id,
                direction: shot.direction.try_normalize().unwrap_or(Vec2::Y),
                speed: shot.speed,
                damage: shot.damage,
                remaining_life: shot.lifetime,
                radius: shot.radius,
            },
            Transform::from_xyz(shot.origin.x, shot.origin.y, 0.0),
        ));
    }
}

/// Система: полёт снарядов
///
/// Порядок проверок на тике: враг на отрезке → стена → истёк lifetime.
pub fn move_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
    actors: Query<(Entity, &Transform, &Actor, &Body), (Without<Dead>, Without<Projectile>)>,
    obstacles: Option<Res<ObstacleMap>>,
    mut hits: EventWriter<HitLanded>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        let start = transform.translation.truncate();
        let end = start + projectile.direction * projectile.speed * delta;

        // Ближайший враг вдоль отрезка
        let victim = actors
            .iter()
            .filter(|(other, _, actor, _)| {
                *other != projectile.owner && actor.faction_id != projectile.faction_id
            })
            .filter_map(|(other, other_transform, _, body)| {
                segment_circle_hit(
                    start,
                    end,
                    other_transform.translation.truncate(),
                    body.radius + projectile.radius,
                )
                .map(|t| (t, other))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((_, target)) = victim {
            hits.write(HitLanded {
                attacker: projectile.owner,
                target,
                amount: projectile.damage,
                source: HitSource::Projectile,
            });
            commands.entity(entity).despawn();
            continue;
        }

        if let Some(map) = obstacles.as_deref() {
            if map.circle_blocked(end, projectile.radius) {
                commands.entity(entity).despawn();
                continue;
            }
        }

        projectile.remaining_life -= delta;
        if projectile.remaining_life <= 0.0 {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation.x = end.x;
        transform.translation.y = end.y;
    }
}
