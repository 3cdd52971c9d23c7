//! AI systems: профиль → тюнинг, выбор цели, melee/ranged контроллеры
//!
//! Контроллеры: чистые структуры (melee.rs, ranged.rs). Здесь только адаптер
//! к ECS: достать позиции, прогнать тик, пропустить желаемое движение через
//! AvoidanceSteering и записать `Body.velocity`.

use bevy::prelude::*;

use super::intent::{IntentApplicator, IntentProfile};
use super::melee::MeleeEngagement;
use super::ranged::RangedEngagement;
use crate::combat::{
    plan_volley, BurstQueue, CombatStats, Dead, RangedWeapon, ShotFired, SweptArcDetector,
    SwingStarted,
};
use crate::components::{Actor, Body, CombatTarget};
use crate::logger;
use crate::movement::{AvoidanceSteering, SteerContext};
use crate::navigation::{ObstacleMap, OpenField, ProbeSense};
use crate::DeterministicRng;

/// Желаемое движение → скорость (с объездом, если есть карта и steering)
pub fn steer_velocity(
    steering: Option<&mut AvoidanceSteering>,
    map: Option<&ObstacleMap>,
    ctx: SteerContext,
    direction: Vec2,
    speed: f32,
    target_position: Option<Vec2>,
    dt: f32,
) -> Vec2 {
    if speed <= 0.0 || direction == Vec2::ZERO {
        return Vec2::ZERO;
    }
    match (steering, map) {
        (Some(steering), Some(map)) => {
            let target = target_position.unwrap_or(ctx.position + direction);
            steering.steer(map, ctx, direction, speed, target, dt)
        }
        _ => direction * speed,
    }
}

/// Система: раз в интервал пересчитать тюнинг контроллеров из профиля
pub fn tick_intent_applicators(
    mut agents: Query<
        (
            &IntentProfile,
            &mut IntentApplicator,
            Option<&mut MeleeEngagement>,
            Option<&mut RangedEngagement>,
        ),
        Without<Dead>,
    >,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (profile, mut applicator, melee, ranged) in agents.iter_mut() {
        if !applicator.tick(delta) {
            continue;
        }
        if let Some(mut melee) = melee {
            applicator.apply_melee(profile, &mut melee.tuning);
        }
        if let Some(mut ranged) = ranged {
            applicator.apply_ranged(profile, &mut ranged.tuning);
        }
    }
}

/// Система: выдать цель агентам без (живой) цели: ближайший живой враг
///
/// Цель, выданная снаружи, сохраняется пока она жива.
pub fn acquire_targets(
    mut commands: Commands,
    seekers: Query<
        (Entity, &Transform, &Actor, Option<&CombatTarget>),
        (
            Without<Dead>,
            Or<(With<MeleeEngagement>, With<RangedEngagement>)>,
        ),
    >,
    candidates: Query<(Entity, &Transform, &Actor), Without<Dead>>,
) {
    for (entity, transform, actor, current) in seekers.iter() {
        if current.is_some_and(|target| candidates.contains(target.entity)) {
            continue;
        }

        let position = transform.translation.truncate();
        let nearest = candidates
            .iter()
            .filter(|(other, _, other_actor)| *other != entity && actor.is_hostile_to(other_actor))
            .map(|(other, other_transform, _)| {
                (other, position.distance_squared(other_transform.translation.truncate()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        match nearest {
            Some((target, _)) => {
                commands.entity(entity).insert(CombatTarget { entity: target });
            }
            None if current.is_some() => {
                commands.entity(entity).remove::<CombatTarget>();
            }
            None => {}
        }
    }
}

/// Позиция цели; протухшая ссылка (entity удалён) → None + warning
fn resolve_target(owner: Entity, target: Option<&CombatTarget>, positions: &Query<&Transform>) -> Option<Vec2> {
    let target = target?;
    match positions.get(target.entity) {
        Ok(transform) => Some(transform.translation.truncate()),
        Err(_) => {
            logger::log_warning(&format!(
                "{:?}: target {:?} no longer exists, skipping",
                owner, target.entity
            ));
            None
        }
    }
}

/// Система: melee контроллеры → velocity, старт взмахов
pub fn drive_melee_engagements(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &mut Body,
            &mut MeleeEngagement,
            Option<&mut SweptArcDetector>,
            Option<&mut AvoidanceSteering>,
            Option<&CombatTarget>,
            &mut CombatStats,
        ),
        Without<Dead>,
    >,
    positions: Query<&Transform>,
    obstacles: Option<Res<ObstacleMap>>,
    mut swings: EventWriter<SwingStarted>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let map = obstacles.as_deref();

    for (entity, transform, mut body, mut melee, detector, steering, target, mut stats) in
        agents.iter_mut()
    {
        let position = transform.translation.truncate();
        let target_position = resolve_target(entity, target, &positions);
        let command = melee.tick(target_position.map(|p| p - position), delta);

        if command.swing_started {
            stats.register_attempt();
            if let Some(mut detector) = detector {
                if detector.start_swing() {
                    logger::log_lazy(|| format!("{:?} swing started", entity));
                }
            }
            swings.write(SwingStarted { attacker: entity });
        }

        let ctx = SteerContext {
            position,
            current_speed: body.achieved_speed,
        };
        body.velocity = steer_velocity(
            steering.map(|s| s.into_inner()),
            map,
            ctx,
            command.direction,
            command.speed,
            target_position,
            delta,
        );
    }
}

/// Система: ranged контроллеры → velocity, выстрелы и очереди
pub fn drive_ranged_engagements(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &Actor,
            &mut Body,
            &mut RangedEngagement,
            &RangedWeapon,
            &mut BurstQueue,
            Option<&mut AvoidanceSteering>,
            Option<&CombatTarget>,
            &mut CombatStats,
        ),
        Without<Dead>,
    >,
    positions: Query<&Transform>,
    obstacles: Option<Res<ObstacleMap>>,
    mut rng: ResMut<DeterministicRng>,
    mut shots: EventWriter<ShotFired>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();
    let map = obstacles.as_deref();

    for (entity, transform, actor, mut body, mut ranged, weapon, mut burst, steering, target, mut stats) in
        agents.iter_mut()
    {
        let position = transform.translation.truncate();
        let muzzle = body.radius;
        let fire = |direction: Vec2| ShotFired {
            shooter: entity,
            faction_id: actor.faction_id,
            origin: position + direction * muzzle,
            direction,
            speed: weapon.projectile_speed,
            damage: weapon.projectile_damage,
            lifetime: weapon.projectile_life,
            radius: weapon.projectile_radius,
        };

        // Очередь, начатая на прошлых тиках
        for direction in burst.shots.advance(delta) {
            shots.write(fire(direction));
        }

        let target_position = resolve_target(entity, target, &positions);
        let to_target = target_position.map(|p| p - position);
        let aim_point = target_position.unwrap_or(position);

        let command = match map {
            Some(map) => {
                let (body_radius, probe_distance) = steering
                    .as_ref()
                    .map(|s| (s.config.agent_radius, s.config.probe_distance))
                    .unwrap_or((body.radius, 1.4));
                let sense = ProbeSense {
                    probe: map,
                    position,
                    body_radius,
                    los_radius: ranged.tuning.los_check_radius,
                    probe_distance,
                };
                ranged.tick(to_target, aim_point, &sense, delta)
            }
            None => ranged.tick(to_target, aim_point, &OpenField, delta),
        };

        // Новая очередь не начинается, пока старая не закончилась
        if let Some(aim) = command.fire {
            if !burst.is_active() {
                stats.register_attempt();
                for shot in plan_volley(weapon, aim, &mut rng.rng) {
                    if shot.delay <= 0.0 {
                        shots.write(fire(shot.direction));
                    } else {
                        burst.shots.schedule(shot.delay, shot.direction);
                    }
                }
            }
        }

        let ctx = SteerContext {
            position,
            current_speed: body.achieved_speed,
        };
        body.velocity = steer_velocity(
            steering.map(|s| s.into_inner()),
            map,
            ctx,
            command.direction,
            command.speed,
            target_position,
            delta,
        );
    }
}
