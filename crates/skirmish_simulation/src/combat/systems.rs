//! Combat systems поверх SweptArcDetector

use bevy::prelude::*;

use super::damage::Dead;
use super::events::{HitLanded, HitSource};
use super::sweep::{HurtTarget, SweptArcDetector, WielderPose};
use crate::components::{Actor, Body, Facing};
use crate::logger;

/// Hurt circles всех живых врагов `attacker`
pub fn hostile_targets<'a>(
    attacker: Entity,
    faction: &Actor,
    candidates: impl Iterator<Item = (Entity, &'a Transform, &'a Actor, &'a Body)>,
) -> Vec<HurtTarget> {
    candidates
        .filter(|(entity, _, actor, _)| *entity != attacker && faction.is_hostile_to(actor))
        .map(|(entity, transform, _, body)| HurtTarget {
            entity,
            center: transform.translation.truncate(),
            radius: body.radius,
        })
        .collect()
}

/// Система: продвинуть активные взмахи, попадания → HitLanded
pub fn tick_swept_arcs(
    mut attackers: Query<(Entity, &Transform, &Facing, &Actor, &mut SweptArcDetector), Without<Dead>>,
    targets: Query<(Entity, &Transform, &Actor, &Body), Without<Dead>>,
    mut hits: EventWriter<HitLanded>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, transform, facing, actor, mut detector) in attackers.iter_mut() {
        if !detector.is_active() {
            continue;
        }

        let candidates = hostile_targets(entity, actor, targets.iter());
        let pose = WielderPose {
            position: transform.translation.truncate(),
            forward: facing.forward,
        };

        let mut accepted: Vec<(Entity, f32)> = Vec::new();
        detector.tick(delta, Some(pose), &candidates, &mut accepted);

        for (target, amount) in accepted {
            logger::log_lazy(|| format!("{:?} swing hit {:?} for {}", entity, target, amount));
            hits.write(HitLanded {
                attacker: entity,
                target,
                amount,
                source: HitSource::Melee,
            });
        }
    }
}
