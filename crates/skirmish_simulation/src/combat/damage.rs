//! Damage применение и смерть
//!
//! HitLanded (sweep / projectile) → apply_damage → DamageDealt / EntityDied
//! EntityDied → handle_deaths → Dead marker, стоп движения, отмена отложенных атак
//!
//! Урон по entity без Health: тихий no-op. Деспавн мёртвых не наша забота.

use bevy::prelude::*;

use super::events::{HitLanded, HitSource};
use super::fire::BurstQueue;
use super::stats::CombatStats;
use super::sweep::SweptArcDetector;
use crate::ai::{MeleeEngagement, RangedEngagement};
use crate::components::{Body, Health};
use crate::logger;

/// Событие: урон нанесен
///
/// Генерируется после применения урона к Health.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    /// Фактически снятое HP
    pub damage: f32,
    pub source: HitSource,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Мёртвые не двигаются, не атакуют и не являются целями.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Система: HitLanded → Health
pub fn apply_damage(
    mut hits: EventReader<HitLanded>,
    mut damage_dealt_events: EventWriter<DamageDealt>,
    mut entity_died_events: EventWriter<EntityDied>,
    mut targets: Query<&mut Health>,
    mut attackers: Query<&mut CombatStats>,
) {
    for hit in hits.read() {
        let Ok(mut health) = targets.get_mut(hit.target) else {
            // Нет Health (или entity уже удалён): урон некуда применять
            logger::log_lazy(|| format!("hit on {:?} ignored: no Health", hit.target));
            continue;
        };

        // Добили в этом же тике другим попаданием
        if !health.is_alive() {
            continue;
        }
        let dealt = health.take_damage(hit.amount);
        let died = !health.is_alive();

        if let Ok(mut stats) = attackers.get_mut(hit.attacker) {
            stats.register_hit();
        }

        damage_dealt_events.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.target,
            damage: dealt,
            source: hit.source,
            target_died: died,
        });

        if died {
            entity_died_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.attacker),
            });
        }
    }
}

/// Система: обработка смерти
///
/// Маркер Dead, velocity = 0, отмена windup/взмаха/очереди, контроллеры выключены.
pub fn handle_deaths(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut agents: Query<(
        Option<&mut Body>,
        Option<&mut MeleeEngagement>,
        Option<&mut RangedEngagement>,
        Option<&mut SweptArcDetector>,
        Option<&mut BurstQueue>,
    )>,
) {
    for death in deaths.read() {
        let Ok((body, melee, ranged, detector, burst)) = agents.get_mut(death.entity) else {
            logger::log_warning(&format!("death of {:?} skipped: entity is gone", death.entity));
            continue;
        };

        if let Some(mut body) = body {
            body.velocity = Vec2::ZERO;
            body.achieved_speed = 0.0;
        }
        if let Some(mut melee) = melee {
            melee.disable();
        }
        if let Some(mut ranged) = ranged {
            ranged.disable();
        }
        if let Some(mut detector) = detector {
            detector.cancel_swing();
        }
        if let Some(mut burst) = burst {
            burst.cancel();
        }

        commands.entity(death.entity).insert(Dead);

        logger::log_info(&format!(
            "Entity {:?} killed by {:?}",
            death.entity, death.killer
        ));
    }
}
