//! Боевые события (ядро → внешние подсистемы и обратно)

use bevy::prelude::*;

/// Откуда прилетел урон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HitSource {
    /// Swept-arc взмах
    Melee,
    Projectile,
}

/// Melee взмах начался (после windup)
#[derive(Event, Debug, Clone)]
pub struct SwingStarted {
    pub attacker: Entity,
}

/// Снаряд выпущен (spawn_projectiles создаёт entity)
#[derive(Event, Debug, Clone)]
pub struct ShotFired {
    pub shooter: Entity,
    pub faction_id: u64,
    pub origin: Vec2,
    /// Unit direction
    pub direction: Vec2,
    pub speed: f32,
    pub damage: f32,
    pub lifetime: f32,
    pub radius: f32,
}

/// Попадание принято детектором: урон ещё НЕ применён
///
/// apply_damage превращает его в DamageDealt (если у цели есть Health).
#[derive(Event, Debug, Clone)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
    pub source: HitSource,
}
