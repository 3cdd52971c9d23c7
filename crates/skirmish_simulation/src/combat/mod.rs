//! Combat system module
//!
//! ECS ответственность:
//! - Weapon records: MeleeWeapon, RangedWeapon (+ FirePattern)
//! - Melee: SweptArcDetector (swept-arc overlap, hit-set на взмах)
//! - Ranged: plan_volley, BurstQueue, Projectile
//! - Damage: HitLanded → Health → DamageDealt / EntityDied → Dead
//! - Telemetry: CombatStats
//!
//! Решения (когда бить/стрелять) принимает AI, здесь только исполнение.

use bevy::prelude::*;

pub mod damage;
pub mod events;
pub mod fire;
pub mod projectile;
pub mod stats;
pub mod sweep;
pub mod systems;
pub mod weapon;

// Re-export основных типов
pub use damage::{apply_damage, handle_deaths, DamageDealt, Dead, EntityDied};
pub use events::{HitLanded, HitSource, ShotFired, SwingStarted};
pub use fire::{plan_volley, BurstQueue, VolleyShot};
pub use projectile::{move_projectiles, spawn_projectiles, Projectile};
pub use stats::CombatStats;
pub use sweep::{DamageSink, HitShape, HurtTarget, SweptArcDetector, TargetQuery, WielderPose};
pub use systems::tick_swept_arcs;
pub use weapon::{suggested_range, FirePattern, MeleeWeapon, RangedWeapon};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. tick_swept_arcs: активные взмахи → HitLanded
/// 2. spawn_projectiles: ShotFired → Projectile
/// 3. move_projectiles: полёт, попадания → HitLanded
/// 4. apply_damage: HitLanded → Health, DamageDealt/EntityDied
/// 5. handle_deaths: Dead marker, отмена отложенных атак
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<SwingStarted>()
            .add_event::<ShotFired>()
            .add_event::<HitLanded>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                tick_swept_arcs,
                spawn_projectiles,
                move_projectiles,
                apply_damage,
                handle_deaths,
            )
                .chain()
                .in_set(crate::SimulationSet::Resolve),
        );
    }
}
