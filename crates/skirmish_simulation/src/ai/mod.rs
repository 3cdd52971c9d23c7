//! AI decision-making module
//!
//! - intent: IntentProfile (числовая "личность" агента), трейты, applicator
//! - melee: 3-state контроллер с гистерезисом (Seeking → WindingUp → Recovering)
//! - ranged: donut band контроллер (держать дистанцию, стрелять по LOS)
//! - scheduler: отменяемые отложенные действия (windup strike, очереди)
//!
//! Контроллеры решают КУДА двигаться и КОГДА бить. Исполнение удара/выстрела: combat.

use bevy::prelude::*;

pub mod intent;
pub mod melee;
pub mod ranged;
pub mod scheduler;
pub mod systems;

// Re-export основных типов
pub use intent::{
    bounds, melee_tuning_for, ranged_tuning_for, roll_build, IntentApplicator, IntentModifier,
    IntentProfile, TraitBuild, TraitCatalog, DEFAULT_APPLY_INTERVAL,
};
pub use melee::{MeleeAction, MeleeCommand, MeleeEngagement, MeleeState, MeleeTuning};
pub use ranged::{DonutBand, RangedCommand, RangedEngagement, RangedMove, RangedTuning};
pub use scheduler::{DeferredActions, TaskHandle};
pub use systems::{
    acquire_targets, drive_melee_engagements, drive_ranged_engagements, steer_velocity,
    tick_intent_applicators,
};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. tick_intent_applicators: профиль → тюнинг (Intent set)
/// 2. acquire_targets: ближайший живой враг если цели нет
/// 3. drive_melee_engagements: state machine → velocity, SwingStarted
/// 4. drive_ranged_engagements: donut band → velocity, ShotFired
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            tick_intent_applicators.in_set(crate::SimulationSet::Intent),
        )
        .add_systems(
            FixedUpdate,
            (
                acquire_targets,
                drive_melee_engagements,
                drive_ranged_engagements,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(crate::SimulationSet::Decide),
        );
    }
}
