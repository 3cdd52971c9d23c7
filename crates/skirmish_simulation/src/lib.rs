//! Skirmish Simulation Core
//!
//! ECS-симуляция боевого AI арены на Bevy 0.16 (2D, headless)
//!
//! Слои:
//! - ai: IntentProfile → тюнинг, melee/ranged контроллеры, выбор цели
//! - movement: AvoidanceSteering, интеграция скорости, facing
//! - navigation: ObstacleMap, probes (LOS, clearance), GridPathfinder
//! - combat: swept-arc удары, залпы и снаряды, урон и смерть
//!
//! Всё, что влияет на исход боя, идёт в FixedUpdate строго по порядку
//! `SimulationSet`: Intent → Decide → Move → Resolve.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod agent;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod movement;
pub mod navigation;
pub mod shared;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, IntentApplicator, IntentModifier, IntentProfile, MeleeEngagement, MeleeState,
    MeleeTuning, RangedEngagement, RangedTuning, TraitBuild, TraitCatalog,
};
pub use combat::{
    CombatPlugin, CombatStats, DamageDealt, Dead, EntityDied, HitLanded, MeleeWeapon,
    RangedWeapon, ShotFired, SwingStarted, SweptArcDetector,
};
pub use components::*;
pub use config::SimulationConfig;
pub use logger::*;
pub use movement::{AvoidanceSteering, MovementPlugin};
pub use navigation::{GridPathfinder, ObstacleMap, PathError};

/// Фазы fixed тика (выполняются цепочкой)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// IntentProfile → тюнинг контроллеров
    Intent,
    /// Цели, state machines, желаемая скорость, старт атак
    Decide,
    /// velocity → Transform
    Move,
    /// Sweep, снаряды, урон, смерть
    Resolve,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Конфиг берётся из `SimulationConfig`, если он вставлен ДО плагина.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();
        let tick_hz = if config.tick_hz > 0.0 { config.tick_hz } else { 60.0 };

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Intent,
                SimulationSet::Decide,
                SimulationSet::Move,
                SimulationSet::Resolve,
            )
                .chain(),
        )
        // Fixed timestep (60Hz по умолчанию)
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        // Детерминистичный RNG (trait roll, разброс очередей)
        .insert_resource(DeterministicRng::new(config.seed))
        .init_resource::<TraitCatalog>()
        .insert_resource(config)
        // Подсистемы
        .add_plugins((AIPlugin, MovementPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(config: SimulationConfig) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Поставить арену: ObstacleMap + GridPathfinder (бюджет из SimulationConfig)
pub fn install_arena(world: &mut World, map: ObstacleMap) {
    let budget = world
        .get_resource::<SimulationConfig>()
        .map(|config| config.path_budget)
        .unwrap_or(navigation::DEFAULT_MAX_SEARCH);

    logger::log_info(&format!(
        "Arena installed: {}x{} cells, {} blocked",
        map.width(),
        map.height(),
        map.blocked_count()
    ));

    world.insert_resource(GridPathfinder::with_budget(&map, budget));
    world.insert_resource(map);
}

/// Snapshot компонента `T` всех entity для сравнения детерминизма
///
/// Порядок: по Entity index, формат: Debug строка.
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }
    snapshot
}
