//! Headless симуляция арены
//!
//! Огороженная арена со стенкой посередине: melee и ranged агенты против манекена.
//! 600 тиков (10 секунд на 60Hz), в лог: попадания и смерти.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use skirmish_simulation::agent::{melee_agent, ranged_agent, training_dummy};
use skirmish_simulation::ai::roll_build;
use skirmish_simulation::{
    create_headless_app, install_arena, log_error, log_info, set_log_level, CombatStats,
    DamageDealt, DeterministicRng, EntityDied, Health, LogLevel, MeleeWeapon, RangedWeapon,
    SimulationConfig, TraitCatalog,
};

const ARENA: &str = "\
####################
#..................#
#..................#
#........#.........#
#........#.........#
#........#.........#
#..................#
#..................#
#..................#
####################";

const TICKS: u32 = 600;

fn main() {
    let config = SimulationConfig::with_seed(42);
    let tick = Duration::from_secs_f32(config.tick_seconds());
    let apply_interval = config.intent_apply_interval;
    let arena = config.arena_from_ascii(ARENA);

    let mut app = create_headless_app(config);
    // Ручной шаг времени: ровно один fixed тик за update
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick));
    set_log_level(LogLevel::Info);

    let map = match arena {
        Ok(map) => map,
        Err(err) => {
            log_error(&format!("Bad arena layout: {}", err));
            return;
        }
    };
    install_arena(app.world_mut(), map);

    // Билды: из того же seeded RNG, что и симуляция
    let world = app.world_mut();
    let (melee_build, ranged_build) = world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
        let catalog = world.resource::<TraitCatalog>();
        (
            roll_build(&mut rng.rng, catalog, 1..=2),
            roll_build(&mut rng.rng, catalog, 1..=2),
        )
    });

    let dummy = world
        .spawn(training_dummy(2, Vec2::new(14.5, 4.5), 120.0))
        .id();
    let melee = world
        .spawn(melee_agent(1, Vec2::new(3.5, 2.5), MeleeWeapon::sword(), melee_build, apply_interval))
        .id();
    let ranged = world
        .spawn(ranged_agent(1, Vec2::new(3.5, 7.5), RangedWeapon::repeater(), ranged_build, apply_interval))
        .id();

    log_info(&format!("Starting skirmish (seed: 42, {} ticks)", TICKS));

    let mut damage_cursor = app.world().resource::<Events<DamageDealt>>().get_cursor();
    let mut death_cursor = app.world().resource::<Events<EntityDied>>().get_cursor();

    for tick in 0..TICKS {
        app.update();

        let world = app.world();
        for dealt in damage_cursor.read(world.resource::<Events<DamageDealt>>()) {
            log_info(&format!(
                "Tick {}: {:?} hit {:?} for {:.1}",
                tick, dealt.attacker, dealt.target, dealt.damage
            ));
        }
        for died in death_cursor.read(world.resource::<Events<EntityDied>>()) {
            log_info(&format!("Tick {}: {:?} died", tick, died.entity));
        }
    }

    let world = app.world();
    let health = world.get::<Health>(dummy).map(|h| h.current).unwrap_or(0.0);
    log_info(&format!("Dummy health after {} ticks: {:.1}", TICKS, health));
    for (name, entity) in [("melee", melee), ("ranged", ranged)] {
        if let Some(stats) = world.get::<CombatStats>(entity) {
            log_info(&format!(
                "{}: {} attempts, {} hits ({:.0}%)",
                name,
                stats.attacks_attempted,
                stats.hits_landed,
                stats.hit_rate() * 100.0
            ));
        }
    }
    log_info("Simulation complete!");
}
