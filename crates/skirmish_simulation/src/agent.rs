//! Сборка агентов: оружие + контроллер + профиль
//!
//! Профиль резолвится один раз при спавне (weapon suggested range + билд),
//! дальше его применяет IntentApplicator.

use bevy::prelude::*;

use crate::ai::{IntentApplicator, MeleeEngagement, MeleeTuning, RangedEngagement, RangedTuning, TraitBuild};
use crate::combat::{suggested_range, MeleeWeapon, RangedWeapon, SweptArcDetector};
use crate::components::Actor;
use crate::logger;

/// Melee агент в точке `position`
pub fn melee_agent(
    faction_id: u64,
    position: Vec2,
    weapon: MeleeWeapon,
    build: TraitBuild,
    apply_interval: f32,
) -> impl Bundle {
    let profile = build.resolve(suggested_range(Some(&weapon), None));
    logger::log_lazy(|| format!(
        "melee agent [{}] with {}: desired range {:.2}, aggression {:.2}",
        build.describe(),
        weapon.name,
        profile.desired_range,
        profile.aggression
    ));

    let tuning = MeleeTuning {
        attack_cooldown: weapon.swing_duration + weapon.cooldown,
        ..Default::default()
    };

    (
        Actor::new(faction_id),
        Transform::from_xyz(position.x, position.y, 0.0),
        SweptArcDetector::from_weapon(&weapon),
        MeleeEngagement::new(tuning),
        IntentApplicator::new(apply_interval),
        profile,
        build,
        weapon,
    )
}

/// Ranged агент в точке `position`
pub fn ranged_agent(
    faction_id: u64,
    position: Vec2,
    weapon: RangedWeapon,
    build: TraitBuild,
    apply_interval: f32,
) -> impl Bundle {
    let profile = build.resolve(suggested_range(None, Some(&weapon)));
    logger::log_lazy(|| format!(
        "ranged agent [{}] with {}: desired range {:.2}, slack {:.2}",
        build.describe(),
        weapon.name,
        profile.desired_range,
        profile.range_slack
    ));

    let tuning = RangedTuning {
        desired_range: weapon.desired_range,
        shoot_cooldown: weapon.cooldown,
        ..Default::default()
    };

    (
        Actor::new(faction_id),
        Transform::from_xyz(position.x, position.y, 0.0),
        RangedEngagement::new(tuning),
        IntentApplicator::new(apply_interval),
        profile,
        build,
        weapon,
    )
}

/// Манекен: живая цель без AI
pub fn training_dummy(faction_id: u64, position: Vec2, max_health: f32) -> impl Bundle {
    (
        Actor::new(faction_id),
        Transform::from_xyz(position.x, position.y, 0.0),
        crate::components::Health::new(max_health),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Body, Health};
    use crate::combat::{BurstQueue, CombatStats};
    use crate::movement::AvoidanceSteering;

    #[test]
    fn test_melee_agent_has_required_parts() {
        let mut world = World::new();
        let entity = world
            .spawn(melee_agent(
                1,
                Vec2::new(2.0, 3.0),
                MeleeWeapon::sword(),
                TraitBuild::default(),
                0.25,
            ))
            .id();

        let entity = world.entity(entity);
        assert!(entity.contains::<Health>());
        assert!(entity.contains::<Body>());
        assert!(entity.contains::<CombatStats>());
        assert!(entity.contains::<AvoidanceSteering>());
        assert!(entity.contains::<SweptArcDetector>());
        assert_eq!(entity.get::<Transform>().unwrap().translation, Vec3::new(2.0, 3.0, 0.0));

        let profile = entity.get::<crate::ai::IntentProfile>().unwrap();
        assert!((profile.desired_range - MeleeWeapon::sword().suggested_range()).abs() < 1e-6);
    }

    #[test]
    fn test_ranged_agent_uses_weapon_range() {
        let mut world = World::new();
        let entity = world
            .spawn(ranged_agent(
                2,
                Vec2::ZERO,
                RangedWeapon::javelin_thrower(),
                TraitBuild::default(),
                0.25,
            ))
            .id();

        let entity = world.entity(entity);
        assert!(entity.contains::<BurstQueue>());
        assert_eq!(entity.get::<RangedEngagement>().unwrap().tuning.desired_range, 8.0);
        assert_eq!(entity.get::<crate::ai::IntentProfile>().unwrap().desired_range, 8.0);
    }
}
