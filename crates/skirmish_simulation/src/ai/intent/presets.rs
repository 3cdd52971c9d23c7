//! Каталог архетипов и трейтов + случайная сборка билда
//!
//! Архетип: один на агента (опционально), трейты: 0..N без повторов.
//! Случайность только через детерминированный RNG вызывающего.

use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::profile::{IntentModifier, IntentProfile};

/// Набор записей, из которых собираются билды
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TraitCatalog {
    pub archetypes: Vec<IntentModifier>,
    pub traits: Vec<IntentModifier>,
}

/// Выбранный архетип + трейты (индексы не храним: записи immutable и дешёвые)
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitBuild {
    pub archetype: Option<IntentModifier>,
    pub traits: Vec<IntentModifier>,
}

impl TraitBuild {
    pub fn resolve(&self, weapon_suggested_range: f32) -> IntentProfile {
        IntentProfile::resolve(weapon_suggested_range, self.archetype.as_ref(), &self.traits)
    }

    /// "Berserker + Charger + Flanker" (для логов)
    pub fn describe(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(archetype) = &self.archetype {
            parts.push(&archetype.name);
        }
        parts.extend(self.traits.iter().map(|t| t.name.as_str()));
        if parts.is_empty() {
            "baseline".to_string()
        } else {
            parts.join(" + ")
        }
    }
}

/// Случайный билд: один архетип и `trait_count` РАЗНЫХ трейтов
///
/// Если трейтов в каталоге меньше: берём сколько есть.
pub fn roll_build(
    rng: &mut impl Rng,
    catalog: &TraitCatalog,
    trait_count: RangeInclusive<usize>,
) -> TraitBuild {
    let archetype = if catalog.archetypes.is_empty() {
        None
    } else {
        let pick = rng.gen_range(0..catalog.archetypes.len());
        Some(catalog.archetypes[pick].clone())
    };

    let (min, max) = (*trait_count.start(), *trait_count.end());
    let wanted = if min >= max { min } else { rng.gen_range(min..=max) };
    let amount = wanted.min(catalog.traits.len());

    let traits = index::sample(rng, catalog.traits.len(), amount)
        .into_iter()
        .map(|i| catalog.traits[i].clone())
        .collect();

    TraitBuild { archetype, traits }
}

impl Default for TraitCatalog {
    fn default() -> Self {
        Self {
            archetypes: vec![berserker(), skirmisher(), sniper(), guardian()],
            traits: vec![
                charger(),
                flanker(),
                kiter(),
                survivor(),
                opportunist(),
                pack_hunter(),
                sharpshooter(),
                trigger_happy(),
            ],
        }
    }
}

// === Архетипы ===

pub fn berserker() -> IntentModifier {
    IntentModifier {
        aggression_delta: 0.4,
        retreat_at_hp_delta: -0.2,
        attack_cadence_mult: 1.25,
        reposition_cooldown_delta: 0.3,
        early_commit: true,
        ..IntentModifier::named("Berserker")
    }
}

pub fn skirmisher() -> IntentModifier {
    IntentModifier {
        strafe_bias_add: 0.35,
        flank_angle_pref_add: 25.0,
        reposition_cooldown_delta: -0.4,
        late_punish: true,
        ..IntentModifier::named("Skirmisher")
    }
}

pub fn sniper() -> IntentModifier {
    IntentModifier {
        desired_range_delta: 2.0,
        range_slack_delta: 0.05,
        aggression_delta: -0.3,
        los_strictness_delta: 0.5,
        kite_bias_add: 0.4,
        ..IntentModifier::named("Sniper")
    }
}

pub fn guardian() -> IntentModifier {
    IntentModifier {
        aggression_delta: -0.2,
        retreat_at_hp_delta: 0.1,
        pack_stickiness_add: 0.5,
        attack_cadence_mult: 0.85,
        prefer_cover: true,
        ..IntentModifier::named("Guardian")
    }
}

// === Трейты (mix-ins) ===

pub fn charger() -> IntentModifier {
    IntentModifier {
        aggression_delta: 0.2,
        desired_range_delta: -0.3,
        early_commit: true,
        ..IntentModifier::named("Charger")
    }
}

pub fn flanker() -> IntentModifier {
    IntentModifier {
        flank_angle_pref_add: 35.0,
        strafe_bias_add: 0.2,
        ..IntentModifier::named("Flanker")
    }
}

pub fn kiter() -> IntentModifier {
    IntentModifier {
        kite_bias_add: 0.5,
        desired_range_delta: 1.0,
        ..IntentModifier::named("Kiter")
    }
}

pub fn survivor() -> IntentModifier {
    IntentModifier {
        retreat_at_hp_delta: 0.2,
        prefer_cover: true,
        ..IntentModifier::named("Survivor")
    }
}

pub fn opportunist() -> IntentModifier {
    IntentModifier {
        burst_window_add: 0.6,
        late_punish: true,
        ..IntentModifier::named("Opportunist")
    }
}

pub fn pack_hunter() -> IntentModifier {
    IntentModifier {
        pack_stickiness_add: 0.4,
        aggression_delta: 0.1,
        ..IntentModifier::named("PackHunter")
    }
}

pub fn sharpshooter() -> IntentModifier {
    IntentModifier {
        los_strictness_delta: 0.4,
        attack_cadence_mult: 0.9,
        ..IntentModifier::named("Sharpshooter")
    }
}

pub fn trigger_happy() -> IntentModifier {
    IntentModifier {
        attack_cadence_mult: 1.3,
        los_strictness_delta: -0.2,
        ..IntentModifier::named("TriggerHappy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = TraitCatalog::default();
        assert_eq!(catalog.archetypes.len(), 4);
        assert_eq!(catalog.traits.len(), 8);
    }

    #[test]
    fn test_roll_build_picks_distinct_traits() {
        let catalog = TraitCatalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..50 {
            let build = roll_build(&mut rng, &catalog, 0..=3);
            assert!(build.archetype.is_some());
            assert!(build.traits.len() <= 3);

            let mut names: Vec<_> = build.traits.iter().map(|t| t.name.clone()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), build.traits.len(), "повтор трейта: {}", build.describe());
        }
    }

    #[test]
    fn test_roll_build_is_deterministic_for_seed() {
        let catalog = TraitCatalog::default();
        let a = roll_build(&mut ChaCha8Rng::seed_from_u64(42), &catalog, 1..=3);
        let b = roll_build(&mut ChaCha8Rng::seed_from_u64(42), &catalog, 1..=3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_build_caps_at_catalog_size() {
        let catalog = TraitCatalog {
            archetypes: Vec::new(),
            traits: vec![charger()],
        };
        let build = roll_build(&mut ChaCha8Rng::seed_from_u64(1), &catalog, 3..=3);
        assert!(build.archetype.is_none());
        assert_eq!(build.traits.len(), 1);
    }

    #[test]
    fn test_berserker_build_commits_early() {
        let build = TraitBuild {
            archetype: Some(berserker()),
            traits: vec![charger()],
        };
        let profile = build.resolve(2.0);

        assert!(profile.early_commit);
        assert!((profile.aggression - 1.0).abs() < 1e-5);
        assert_eq!(build.describe(), "Berserker + Charger");
    }
}
