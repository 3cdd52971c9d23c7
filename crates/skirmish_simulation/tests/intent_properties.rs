//! Property-based тесты: клампы IntentProfile, donut band, tuning от профиля

use proptest::prelude::*;
use skirmish_simulation::ai::{
    bounds, melee_tuning_for, ranged_tuning_for, DonutBand, IntentModifier, IntentProfile,
    MeleeTuning, RangedTuning,
};

fn modifier() -> impl Strategy<Value = IntentModifier> {
    (
        (-80.0f32..80.0, -2.0f32..2.0, -3.0f32..3.0, -3.0f32..3.0),
        (0.0f32..5.0, -3.0f32..3.0, -200.0f32..200.0, -5.0f32..5.0),
        (-3.0f32..3.0, -5.0f32..5.0, -3.0f32..3.0, -3.0f32..3.0),
        any::<(bool, bool, bool)>(),
    )
        .prop_map(|(a, b, c, flags)| IntentModifier {
            name: "random".to_string(),
            desired_range_delta: a.0,
            range_slack_delta: a.1,
            aggression_delta: a.2,
            retreat_at_hp_delta: a.3,
            attack_cadence_mult: b.0,
            strafe_bias_add: b.1,
            flank_angle_pref_add: b.2,
            reposition_cooldown_delta: b.3,
            los_strictness_delta: c.0,
            burst_window_add: c.1,
            pack_stickiness_add: c.2,
            kite_bias_add: c.3,
            prefer_cover: flags.0,
            early_commit: flags.1,
            late_punish: flags.2,
        })
}

fn assert_in_bounds(profile: &IntentProfile) {
    assert!(profile.desired_range >= bounds::DESIRED_RANGE_MIN);
    assert!(profile.desired_range <= bounds::DESIRED_RANGE_MAX);
    assert!(profile.range_slack >= bounds::RANGE_SLACK_MIN);
    assert!(profile.range_slack <= bounds::RANGE_SLACK_MAX);
    assert!(profile.attack_cadence_mult >= bounds::CADENCE_MIN);
    assert!(profile.attack_cadence_mult <= bounds::CADENCE_MAX);
    assert!(profile.flank_angle_pref >= 0.0 && profile.flank_angle_pref <= bounds::FLANK_ANGLE_MAX);
    assert!(profile.reposition_cooldown >= bounds::REPOSITION_COOLDOWN_MIN);
    assert!(profile.burst_window >= 0.0);
    for unit in [
        profile.aggression,
        profile.retreat_at_hp,
        profile.strafe_bias,
        profile.los_strictness,
        profile.pack_stickiness,
        profile.kite_bias,
    ] {
        assert!((0.0..=1.0).contains(&unit), "unit field out of range: {}", unit);
    }
}

proptest! {
    #[test]
    fn prop_resolved_profile_is_always_clamped(
        range in -10.0f32..200.0,
        archetype in proptest::option::of(modifier()),
        traits in proptest::collection::vec(modifier(), 0..5),
    ) {
        let profile = IntentProfile::resolve(range, archetype.as_ref(), &traits);
        assert_in_bounds(&profile);
    }

    #[test]
    fn prop_flags_are_never_cleared(traits in proptest::collection::vec(modifier(), 1..5)) {
        let profile = IntentProfile::resolve(3.0, None, &traits);
        prop_assert_eq!(profile.early_commit, traits.iter().any(|t| t.early_commit));
        prop_assert_eq!(profile.prefer_cover, traits.iter().any(|t| t.prefer_cover));
        prop_assert_eq!(profile.late_punish, traits.iter().any(|t| t.late_punish));
    }

    #[test]
    fn prop_donut_band_is_ordered(desired in 0.5f32..64.0, slack in -1.0f32..2.0) {
        let band = DonutBand::new(desired, slack);
        prop_assert!(band.inner() <= band.desired + 1e-4);
        prop_assert!(band.desired <= band.outer() + 1e-4);
        prop_assert!(band.contains(band.desired));
        prop_assert!(!band.contains(band.inner() * 0.5));
        prop_assert!(!band.contains(band.outer() * 1.5 + 0.01));
    }

    #[test]
    fn prop_melee_tuning_stays_in_limits(traits in proptest::collection::vec(modifier(), 0..4)) {
        let profile = IntentProfile::resolve(1.7, None, &traits);
        let tuning = melee_tuning_for(&profile, &MeleeTuning::default());
        prop_assert!(tuning.stop_distance >= 0.5 && tuning.stop_distance <= 3.0);
        prop_assert!(tuning.attack_range >= 0.8 && tuning.attack_range <= 3.5);
        prop_assert!(tuning.approach_buffer >= 0.02 && tuning.approach_buffer <= 0.4);
        prop_assert!(tuning.attack_cooldown >= 0.08 && tuning.attack_cooldown <= 10.0);
        prop_assert!(tuning.move_speed >= 0.5 && tuning.move_speed <= 20.0);
    }

    #[test]
    fn prop_ranged_tuning_keeps_slack_in_limits(traits in proptest::collection::vec(modifier(), 0..4)) {
        let profile = IntentProfile::resolve(6.5, None, &traits);
        let baseline = RangedTuning::default();
        let tuning = ranged_tuning_for(&profile, &baseline);
        prop_assert!(tuning.range_slack >= baseline.slack_limits.0);
        prop_assert!(tuning.range_slack <= baseline.slack_limits.1);
        prop_assert!(tuning.los_check_radius >= 0.0 && tuning.los_check_radius <= 1.0);
        prop_assert!(tuning.shoot_cooldown >= tuning.min_cooldown);
    }
}
