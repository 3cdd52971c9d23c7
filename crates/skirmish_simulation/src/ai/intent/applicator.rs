//! IntentApplicator: профиль → конкретные параметры контроллеров
//!
//! Раз в `interval` секунд (не каждый тик) пересчитывает тюнинг melee/ranged
//! контроллеров из профиля и baseline. Baseline снимается ОДИН раз при первом
//! применении (уже после внешнего скейлинга сложности), поэтому повторное
//! применение того же профиля ничего не меняет.

use bevy::prelude::*;

use super::profile::IntentProfile;
use crate::ai::melee::MeleeTuning;
use crate::ai::ranged::RangedTuning;

/// Дефолтный интервал пересчёта (сек)
pub const DEFAULT_APPLY_INTERVAL: f32 = 0.25;

/// Нижняя граница множителя темпа в делителе cooldown
const CADENCE_DIVISOR_MIN: f32 = 0.6;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct IntentApplicator {
    pub interval: f32,
    timer: f32,
    melee_baseline: Option<MeleeTuning>,
    ranged_baseline: Option<RangedTuning>,
}

impl Default for IntentApplicator {
    fn default() -> Self {
        Self::new(DEFAULT_APPLY_INTERVAL)
    }
}

impl IntentApplicator {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            timer: 0.0,
            melee_baseline: None,
            ranged_baseline: None,
        }
    }

    pub fn melee_baseline(&self) -> Option<&MeleeTuning> {
        self.melee_baseline.as_ref()
    }

    pub fn ranged_baseline(&self) -> Option<&RangedTuning> {
        self.ranged_baseline.as_ref()
    }

    /// Пора ли применять. Первый вызов: сразу.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = self.interval;
            true
        } else {
            false
        }
    }

    pub fn apply_melee(&mut self, profile: &IntentProfile, tuning: &mut MeleeTuning) {
        let baseline = *self.melee_baseline.get_or_insert(*tuning);
        *tuning = melee_tuning_for(profile, &baseline);
    }

    pub fn apply_ranged(&mut self, profile: &IntentProfile, tuning: &mut RangedTuning) {
        let baseline = *self.ranged_baseline.get_or_insert(*tuning);
        *tuning = ranged_tuning_for(profile, &baseline);
    }
}

fn scaled_cooldown(base: f32, cadence: f32) -> f32 {
    (base / cadence.max(CADENCE_DIVISOR_MIN)).clamp(0.08, 10.0)
}

fn scaled_speed(base: f32, aggression: f32) -> f32 {
    (base * lerp(0.95, 1.10, aggression)).clamp(0.5, 20.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Melee параметры из профиля
pub fn melee_tuning_for(profile: &IntentProfile, baseline: &MeleeTuning) -> MeleeTuning {
    MeleeTuning {
        move_speed: scaled_speed(baseline.move_speed, profile.aggression),
        stop_distance: (profile.desired_range * 0.7).clamp(0.5, 3.0),
        attack_range: profile.desired_range.clamp(0.8, 3.5),
        approach_buffer: lerp(baseline.approach_buffer + 0.1, 0.06, profile.aggression)
            .clamp(0.02, 0.4),
        attack_cooldown: scaled_cooldown(baseline.attack_cooldown, profile.attack_cadence_mult),
        attack_windup: if profile.early_commit {
            (baseline.attack_windup * 0.7).clamp(0.05, 0.5)
        } else {
            baseline.attack_windup
        },
        reduced_speed_factor: baseline.reduced_speed_factor,
    }
}

/// Ranged параметры из профиля
pub fn ranged_tuning_for(profile: &IntentProfile, baseline: &RangedTuning) -> RangedTuning {
    let (slack_min, slack_max) = baseline.slack_limits;
    RangedTuning {
        move_speed: scaled_speed(baseline.move_speed, profile.aggression),
        desired_range: profile.desired_range,
        range_slack: profile.range_slack.clamp(slack_min, slack_max.max(slack_min)),
        shoot_cooldown: scaled_cooldown(baseline.shoot_cooldown, profile.attack_cadence_mult),
        los_check_radius: lerp(
            baseline.los_check_radius,
            baseline.los_check_radius + 0.2,
            profile.los_strictness,
        )
        .clamp(0.0, 1.0),
        ..*baseline
    }
}
