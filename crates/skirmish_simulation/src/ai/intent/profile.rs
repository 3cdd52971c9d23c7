//! IntentProfile: "характер" агента в цифрах
//!
//! Профиль собирается ОДИН раз при спавне:
//! baseline (от оружия) → archetype (опционально) → traits (в порядке вызывающего).
//! После каждого шага все поля заново зажимаются в свои диапазоны.
//! Порядок важен только у полей, упёршихся в границу клампа.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Границы полей профиля
pub mod bounds {
    pub const DESIRED_RANGE_MIN: f32 = 0.5;
    pub const DESIRED_RANGE_MAX: f32 = 64.0;
    pub const RANGE_SLACK_MIN: f32 = 0.7;
    pub const RANGE_SLACK_MAX: f32 = 0.98;
    pub const CADENCE_MIN: f32 = 0.5;
    pub const CADENCE_MAX: f32 = 1.8;
    pub const FLANK_ANGLE_MAX: f32 = 90.0;
    pub const REPOSITION_COOLDOWN_MIN: f32 = 0.1;
}

/// Итоговые параметры поведения агента (immutable после сборки)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct IntentProfile {
    /// Желаемая дистанция боя (абсолютная), [0.5, 64]
    pub desired_range: f32,
    /// Допуск дистанции (slack donut band), [0.7, 0.98]
    pub range_slack: f32,
    /// [0, 1]
    pub aggression: f32,
    /// Доля HP при которой отступаем, [0, 1]
    pub retreat_at_hp: f32,
    /// Множитель темпа атак, [0.5, 1.8]
    pub attack_cadence_mult: f32,
    /// [0, 1]
    pub strafe_bias: f32,
    /// Предпочитаемый угол захода во фланг (градусы), [0, 90]
    pub flank_angle_pref: f32,
    /// ≥ 0.1 сек
    pub reposition_cooldown: f32,
    /// [0, 1]
    pub los_strictness: f32,
    /// ≥ 0 сек
    pub burst_window: f32,
    /// [0, 1]
    pub pack_stickiness: f32,
    /// [0, 1]
    pub kite_bias: f32,

    pub prefer_cover: bool,
    pub early_commit: bool,
    pub late_punish: bool,
}

impl Default for IntentProfile {
    fn default() -> Self {
        Self::baseline(2.0)
    }
}

/// Дельты архетипа/трейта (не абсолюты)
///
/// Числа складываются с профилем, кроме `attack_cadence_mult` (умножается, нейтраль 1.0).
/// Флаги объединяются через OR и никогда не снимаются.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct IntentModifier {
    pub name: String,
    pub desired_range_delta: f32,
    pub range_slack_delta: f32,
    pub aggression_delta: f32,
    pub retreat_at_hp_delta: f32,
    pub attack_cadence_mult: f32,
    pub strafe_bias_add: f32,
    pub flank_angle_pref_add: f32,
    pub reposition_cooldown_delta: f32,
    pub los_strictness_delta: f32,
    pub burst_window_add: f32,
    pub pack_stickiness_add: f32,
    pub kite_bias_add: f32,

    pub prefer_cover: bool,
    pub early_commit: bool,
    pub late_punish: bool,
}

impl Default for IntentModifier {
    fn default() -> Self {
        Self {
            name: String::new(),
            desired_range_delta: 0.0,
            range_slack_delta: 0.0,
            aggression_delta: 0.0,
            retreat_at_hp_delta: 0.0,
            attack_cadence_mult: 1.0,
            strafe_bias_add: 0.0,
            flank_angle_pref_add: 0.0,
            reposition_cooldown_delta: 0.0,
            los_strictness_delta: 0.0,
            burst_window_add: 0.0,
            pack_stickiness_add: 0.0,
            kite_bias_add: 0.0,
            prefer_cover: false,
            early_commit: false,
            late_punish: false,
        }
    }
}

impl IntentModifier {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// NaN/inf дельта = "без изменений"
fn finite_or(value: f32, neutral: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        neutral
    }
}

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

impl IntentProfile {
    /// Дефолтный профиль, дистанция: от оружия
    pub fn baseline(weapon_suggested_range: f32) -> Self {
        let range = finite_or(weapon_suggested_range, bounds::DESIRED_RANGE_MIN);
        Self {
            desired_range: range,
            range_slack: 0.9,
            aggression: 0.5,
            retreat_at_hp: 0.25,
            attack_cadence_mult: 1.0,
            strafe_bias: 0.35,
            flank_angle_pref: 20.0,
            reposition_cooldown: 1.0,
            los_strictness: 0.3,
            burst_window: 0.0,
            pack_stickiness: 0.2,
            kite_bias: 0.0,
            prefer_cover: false,
            early_commit: false,
            late_punish: false,
        }
        .clamped()
    }

    /// Зажать все поля в их диапазоны
    pub fn clamped(self) -> Self {
        Self {
            desired_range: self
                .desired_range
                .clamp(bounds::DESIRED_RANGE_MIN, bounds::DESIRED_RANGE_MAX),
            range_slack: self
                .range_slack
                .clamp(bounds::RANGE_SLACK_MIN, bounds::RANGE_SLACK_MAX),
            aggression: clamp01(self.aggression),
            retreat_at_hp: clamp01(self.retreat_at_hp),
            attack_cadence_mult: self
                .attack_cadence_mult
                .clamp(bounds::CADENCE_MIN, bounds::CADENCE_MAX),
            strafe_bias: clamp01(self.strafe_bias),
            flank_angle_pref: self.flank_angle_pref.clamp(0.0, bounds::FLANK_ANGLE_MAX),
            reposition_cooldown: self.reposition_cooldown.max(bounds::REPOSITION_COOLDOWN_MIN),
            los_strictness: clamp01(self.los_strictness),
            burst_window: self.burst_window.max(0.0),
            pack_stickiness: clamp01(self.pack_stickiness),
            kite_bias: clamp01(self.kite_bias),
            ..self
        }
    }

    /// Применить модификатор (pure reducer)
    pub fn apply(self, modifier: &IntentModifier) -> Self {
        Self {
            desired_range: self.desired_range + finite_or(modifier.desired_range_delta, 0.0),
            range_slack: self.range_slack + finite_or(modifier.range_slack_delta, 0.0),
            aggression: self.aggression + finite_or(modifier.aggression_delta, 0.0),
            retreat_at_hp: self.retreat_at_hp + finite_or(modifier.retreat_at_hp_delta, 0.0),
            attack_cadence_mult: self.attack_cadence_mult
                * finite_or(modifier.attack_cadence_mult, 1.0),
            strafe_bias: self.strafe_bias + finite_or(modifier.strafe_bias_add, 0.0),
            flank_angle_pref: self.flank_angle_pref + finite_or(modifier.flank_angle_pref_add, 0.0),
            reposition_cooldown: self.reposition_cooldown
                + finite_or(modifier.reposition_cooldown_delta, 0.0),
            los_strictness: self.los_strictness + finite_or(modifier.los_strictness_delta, 0.0),
            burst_window: self.burst_window + finite_or(modifier.burst_window_add, 0.0),
            pack_stickiness: self.pack_stickiness + finite_or(modifier.pack_stickiness_add, 0.0),
            kite_bias: self.kite_bias + finite_or(modifier.kite_bias_add, 0.0),
            prefer_cover: self.prefer_cover || modifier.prefer_cover,
            early_commit: self.early_commit || modifier.early_commit,
            late_punish: self.late_punish || modifier.late_punish,
        }
        .clamped()
    }

    /// baseline → archetype → traits
    pub fn resolve(
        weapon_suggested_range: f32,
        archetype: Option<&IntentModifier>,
        traits: &[IntentModifier],
    ) -> Self {
        let mut profile = Self::baseline(weapon_suggested_range);
        if let Some(archetype) = archetype {
            profile = profile.apply(archetype);
        }
        traits.iter().fold(profile, |profile, modifier| profile.apply(modifier))
    }
}
