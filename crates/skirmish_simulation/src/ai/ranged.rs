//! Ranged engagement: непрерывный контроллер "бублика"
//!
//! Каждый тик:
//! - нет LOS → шаг вбок, в сторону где больше clearance (выглянуть из-за укрытия)
//! - ближе inner → назад, дальше outer → вперёд, внутри бублика → стоим
//! - есть LOS и fire timer ≤ 0 → выстрел, таймер = max(min_cooldown, cooldown)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::intent::bounds;
use crate::combat::BurstQueue;
use crate::movement::AvoidanceSteering;
use crate::navigation::AgentSense;
use crate::shared::{left_of, right_of};

/// Полоса удержания дистанции: [desired·slack, desired/slack]
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct DonutBand {
    pub desired: f32,
    pub slack: f32,
}

impl DonutBand {
    /// Slack зажимается в дефолтные границы профиля
    pub fn new(desired: f32, slack: f32) -> Self {
        Self::with_limits(desired, slack, (bounds::RANGE_SLACK_MIN, bounds::RANGE_SLACK_MAX))
    }

    /// Slack зажимается в `limits` (обе границы строго внутри (0, 1))
    pub fn with_limits(desired: f32, slack: f32, limits: (f32, f32)) -> Self {
        let lo = if limits.0.is_finite() {
            limits.0.clamp(0.01, 0.99)
        } else {
            bounds::RANGE_SLACK_MIN
        };
        let hi = if limits.1.is_finite() {
            limits.1.clamp(lo, 0.99)
        } else {
            bounds::RANGE_SLACK_MAX.max(lo)
        };
        let slack = if slack.is_finite() { slack.clamp(lo, hi) } else { hi };
        Self {
            desired: desired.max(0.01),
            slack,
        }
    }

    pub fn inner(&self) -> f32 {
        self.desired * self.slack
    }

    pub fn outer(&self) -> f32 {
        self.desired / self.slack
    }

    /// inner ≤ distance ≤ outer
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.inner() && distance <= self.outer()
    }
}

/// Тюнинг ranged контроллера
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct RangedTuning {
    pub move_speed: f32,
    pub desired_range: f32,
    pub range_slack: f32,
    /// Допустимый диапазон slack
    pub slack_limits: (f32, f32),
    pub shoot_cooldown: f32,
    /// Минимальный cooldown (никогда не ноль)
    pub min_cooldown: f32,
    /// Радиус circle cast для LOS
    pub los_check_radius: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            move_speed: 4.5,
            desired_range: 6.5,
            range_slack: 0.9,
            slack_limits: (bounds::RANGE_SLACK_MIN, bounds::RANGE_SLACK_MAX),
            shoot_cooldown: 0.8,
            min_cooldown: 0.02,
            los_check_radius: 0.2,
        }
    }
}

impl RangedTuning {
    pub fn band(&self) -> DonutBand {
        DonutBand::with_limits(self.desired_range, self.range_slack, self.slack_limits)
    }
}

/// Почему выбрано движение (для тестов/debug)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum RangedMove {
    #[default]
    Hold,
    Approach,
    Retreat,
    Sidestep,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangedCommand {
    pub direction: Vec2,
    pub speed: f32,
    pub intent: RangedMove,
    /// Направление выстрела, если стреляем в этот тик
    pub fire: Option<Vec2>,
}

impl RangedCommand {
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    pub fn is_moving(&self) -> bool {
        self.speed > 0.0 && self.direction != Vec2::ZERO
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(BurstQueue, AvoidanceSteering)]
pub struct RangedEngagement {
    pub tuning: RangedTuning,
    shoot_timer: f32,
    enabled: bool,
}

impl Default for RangedEngagement {
    fn default() -> Self {
        Self::new(RangedTuning::default())
    }
}

impl RangedEngagement {
    pub fn new(tuning: RangedTuning) -> Self {
        Self {
            tuning,
            shoot_timer: 0.0,
            enabled: true,
        }
    }

    pub fn shoot_timer(&self) -> f32 {
        self.shoot_timer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Один fixed тик. `sense`: LOS/clearance относительно позиции агента.
    pub fn tick(
        &mut self,
        to_target: Option<Vec2>,
        target_position: Vec2,
        sense: &impl AgentSense,
        dt: f32,
    ) -> RangedCommand {
        let mut command = RangedCommand::default();
        if !self.enabled {
            return command;
        }

        if self.shoot_timer > 0.0 {
            self.shoot_timer -= dt;
        }

        let Some(to_target) = to_target else {
            return command;
        };

        let aim = to_target.try_normalize().unwrap_or(Vec2::Y);
        let distance = to_target.length();
        let band = self.tuning.band();
        let has_los = sense.has_line_of_sight(target_position);

        if !has_los {
            let left = left_of(aim);
            let right = right_of(aim);
            command.direction = if sense.clearance01(left) > sense.clearance01(right) {
                left
            } else {
                right
            };
            command.speed = self.tuning.move_speed;
            command.intent = RangedMove::Sidestep;
        } else if distance < band.inner() {
            command.direction = -aim;
            command.speed = self.tuning.move_speed;
            command.intent = RangedMove::Retreat;
        } else if distance > band.outer() {
            command.direction = aim;
            command.speed = self.tuning.move_speed;
            command.intent = RangedMove::Approach;
        }

        if has_los && self.shoot_timer <= 0.0 {
            command.fire = Some(aim);
            self.shoot_timer = self.tuning.min_cooldown.max(self.tuning.shoot_cooldown);
        }

        command
    }
}
