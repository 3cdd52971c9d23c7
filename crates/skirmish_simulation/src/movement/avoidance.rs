//! Local obstacle avoidance (fan sampling + scoring + smoothing + unstuck)
//!
//! Каждый тик:
//! 1. Веер из `fan_rays` лучей вокруг желаемого направления, у каждого clearance [0, 1]
//! 2. score = clearance + keep_course·dot(dir, desired) + target_bias·dot(dir, to_target)
//! 3. Всё заблокировано → скольжение по касательной к ближайшей стене
//! 4. Экспоненциальное сглаживание с прошлым выбором (анти-дребезг)
//! 5. Stuck detector: стоим на месте дольше `stuck_time` → перпендикуляр почище
//!
//! Только статические препятствия: агенты друг друга не объезжают.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::navigation::ObstacleProbe;
use crate::shared::{direction_or_none, left_of, right_of, rotate_deg, DEGENERATE_EPSILON_SQ};

/// Параметры steering (тюнинг, не инварианты)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct AvoidanceConfig {
    /// Радиус агента для circle cast (чуть больше коллайдера)
    pub agent_radius: f32,
    /// Как далеко "нюхаем" вперёд
    pub probe_distance: f32,
    /// Количество лучей веера (центр + симметричные пары)
    pub fan_rays: u32,
    /// Полный угол веера (градусы)
    pub fan_angle_deg: f32,
    /// Вес удержания курса
    pub keep_course_weight: f32,
    /// Вес направления на цель
    pub target_weight: f32,
    /// Доля прошлого направления в сглаживании [0, 1]
    pub smoothing: f32,
    /// Clearance ниже/равно этому = луч заблокирован
    pub hard_block_clearance: f32,
    /// Поворот при полном блоке без контакта (градусы)
    pub fallback_turn_deg: f32,
    /// Скорость ниже которой считаем что стоим
    pub stuck_speed_threshold: f32,
    /// Сколько секунд стоять до принудительного манёвра
    pub stuck_time: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            agent_radius: 0.42,
            probe_distance: 1.4,
            fan_rays: 9,
            fan_angle_deg: 90.0,
            keep_course_weight: 0.35,
            target_weight: 0.40,
            smoothing: 0.20,
            hard_block_clearance: 0.10,
            fallback_turn_deg: 90.0,
            stuck_speed_threshold: 0.05,
            stuck_time: 0.35,
        }
    }
}

/// Позиция и реальная скорость агента в момент запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerContext {
    pub position: Vec2,
    /// Скорость, реально достигнутая на прошлом тике (для stuck detector)
    pub current_speed: f32,
}

/// Почему выбрано итоговое направление (для debug overlay / тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SteerOutcome {
    /// Нет запроса на движение
    Idle,
    /// Лучший луч веера
    Fan,
    /// Скольжение вдоль стены
    WallSlide,
    /// Всё заблокировано, контакта нет: поворот на fallback угол
    FallbackTurn,
    /// Сработал stuck detector
    Unstuck,
}

/// Steering компонент: конфиг + состояние между тиками
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AvoidanceSteering {
    pub config: AvoidanceConfig,
    last_direction: Vec2,
    stuck_timer: f32,
    last_outcome: SteerOutcome,
}

impl Default for AvoidanceSteering {
    fn default() -> Self {
        Self::new(AvoidanceConfig::default())
    }
}

impl AvoidanceSteering {
    pub fn new(config: AvoidanceConfig) -> Self {
        Self {
            config,
            last_direction: Vec2::ZERO,
            stuck_timer: 0.0,
            last_outcome: SteerOutcome::Idle,
        }
    }

    pub fn last_direction(&self) -> Vec2 {
        self.last_direction
    }

    pub fn stuck_timer(&self) -> f32 {
        self.stuck_timer
    }

    pub fn last_outcome(&self) -> SteerOutcome {
        self.last_outcome
    }

    /// Забыть историю (после телепорта, респавна)
    pub fn reset(&mut self) {
        self.last_direction = Vec2::ZERO;
        self.stuck_timer = 0.0;
        self.last_outcome = SteerOutcome::Idle;
    }

    fn clearance(&self, probe: &impl ObstacleProbe, origin: Vec2, direction: Vec2) -> f32 {
        probe.clearance01(origin, self.config.agent_radius, direction, self.config.probe_distance)
    }

    /// Выбрать скорость с объездом препятствий.
    ///
    /// Возвращает `direction * desired_speed`; ноль если скорость ≤ 0
    /// или направление вырождено.
    pub fn steer(
        &mut self,
        probe: &impl ObstacleProbe,
        ctx: SteerContext,
        desired_direction: Vec2,
        desired_speed: f32,
        target_position: Vec2,
        dt: f32,
    ) -> Vec2 {
        let Some(desired) = direction_or_none(desired_direction) else {
            self.last_outcome = SteerOutcome::Idle;
            return Vec2::ZERO;
        };
        if !(desired_speed > 0.0) {
            self.last_outcome = SteerOutcome::Idle;
            return Vec2::ZERO;
        }

        let config = self.config;
        let target_dir = direction_or_none(target_position - ctx.position).unwrap_or(desired);

        // 1-2) Веер
        let rays = config.fan_rays.max(1);
        let half = config.fan_angle_deg * 0.5;
        let mut best = desired;
        let mut best_score = f32::NEG_INFINITY;
        let mut any_free = false;

        for i in 0..rays {
            let t = if rays == 1 {
                0.5
            } else {
                i as f32 / (rays - 1) as f32
            };
            let candidate = rotate_deg(desired, -half + (2.0 * half) * t);

            let clear = self.clearance(probe, ctx.position, candidate);
            if clear > config.hard_block_clearance {
                any_free = true;
            }

            let score = clear
                + config.keep_course_weight * candidate.dot(desired)
                + config.target_weight * candidate.dot(target_dir);

            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }

        let mut outcome = SteerOutcome::Fan;

        // 3) Всё заблокировано: скользим вдоль ближайшей стены
        if !any_free {
            match probe.circle_cast(ctx.position, config.agent_radius, desired, config.probe_distance) {
                Some(hit) => {
                    let tangent_a = left_of(hit.normal);
                    let tangent_b = right_of(hit.normal);
                    best = if tangent_a.dot(desired) > tangent_b.dot(desired) {
                        tangent_a
                    } else {
                        tangent_b
                    };
                    outcome = SteerOutcome::WallSlide;
                }
                None => {
                    best = rotate_deg(desired, config.fallback_turn_deg);
                    outcome = SteerOutcome::FallbackTurn;
                }
            }
        }

        // 4) Сглаживание с прошлым выбором
        if self.last_direction.length_squared() > DEGENERATE_EPSILON_SQ {
            let blended = self.last_direction.lerp(best, 1.0 - config.smoothing.clamp(0.0, 1.0));
            best = blended.try_normalize().unwrap_or(best);
        }
        self.last_direction = best;

        // 5) Unstuck: пытаемся идти (desired_speed > 0 проверен выше), но не двигаемся
        if ctx.current_speed < config.stuck_speed_threshold {
            self.stuck_timer += dt;
        } else {
            self.stuck_timer = 0.0;
        }

        if self.stuck_timer > config.stuck_time {
            let left = left_of(best);
            let right = right_of(best);
            best = if self.clearance(probe, ctx.position, left) > self.clearance(probe, ctx.position, right) {
                left
            } else {
                right
            };
            self.stuck_timer = 0.0;
            outcome = SteerOutcome::Unstuck;
        }

        self.last_outcome = outcome;
        best * desired_speed
    }
}
