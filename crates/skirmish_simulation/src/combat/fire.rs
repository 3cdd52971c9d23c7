//! Fire patterns: нажатие на спуск → набор выстрелов (сразу и отложенных)
//!
//! Очереди (RapidSmall, BurstN) стреляют с задержкой через `BurstQueue`,
//! отменяемые отложенные действия агента. Пока очередь не закончилась,
//! новая не начинается.

use bevy::prelude::*;
use rand::Rng;

use super::weapon::{FirePattern, RangedWeapon};
use crate::ai::scheduler::DeferredActions;
use crate::shared::rotate_deg;

/// Выстрелов в RapidSmall
pub const RAPID_SMALL_SHOTS: u32 = 4;
/// Минимум выстрелов в BurstN
pub const BURST_MIN_SHOTS: u32 = 2;

/// Один выстрел залпа
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolleyShot {
    /// Задержка от нажатия (сек), 0 = сразу
    pub delay: f32,
    /// Unit direction
    pub direction: Vec2,
}

/// Разложить нажатие на выстрелы согласно паттерну
///
/// Разброс очереди: равномерный в ±spread_deg (детерминированно через rng).
pub fn plan_volley(weapon: &RangedWeapon, aim: Vec2, rng: &mut impl Rng) -> Vec<VolleyShot> {
    let aim = aim.try_normalize().unwrap_or(Vec2::Y);

    match weapon.pattern {
        FirePattern::Single => vec![VolleyShot {
            delay: 0.0,
            direction: aim,
        }],
        FirePattern::TripleSpread => {
            let half = weapon.spread_deg * 0.5;
            [-half, 0.0, half]
                .into_iter()
                .map(|angle| VolleyShot {
                    delay: 0.0,
                    direction: rotate_deg(aim, angle),
                })
                .collect()
        }
        FirePattern::RapidSmall => burst(weapon, aim, RAPID_SMALL_SHOTS, rng),
        FirePattern::BurstN => burst(weapon, aim, weapon.burst_count.max(BURST_MIN_SHOTS), rng),
    }
}

fn burst(weapon: &RangedWeapon, aim: Vec2, count: u32, rng: &mut impl Rng) -> Vec<VolleyShot> {
    let spread = weapon.spread_deg;
    let interval = weapon.burst_interval.max(0.0);

    (0..count)
        .map(|i| {
            let direction = if spread > 0.0 {
                rotate_deg(aim, rng.gen_range(-spread..=spread))
            } else {
                aim
            };
            VolleyShot {
                delay: i as f32 * interval,
                direction,
            }
        })
        .collect()
}

/// Отложенные выстрелы очереди (направление зафиксировано при нажатии)
#[derive(Component, Debug, Clone, Default)]
pub struct BurstQueue {
    pub shots: DeferredActions<Vec2>,
}

impl BurstQueue {
    pub fn is_active(&self) -> bool {
        self.shots.has_pending()
    }

    pub fn cancel(&mut self) {
        self.shots.cancel_all();
    }
}
