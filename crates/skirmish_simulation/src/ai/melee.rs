//! Melee engagement: 3 состояния с гистерезисом
//!
//! Seeking → WindingUp → Recovering → Seeking
//!
//! - Seeking: идём к цели (двухполосный гистерезис скорости)
//! - WindingUp: стоим, ждём отложенный Strike (windup)
//! - Recovering: стоим, ждём cooldown
//!
//! Strike: не колбэк, а действие в `DeferredActions`, которым владеет компонент.
//! `disable()` отменяет его, так что после выключения удара не будет.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::scheduler::{DeferredActions, TaskHandle};
use crate::combat::SweptArcDetector;
use crate::movement::AvoidanceSteering;

/// Тюнинг melee контроллера (IntentApplicator перезаписывает на лету)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct MeleeTuning {
    pub move_speed: f32,
    /// Где перестаём давить вперёд
    pub stop_distance: f32,
    /// Откуда можно бить
    pub attack_range: f32,
    /// Гистерезис (анти-дрожание на границе)
    pub approach_buffer: f32,
    pub attack_cooldown: f32,
    /// Задержка перед ударом
    pub attack_windup: f32,
    /// Доля скорости в полосе между enter_stop и enter_chase
    pub reduced_speed_factor: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            stop_distance: 1.7,
            attack_range: 2.0,
            approach_buffer: 0.15,
            attack_cooldown: 1.0,
            attack_windup: 0.15,
            reduced_speed_factor: 0.35,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum MeleeState {
    #[default]
    Seeking,
    WindingUp,
    Recovering,
}

/// Отложенное действие melee контроллера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeleeAction {
    Strike,
}

/// Результат тика: желаемое движение + начался ли удар
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeleeCommand {
    /// Unit direction (ноль если стоим)
    pub direction: Vec2,
    pub speed: f32,
    /// Strike сработал: вызывающий стартует sweep
    pub swing_started: bool,
}

impl MeleeCommand {
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    pub fn is_moving(&self) -> bool {
        self.speed > 0.0 && self.direction != Vec2::ZERO
    }
}

/// Melee контроллер агента
#[derive(Component, Debug, Clone)]
#[require(SweptArcDetector, AvoidanceSteering)]
pub struct MeleeEngagement {
    pub tuning: MeleeTuning,
    state: MeleeState,
    attack_timer: f32,
    actions: DeferredActions<MeleeAction>,
    pending_strike: Option<TaskHandle>,
    enabled: bool,
}

impl Default for MeleeEngagement {
    fn default() -> Self {
        Self::new(MeleeTuning::default())
    }
}

impl MeleeEngagement {
    pub fn new(tuning: MeleeTuning) -> Self {
        Self {
            tuning,
            state: MeleeState::Seeking,
            attack_timer: 0.0,
            actions: DeferredActions::new(),
            pending_strike: None,
            enabled: true,
        }
    }

    pub fn state(&self) -> MeleeState {
        self.state
    }

    pub fn attack_timer(&self) -> f32 {
        self.attack_timer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_pending_strike(&self) -> bool {
        self.pending_strike
            .is_some_and(|handle| self.actions.is_pending(handle))
    }

    /// Выключить: отложенный удар отменяется, состояние → Seeking
    pub fn disable(&mut self) {
        self.actions.cancel_all();
        self.pending_strike = None;
        self.state = MeleeState::Seeking;
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Порог входа в windup (с гистерезисом)
    pub fn windup_threshold(&self) -> f32 {
        self.tuning.attack_range - self.tuning.approach_buffer
    }

    /// Один fixed тик.
    ///
    /// `to_target`: вектор от агента к цели (None = цели нет).
    pub fn tick(&mut self, to_target: Option<Vec2>, dt: f32) -> MeleeCommand {
        let mut command = MeleeCommand::default();
        if !self.enabled {
            return command;
        }

        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
        }

        // Отложенный удар
        for action in self.actions.advance(dt) {
            match action {
                MeleeAction::Strike => {
                    self.pending_strike = None;
                    if self.state != MeleeState::WindingUp {
                        continue;
                    }
                    if to_target.is_some() {
                        command.swing_started = true;
                        self.attack_timer = self.tuning.attack_cooldown;
                        self.state = MeleeState::Recovering;
                    } else {
                        // Цель пропала за время windup
                        self.state = MeleeState::Seeking;
                    }
                }
            }
        }

        let distance = to_target.map(|v| v.length());

        // Переходы
        match self.state {
            MeleeState::Seeking => {
                if let Some(distance) = distance {
                    if distance <= self.windup_threshold() && self.attack_timer <= 0.0 {
                        self.state = MeleeState::WindingUp;
                        self.pending_strike = Some(
                            self.actions
                                .schedule(self.tuning.attack_windup, MeleeAction::Strike),
                        );
                    }
                }
            }
            MeleeState::WindingUp => {}
            MeleeState::Recovering => {
                if self.attack_timer <= 0.0 {
                    self.state = MeleeState::Seeking;
                }
            }
        }

        // Движение только в Seeking
        if self.state == MeleeState::Seeking {
            if let (Some(to_target), Some(distance)) = (to_target, distance) {
                let enter_chase = self.tuning.stop_distance + self.tuning.approach_buffer;
                let enter_stop = self.tuning.stop_distance - self.tuning.approach_buffer;
                let direction = to_target.normalize_or_zero();

                if distance > enter_chase {
                    command.direction = direction;
                    command.speed = self.tuning.move_speed;
                } else if distance > enter_stop {
                    command.direction = direction;
                    command.speed = self.tuning.move_speed * self.tuning.reduced_speed_factor;
                }
            }
        }

        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_close_target_enters_windup_and_stops() {
        let mut melee = MeleeEngagement::default();

        let command = melee.tick(Some(Vec2::new(1.0, 0.0)), DT);

        assert_eq!(melee.state(), MeleeState::WindingUp);
        assert_eq!(command.velocity(), Vec2::ZERO);
        assert!(melee.has_pending_strike());
    }

    #[test]
    fn test_hysteresis_band_blocks_windup() {
        let mut melee = MeleeEngagement::default();

        // attack_range 2.0, buffer 0.15 → порог 1.85
        melee.tick(Some(Vec2::new(1.9, 0.0)), DT);
        assert_eq!(melee.state(), MeleeState::Seeking);

        melee.tick(Some(Vec2::new(1.85, 0.0)), DT);
        assert_eq!(melee.state(), MeleeState::WindingUp);
    }

    #[test]
    fn test_cooldown_blocks_windup() {
        let mut melee = MeleeEngagement::default();
        let close = Some(Vec2::new(1.0, 0.0));

        melee.tick(close, DT);
        // windup 0.15 сек
        let mut swung = false;
        for _ in 0..12 {
            swung |= melee.tick(close, DT).swing_started;
        }
        assert!(swung);
        assert_eq!(melee.state(), MeleeState::Recovering);

        // Пока cooldown > 0: никаких новых windup
        for _ in 0..30 {
            let command = melee.tick(close, DT);
            assert_eq!(command.velocity(), Vec2::ZERO);
            assert_ne!(melee.state(), MeleeState::WindingUp);
        }
    }

    #[test]
    fn test_full_cycle_returns_to_seeking() {
        let mut melee = MeleeEngagement::new(MeleeTuning {
            attack_cooldown: 0.5,
            ..Default::default()
        });
        let far = Some(Vec2::new(1.0, 0.0));

        melee.tick(far, DT);
        let mut ticks = 0;
        while melee.state() != MeleeState::Recovering {
            melee.tick(far, DT);
            ticks += 1;
            assert!(ticks < 100);
        }
        while melee.state() == MeleeState::Recovering {
            melee.tick(Some(Vec2::new(5.0, 0.0)), DT);
            ticks += 1;
            assert!(ticks < 200);
        }
        assert_eq!(melee.state(), MeleeState::Seeking);
    }

    #[test]
    fn test_speed_bands() {
        let mut melee = MeleeEngagement::default();
        // stop 1.7 ± 0.15 → chase > 1.85, stop ≤ 1.55; windup only ≤ 1.85 and cooldown 0

        // Далеко: полная скорость
        let command = melee.tick(Some(Vec2::new(0.0, 5.0)), DT);
        assert_eq!(command.speed, 5.0);
        assert_eq!(command.direction, Vec2::Y);

        // Кулдаун чтобы не уйти в windup
        let mut melee = MeleeEngagement::default();
        melee.attack_timer = 10.0;

        let command = melee.tick(Some(Vec2::new(1.7, 0.0)), DT);
        assert!((command.speed - 5.0 * 0.35).abs() < 1e-5);

        let command = melee.tick(Some(Vec2::new(1.5, 0.0)), DT);
        assert_eq!(command.speed, 0.0);
    }

    #[test]
    fn test_disable_cancels_pending_strike() {
        let mut melee = MeleeEngagement::default();
        let close = Some(Vec2::new(1.0, 0.0));

        melee.tick(close, DT);
        assert!(melee.has_pending_strike());

        melee.disable();
        assert_eq!(melee.state(), MeleeState::Seeking);
        assert!(!melee.has_pending_strike());

        for _ in 0..60 {
            assert!(!melee.tick(close, DT).swing_started);
        }

        // После enable удар не "догоняет": только новый windup
        melee.enable();
        let command = melee.tick(close, DT);
        assert!(!command.swing_started);
        assert_eq!(melee.state(), MeleeState::WindingUp);
    }

    #[test]
    fn test_no_target_during_windup_aborts_swing() {
        let mut melee = MeleeEngagement::default();
        melee.tick(Some(Vec2::new(1.0, 0.0)), DT);

        let mut swung = false;
        for _ in 0..20 {
            swung |= melee.tick(None, DT).swing_started;
        }
        assert!(!swung);
        assert_eq!(melee.state(), MeleeState::Seeking);
    }
}
