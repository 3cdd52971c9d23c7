//! Базовые компоненты агентов: Actor, Health, Body, Facing, CombatTarget

use bevy::prelude::*;

use crate::combat::CombatStats;

/// Агент арены (игрок, melee/ranged враг): базовый компонент для живых существ
///
/// Автоматически добавляет Health, Body, Facing, CombatStats через Required Components.
/// Позиция: `Transform.translation.xy()`, z всегда 0.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Health, Body, Facing, CombatStats)]
pub struct Actor {
    /// ID фракции (команды). Агенты одной фракции не бьют друг друга
    pub faction_id: u64,
}

impl Actor {
    pub fn new(faction_id: u64) -> Self {
        Self { faction_id }
    }

    pub fn is_hostile_to(&self, other: &Actor) -> bool {
        self.faction_id != other.faction_id
    }
}

/// Здоровье агента
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Применить урон. Возвращает фактически снятое HP
    ///
    /// Мертвого (current == 0) не трогаем, отрицательный/NaN урон игнорируем.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || !(amount > 0.0) {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        before - self.current
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

/// Физическое тело агента (kinematic)
///
/// `velocity` пишут engagement контроллеры (FixedUpdate),
/// `achieved_speed` пишет integrate_velocity: реальная скорость после коллизий.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Body {
    /// Запрошенная скорость (м/с)
    pub velocity: Vec2,
    /// Радиус коллайдера (он же hurt circle для sweep/projectile)
    pub radius: f32,
    /// Скорость, реально пройденная за прошлый тик
    pub achieved_speed: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            radius: 0.4,
            achieved_speed: 0.0,
        }
    }
}

impl Body {
    pub fn with_radius(radius: f32) -> Self {
        Self {
            radius,
            ..default()
        }
    }
}

/// Направление "вперёд" агента (unit vector)
///
/// Обновляется в Update (variable step) поворотом к цели.
/// SweptArcDetector читает его как forward pose.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub forward: Vec2,
}

impl Default for Facing {
    fn default() -> Self {
        Self { forward: Vec2::Y }
    }
}

impl Facing {
    pub fn towards(direction: Vec2) -> Self {
        Self {
            forward: direction.try_normalize().unwrap_or(Vec2::Y),
        }
    }
}

/// Цель агента (выдаётся внешним коллаборатором: spawner, player tag lookup)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CombatTarget {
    pub entity: Entity,
}
