//! Weapon records (melee + ranged)
//!
//! Immutable конфигурация: урон, тайминги, форма хитбокса, паттерн стрельбы.
//! Компонент на агенте = "что у него в руках". Логика: в sweep/fire/projectile.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Дистанция baseline профиля если оружия нет
pub const UNARMED_SUGGESTED_RANGE: f32 = 2.0;

/// Melee оружие
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct MeleeWeapon {
    pub name: String,

    pub damage: f32,
    /// Длительность замаха-удара (сек)
    pub swing_duration: f32,
    pub cooldown: f32,

    // === Sweep arc ===
    /// Полный угол дуги удара (градусы), центр: facing
    pub sweep_arc_deg: f32,
    /// Плотность сэмплов на всю дугу
    pub sweep_samples: u32,
    /// Сдвиг точки начала вперёд от владельца
    pub origin_offset: f32,

    // === Hitbox shape ===
    /// x: ширина поперёк, y: длина вдоль удара
    pub collider_size: Vec2,
    /// x: вправо, y: вперёд
    pub collider_offset: Vec2,
}

impl Default for MeleeWeapon {
    fn default() -> Self {
        Self::sword()
    }
}

impl MeleeWeapon {
    pub fn sword() -> Self {
        Self {
            name: "Sword".to_string(),
            damage: 10.0,
            swing_duration: 0.22,
            cooldown: 0.3,
            sweep_arc_deg: 90.0,
            sweep_samples: 12,
            origin_offset: 0.25,
            collider_size: Vec2::new(0.7, 1.1),
            collider_offset: Vec2::new(0.0, 0.65),
        }
    }

    /// Медленный широкий удар
    pub fn greataxe() -> Self {
        Self {
            name: "Greataxe".to_string(),
            damage: 22.0,
            swing_duration: 0.4,
            cooldown: 0.6,
            sweep_arc_deg: 140.0,
            sweep_samples: 18,
            collider_size: Vec2::new(0.9, 1.5),
            collider_offset: Vec2::new(0.0, 0.85),
            ..Self::sword()
        }
    }

    /// Быстрый короткий тычок
    pub fn dagger() -> Self {
        Self {
            name: "Dagger".to_string(),
            damage: 6.0,
            swing_duration: 0.12,
            cooldown: 0.15,
            sweep_arc_deg: 40.0,
            sweep_samples: 6,
            collider_size: Vec2::new(0.4, 0.7),
            collider_offset: Vec2::new(0.0, 0.4),
            ..Self::sword()
        }
    }

    /// Контактная дистанция из формы хитбокса
    pub fn suggested_range(&self) -> f32 {
        (self.collider_offset.y + self.collider_size.y * 0.5 + 0.5).clamp(1.2, 3.5)
    }
}

/// Как оружие выпускает снаряды
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum FirePattern {
    #[default]
    Single,
    /// Три снаряда веером ±spread/2
    TripleSpread,
    /// Очередь из 4 с разбросом
    RapidSmall,
    /// Очередь из `burst_count` (≥ 2) с разбросом
    BurstN,
}

/// Ranged оружие
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct RangedWeapon {
    pub name: String,

    // === Projectile ===
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    /// Время жизни снаряда (сек)
    pub projectile_life: f32,
    pub projectile_radius: f32,

    // === Fire ===
    pub cooldown: f32,
    pub pattern: FirePattern,
    pub spread_deg: f32,
    pub burst_count: u32,
    pub burst_interval: f32,

    /// Тактика AI: желаемая дистанция
    pub desired_range: f32,
}

impl Default for RangedWeapon {
    fn default() -> Self {
        Self::bow()
    }
}

impl RangedWeapon {
    pub fn bow() -> Self {
        Self {
            name: "Bow".to_string(),
            projectile_speed: 12.0,
            projectile_damage: 8.0,
            projectile_life: 3.0,
            projectile_radius: 0.1,
            cooldown: 0.6,
            pattern: FirePattern::Single,
            spread_deg: 8.0,
            burst_count: 3,
            burst_interval: 0.06,
            desired_range: 6.5,
        }
    }

    pub fn scattershot() -> Self {
        Self {
            name: "Scattershot".to_string(),
            projectile_damage: 5.0,
            cooldown: 0.9,
            pattern: FirePattern::TripleSpread,
            spread_deg: 24.0,
            desired_range: 4.5,
            ..Self::bow()
        }
    }

    pub fn repeater() -> Self {
        Self {
            name: "Repeater".to_string(),
            projectile_speed: 16.0,
            projectile_damage: 3.0,
            cooldown: 1.0,
            pattern: FirePattern::RapidSmall,
            spread_deg: 5.0,
            burst_interval: 0.08,
            ..Self::bow()
        }
    }

    pub fn javelin_thrower() -> Self {
        Self {
            name: "Javelins".to_string(),
            projectile_speed: 9.0,
            projectile_damage: 14.0,
            cooldown: 1.4,
            pattern: FirePattern::BurstN,
            burst_count: 2,
            burst_interval: 0.2,
            desired_range: 8.0,
            ..Self::bow()
        }
    }

    pub fn suggested_range(&self) -> f32 {
        self.desired_range.max(1.0)
    }
}

/// Baseline дистанция для профиля: ranged важнее melee, без оружия: 2.0
pub fn suggested_range(melee: Option<&MeleeWeapon>, ranged: Option<&RangedWeapon>) -> f32 {
    match (ranged, melee) {
        (Some(ranged), _) => ranged.suggested_range(),
        (None, Some(melee)) => melee.suggested_range(),
        (None, None) => UNARMED_SUGGESTED_RANGE,
    }
}
