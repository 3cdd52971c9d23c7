//! Combat telemetry: попытки атак и попадания

use bevy::prelude::*;

/// Счётчики агента (чисто наблюдательные: на логику не влияют)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CombatStats {
    /// Взмахи + нажатия на спуск
    pub attacks_attempted: u32,
    /// Попадания по целям с Health
    pub hits_landed: u32,
}

impl CombatStats {
    pub fn register_attempt(&mut self) {
        self.attacks_attempted += 1;
    }

    pub fn register_hit(&mut self) {
        self.hits_landed += 1;
    }

    /// hits / attempts (0 если попыток не было)
    pub fn hit_rate(&self) -> f32 {
        if self.attacks_attempted == 0 {
            0.0
        } else {
            self.hits_landed as f32 / self.attacks_attempted as f32
        }
    }
}
