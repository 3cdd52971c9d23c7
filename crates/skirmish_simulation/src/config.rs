//! SimulationConfig: глобальные параметры симуляции (resource)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::DEFAULT_APPLY_INTERVAL;
use crate::navigation::{MapError, ObstacleMap, DEFAULT_MAX_SEARCH};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f64,
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Как часто IntentApplicator пересчитывает тюнинг (сек)
    pub intent_apply_interval: f32,
    /// Лимит раскрытых клеток для GridPathfinder
    pub path_budget: usize,
    /// Размер клетки ObstacleMap (world units)
    pub cell_size: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            intent_apply_interval: DEFAULT_APPLY_INTERVAL,
            path_budget: DEFAULT_MAX_SEARCH,
            cell_size: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Длина одного fixed тика (сек)
    pub fn tick_seconds(&self) -> f32 {
        if self.tick_hz > 0.0 {
            (1.0 / self.tick_hz) as f32
        } else {
            1.0 / 60.0
        }
    }

    /// ObstacleMap из ASCII раскладки с клеткой `cell_size`
    pub fn arena_from_ascii(&self, layout: &str) -> Result<ObstacleMap, MapError> {
        ObstacleMap::from_ascii(layout, self.cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.path_budget, 2048);
        assert!((config.tick_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_rate_falls_back_to_60hz() {
        let config = SimulationConfig {
            tick_hz: 0.0,
            ..Default::default()
        };
        assert!((config.tick_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_arena_uses_configured_cell_size() {
        let config = SimulationConfig {
            cell_size: 0.5,
            ..Default::default()
        };
        let map = config.arena_from_ascii(".#").unwrap();

        assert_eq!(map.cell_size(), 0.5);
        assert!(map.is_blocked_at(Vec2::new(0.75, 0.25)));
        assert!(!map.is_blocked_at(Vec2::new(0.25, 0.25)));
    }
}
