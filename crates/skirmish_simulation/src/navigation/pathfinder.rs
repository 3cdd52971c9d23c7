//! GridPathfinder: ограниченный BFS по ObstacleMap
//!
//! One-shot запрос: 4-связные соседи, лимит раскрытых узлов, путь как
//! последовательность центров ячеек от старта к цели. Не replanner,
//! если цель ушла далеко, вызывающий просто спрашивает заново.

use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;
use thiserror::Error;

use super::ObstacleMap;
use crate::logger;

/// Дефолтный лимит раскрытых узлов
pub const DEFAULT_MAX_SEARCH: usize = 2048;

const NEIGHBOURS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("source cell {0} is outside the grid")]
    SourceOutOfBounds(IVec2),
    #[error("goal cell {0} is outside the grid")]
    GoalOutOfBounds(IVec2),
    #[error("node budget exhausted after {expanded} expansions")]
    BudgetExhausted { expanded: usize },
    #[error("goal is not reachable from source")]
    Unreachable,
}

/// BFS pathfinder поверх общей (read-only) сетки
#[derive(Resource, Debug, Clone)]
pub struct GridPathfinder {
    map: ObstacleMap,
    max_search: usize,
}

impl GridPathfinder {
    pub fn build(map: &ObstacleMap) -> Self {
        Self::with_budget(map, DEFAULT_MAX_SEARCH)
    }

    pub fn with_budget(map: &ObstacleMap, max_search: usize) -> Self {
        Self {
            map: map.clone(),
            max_search: max_search.max(1),
        }
    }

    pub fn map(&self) -> &ObstacleMap {
        &self.map
    }

    pub fn max_search(&self) -> usize {
        self.max_search
    }

    /// Найти путь между мировыми точками.
    ///
    /// Стартовая ячейка НЕ проверяется на blocked (агент может стоять впритык к стене),
    /// соседи: проверяются. Waypoints: центры ячеек, первый = ячейка `from_world`.
    pub fn find_path(&self, from_world: Vec2, to_world: Vec2) -> Result<Vec<Vec2>, PathError> {
        let result = self.search(from_world, to_world);
        if let Err(err) = &result {
            logger::log_lazy(|| format!("no path {:?} -> {:?}: {}", from_world, to_world, err));
        }
        result
    }

    fn search(&self, from_world: Vec2, to_world: Vec2) -> Result<Vec<Vec2>, PathError> {
        let start = self.map.world_to_cell(from_world);
        let goal = self.map.world_to_cell(to_world);

        if !self.map.in_bounds(start) {
            return Err(PathError::SourceOutOfBounds(start));
        }
        if !self.map.in_bounds(goal) {
            return Err(PathError::GoalOutOfBounds(goal));
        }
        if self.map.is_blocked(goal) {
            return Err(PathError::Unreachable);
        }

        let mut came_from: HashMap<IVec2, Option<IVec2>> = HashMap::new();
        let mut queue = VecDeque::new();
        came_from.insert(start, None);
        queue.push_back(start);

        let mut expanded = 0;
        let mut reached = false;

        while expanded < self.max_search {
            let Some(current) = queue.pop_front() else {
                break;
            };
            expanded += 1;

            if current == goal {
                reached = true;
                break;
            }

            for offset in NEIGHBOURS {
                let next = current + offset;
                if !self.map.in_bounds(next) || self.map.is_blocked(next) {
                    continue;
                }
                if came_from.contains_key(&next) {
                    continue;
                }
                came_from.insert(next, Some(current));
                queue.push_back(next);
            }
        }

        // Цель могла попасть в came_from как сосед до исчерпания бюджета
        if !reached && !came_from.contains_key(&goal) {
            return Err(if queue.is_empty() {
                PathError::Unreachable
            } else {
                PathError::BudgetExhausted { expanded }
            });
        }

        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(cell) = cursor {
            path.push(self.map.cell_center(cell));
            cursor = came_from.get(&cell).copied().flatten();
        }
        path.reverse();

        Ok(path)
    }
}
