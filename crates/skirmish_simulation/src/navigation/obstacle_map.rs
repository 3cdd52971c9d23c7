//! ObstacleMap: статическая сетка занятости арены
//!
//! Строится ОДИН раз из геометрии уровня (`OccupancySource`) и дальше только читается:
//! steering, LOS, pathfinder, projectiles. Ячейки хранятся в `Arc<[bool]>`,
//! поэтому clone дешёвый и безопасно раздаётся всем потребителям.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Прямоугольные границы сетки в индексах ячеек (аналог tilemap cellBounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBounds {
    /// Минимальная ячейка (может быть отрицательной)
    pub min: IVec2,
    /// Размер в ячейках
    pub size: UVec2,
}

impl CellBounds {
    pub fn new(min: IVec2, size: UVec2) -> Self {
        Self { min, size }
    }

    pub fn cell_count(&self) -> usize {
        self.size.x as usize * self.size.y as usize
    }

    /// Все ячейки в порядке строк (y, затем x)
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.size.y as i32).flat_map(move |y| {
            (0..self.size.x as i32).map(move |x| self.min + IVec2::new(x, y))
        })
    }
}

/// Источник геометрии уровня (tilemap, ASCII layout, редактор)
pub trait OccupancySource {
    fn bounds(&self) -> CellBounds;
    fn is_occupied(&self, cell: IVec2) -> bool;
}

/// Простой tile layer: плоский массив занятости в порядке строк
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub bounds: CellBounds,
    pub occupied: Vec<bool>,
}

impl TileLayer {
    pub fn empty(bounds: CellBounds) -> Self {
        Self {
            bounds,
            occupied: vec![false; bounds.cell_count()],
        }
    }

    pub fn set(&mut self, cell: IVec2, occupied: bool) {
        let local = cell - self.bounds.min;
        if local.x < 0 || local.y < 0 {
            return;
        }
        let (x, y) = (local.x as u32, local.y as u32);
        if x < self.bounds.size.x && y < self.bounds.size.y {
            let index = (y * self.bounds.size.x + x) as usize;
            self.occupied[index] = occupied;
        }
    }
}

impl OccupancySource for TileLayer {
    fn bounds(&self) -> CellBounds {
        self.bounds
    }

    fn is_occupied(&self, cell: IVec2) -> bool {
        let local = cell - self.bounds.min;
        if local.x < 0 || local.y < 0 {
            return false;
        }
        let (x, y) = (local.x as u32, local.y as u32);
        if x >= self.bounds.size.x || y >= self.bounds.size.y {
            return false;
        }
        self.occupied
            .get((y * self.bounds.size.x + x) as usize)
            .copied()
            .unwrap_or(false)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("layout is empty")]
    EmptyLayout,
    #[error("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
}

/// Статическая сетка занятости (blocked / free)
///
/// Инвариант: после `build` не мутируется.
/// Ячейки вне границ считаются свободными (за картой нет тайлов).
#[derive(Resource, Debug, Clone)]
pub struct ObstacleMap {
    bounds: CellBounds,
    cell_size: f32,
    blocked: Arc<[bool]>,
}

impl ObstacleMap {
    /// Дискретизирует геометрию уровня один раз
    pub fn build(source: &impl OccupancySource, cell_size: f32) -> Self {
        let bounds = source.bounds();
        let blocked: Vec<bool> = bounds.cells().map(|cell| source.is_occupied(cell)).collect();

        Self {
            bounds,
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            blocked: blocked.into(),
        }
    }

    /// Полностью свободная сетка `width × height` с началом в (0, 0)
    pub fn open(width: u32, height: u32, cell_size: f32) -> Self {
        let layer = TileLayer::empty(CellBounds::new(IVec2::ZERO, UVec2::new(width, height)));
        Self::build(&layer, cell_size)
    }

    /// ASCII layout: `#`: стена, всё остальное свободно.
    ///
    /// Первая строка: верхняя (максимальный y), как читается глазами.
    pub fn from_ascii(layout: &str, cell_size: f32) -> Result<Self, MapError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim_end)
            .filter(|row| !row.is_empty())
            .collect();

        let Some(first) = rows.first() else {
            return Err(MapError::EmptyLayout);
        };
        let width = first.chars().count();

        for (row, line) in rows.iter().enumerate() {
            let row_width = line.chars().count();
            if row_width != width {
                return Err(MapError::RaggedRow {
                    row,
                    width: row_width,
                    expected: width,
                });
            }
        }

        let height = rows.len();
        let mut layer = TileLayer::empty(CellBounds::new(
            IVec2::ZERO,
            UVec2::new(width as u32, height as u32),
        ));
        for (row, line) in rows.iter().enumerate() {
            let y = (height - 1 - row) as i32;
            for (x, ch) in line.chars().enumerate() {
                if ch == '#' {
                    layer.set(IVec2::new(x as i32, y), true);
                }
            }
        }

        Ok(Self::build(&layer, cell_size))
    }

    pub fn bounds(&self) -> CellBounds {
        self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width(&self) -> u32 {
        self.bounds.size.x
    }

    pub fn height(&self) -> u32 {
        self.bounds.size.y
    }

    /// Мировая точка → абсолютная ячейка (может быть вне границ)
    pub fn world_to_cell(&self, world: Vec2) -> IVec2 {
        (world / self.cell_size).floor().as_ivec2()
    }

    /// Абсолютная ячейка → локальный индекс (x, y) внутри границ
    pub fn local_index(&self, cell: IVec2) -> Option<UVec2> {
        let local = cell - self.bounds.min;
        if local.x < 0 || local.y < 0 {
            return None;
        }
        let local = local.as_uvec2();
        (local.x < self.bounds.size.x && local.y < self.bounds.size.y).then_some(local)
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        self.local_index(cell).is_some()
    }

    /// Центр ячейки в мировых координатах
    pub fn cell_center(&self, cell: IVec2) -> Vec2 {
        (cell.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    /// Мировой AABB ячейки (min, max)
    pub fn cell_rect(&self, cell: IVec2) -> (Vec2, Vec2) {
        let min = cell.as_vec2() * self.cell_size;
        (min, min + Vec2::splat(self.cell_size))
    }

    pub fn is_blocked(&self, cell: IVec2) -> bool {
        self.local_index(cell)
            .map(|local| self.blocked[(local.y * self.bounds.size.x + local.x) as usize])
            .unwrap_or(false)
    }

    pub fn is_blocked_at(&self, world: Vec2) -> bool {
        self.is_blocked(self.world_to_cell(world))
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_layout_orientation() {
        let map = ObstacleMap::from_ascii(
            "#..\n\
             ...\n\
             ..#",
            1.0,
        )
        .unwrap();

        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        // Первая строка = верх (y = 2)
        assert!(map.is_blocked(IVec2::new(0, 2)));
        assert!(map.is_blocked(IVec2::new(2, 0)));
        assert!(!map.is_blocked(IVec2::new(1, 1)));
        assert_eq!(map.blocked_count(), 2);
    }

    #[test]
    fn test_ragged_layout_rejected() {
        let err = ObstacleMap::from_ascii("...\n..\n", 1.0).unwrap_err();
        assert_eq!(
            err,
            MapError::RaggedRow {
                row: 1,
                width: 2,
                expected: 3
            }
        );
        assert_eq!(ObstacleMap::from_ascii("\n\n", 1.0).unwrap_err(), MapError::EmptyLayout);
    }

    #[test]
    fn test_world_cell_roundtrip_with_cell_size() {
        let map = ObstacleMap::open(10, 10, 0.5);
        let cell = map.world_to_cell(Vec2::new(1.26, 0.1));
        assert_eq!(cell, IVec2::new(2, 0));
        assert_eq!(map.cell_center(cell), Vec2::new(1.25, 0.25));
    }

    #[test]
    fn test_out_of_bounds_is_free() {
        let map = ObstacleMap::from_ascii("##\n##", 1.0).unwrap();
        assert!(map.is_blocked(IVec2::new(1, 1)));
        assert!(!map.is_blocked(IVec2::new(-1, 0)));
        assert!(!map.is_blocked(IVec2::new(5, 5)));
        assert!(!map.in_bounds(IVec2::new(2, 0)));
    }

    #[test]
    fn test_tile_layer_with_negative_origin() {
        let mut layer = TileLayer::empty(CellBounds::new(IVec2::new(-2, -2), UVec2::new(4, 4)));
        layer.set(IVec2::new(-2, -2), true);
        let map = ObstacleMap::build(&layer, 1.0);

        assert!(map.is_blocked(IVec2::new(-2, -2)));
        assert!(map.is_blocked_at(Vec2::new(-1.5, -1.5)));
        assert_eq!(map.local_index(IVec2::new(-2, -2)), Some(UVec2::ZERO));
    }
}
