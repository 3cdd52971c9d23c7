//! 2D геометрия: повороты, перпендикуляры, oriented box
//!
//! Конвенция: арена в плоскости XY, положительный угол = против часовой стрелки.
//! Все углы в публичном API: в градусах (как в тюнинге оружия).

use bevy::prelude::*;

/// Минимальный квадрат длины, ниже которого направление считается вырожденным
pub const DEGENERATE_EPSILON_SQ: f32 = 0.001;

/// Повернуть вектор на `deg` градусов (CCW)
pub fn rotate_deg(v: Vec2, deg: f32) -> Vec2 {
    Vec2::from_angle(deg.to_radians()).rotate(v)
}

/// Левый перпендикуляр (поворот на +90°)
pub fn left_of(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Правый перпендикуляр (поворот на −90°)
pub fn right_of(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Нормализует направление или возвращает None для нулевого вектора
pub fn direction_or_none(v: Vec2) -> Option<Vec2> {
    if v.length_squared() < DEGENERATE_EPSILON_SQ {
        None
    } else {
        Some(v.normalize())
    }
}

/// Угол между двумя векторами в градусах, [0, 180]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let (Some(a), Some(b)) = (a.try_normalize(), b.try_normalize()) else {
        return 0.0;
    };
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Oriented box: центр, половинные размеры, локальная ось "вперёд" (+Y бокса)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec2,
    pub half_extents: Vec2,
    /// Unit vector локальной оси +Y
    pub up: Vec2,
}

impl OrientedBox {
    /// `size.x`: ширина поперёк удара, `size.y`: длина вдоль `up`
    pub fn new(center: Vec2, size: Vec2, up: Vec2) -> Self {
        Self {
            center,
            half_extents: size.abs() * 0.5,
            up: up.try_normalize().unwrap_or(Vec2::Y),
        }
    }

    /// Локальная ось +X (правая рука при взгляде вдоль `up`)
    pub fn right(&self) -> Vec2 {
        right_of(self.up)
    }

    /// Угол поворота бокса в градусах (0° = `up` смотрит вдоль +Y)
    pub fn angle_deg(&self) -> f32 {
        Vec2::Y.angle_to(self.up).to_degrees()
    }

    /// Точка из мира в локальные координаты бокса
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        let rel = point - self.center;
        Vec2::new(rel.dot(self.right()), rel.dot(self.up))
    }

    /// Пересекается ли круг с боксом
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let local = self.to_local(center);
        let closest = local.clamp(-self.half_extents, self.half_extents);
        local.distance_squared(closest) <= radius * radius
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let hx = self.right() * self.half_extents.x;
        let hy = self.up * self.half_extents.y;
        [
            self.center + hx + hy,
            self.center - hx + hy,
            self.center - hx - hy,
            self.center + hx - hy,
        ]
    }
}
