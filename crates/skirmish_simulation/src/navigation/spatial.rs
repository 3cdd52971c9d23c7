//! Spatial queries против статических препятствий
//!
//! `ObstacleProbe`: граница между AI и коллизиями. Steering, LOS и ranged
//! контроллер знают только этот trait; реализация для `ObstacleMap` делает
//! circle cast маршем по сетке с бинарным уточнением точки контакта.

use bevy::prelude::*;

use super::ObstacleMap;

/// Результат circle cast: дистанция до контакта и нормаль поверхности
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub distance: f32,
    /// Unit normal, смотрит от препятствия к кругу
    pub normal: Vec2,
}

pub trait ObstacleProbe {
    /// Протащить круг `radius` из `origin` вдоль `direction` (unit) на `max_distance`.
    /// None: путь свободен.
    fn circle_cast(&self, origin: Vec2, radius: f32, direction: Vec2, max_distance: f32) -> Option<CastHit>;

    /// Свободна ли прямая видимость (circle cast радиусом `radius`)
    fn has_line_of_sight(&self, from: Vec2, to: Vec2, radius: f32) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return true;
        }
        self.circle_cast(from, radius, delta / distance, distance).is_none()
    }

    /// Нормализованный запас хода [0, 1] в направлении (1 = свободно на всю дистанцию)
    fn clearance01(&self, origin: Vec2, radius: f32, direction: Vec2, probe_distance: f32) -> f32 {
        let direction = direction.try_normalize().unwrap_or(Vec2::Y);
        match self.circle_cast(origin, radius, direction, probe_distance) {
            None => 1.0,
            Some(hit) => (hit.distance / probe_distance.max(0.0001)).clamp(0.0, 1.0),
        }
    }
}

/// Шаг марша относительно min(radius, cell_size)
const MARCH_FRACTION: f32 = 0.25;
/// Итераций бинарного уточнения контакта
const REFINE_STEPS: usize = 8;

impl ObstacleMap {
    /// Ближайшая точка заблокированной ячейки к кругу, если круг её задевает
    fn circle_contact(&self, center: Vec2, radius: f32) -> Option<Vec2> {
        let min_cell = self.world_to_cell(center - Vec2::splat(radius));
        let max_cell = self.world_to_cell(center + Vec2::splat(radius));

        let mut best: Option<(f32, Vec2)> = None;
        for y in min_cell.y..=max_cell.y {
            for x in min_cell.x..=max_cell.x {
                let cell = IVec2::new(x, y);
                if !self.is_blocked(cell) {
                    continue;
                }
                let (rect_min, rect_max) = self.cell_rect(cell);
                let closest = center.clamp(rect_min, rect_max);
                let dist_sq = center.distance_squared(closest);
                if dist_sq < radius * radius && best.is_none_or(|(d, _)| dist_sq < d) {
                    best = Some((dist_sq, closest));
                }
            }
        }
        best.map(|(_, point)| point)
    }

    /// Пересекается ли круг хоть с одной заблокированной ячейкой
    pub fn circle_blocked(&self, center: Vec2, radius: f32) -> bool {
        self.circle_contact(center, radius).is_some()
    }

    fn contact_normal(&self, center: Vec2, radius: f32, direction: Vec2) -> Vec2 {
        // Чуть раздуваем радиус: на уточнённой точке круг касается, но не пересекает
        self.circle_contact(center, radius * 1.05 + 0.001)
            .and_then(|point| (center - point).try_normalize())
            .unwrap_or(-direction)
    }
}

impl ObstacleProbe for ObstacleMap {
    fn circle_cast(&self, origin: Vec2, radius: f32, direction: Vec2, max_distance: f32) -> Option<CastHit> {
        let direction = direction.try_normalize()?;
        let mut radius = radius.max(0.0);

        // Уже касаемся стены: контакт только если направление в неё.
        // От стены маршируем тем радиусом, который уже свободен.
        if let Some(contact) = self.circle_contact(origin, radius) {
            let normal = (origin - contact).try_normalize().unwrap_or(-direction);
            if direction.dot(normal) < 0.0 {
                return Some(CastHit { distance: 0.0, normal });
            }
            radius = origin.distance(contact) * 0.999;
        }

        let step = (radius.min(self.cell_size()).max(0.05)) * MARCH_FRACTION;
        let mut safe = 0.0_f32;

        while safe < max_distance {
            let next = (safe + step).min(max_distance);
            if self.circle_blocked(origin + direction * next, radius) {
                // Бинарное уточнение между safe и next
                let (mut lo, mut hi) = (safe, next);
                for _ in 0..REFINE_STEPS {
                    let mid = (lo + hi) * 0.5;
                    if self.circle_blocked(origin + direction * mid, radius) {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                return Some(CastHit {
                    distance: lo,
                    normal: self.contact_normal(origin + direction * lo, radius, direction),
                });
            }
            safe = next;
        }

        None
    }
}

/// Что агент "видит" вокруг себя: LOS до цели и запас хода по направлению
pub trait AgentSense {
    fn has_line_of_sight(&self, target: Vec2) -> bool;
    fn clearance01(&self, direction: Vec2) -> f32;
}

/// Чувства агента поверх `ObstacleProbe`
pub struct ProbeSense<'a, P: ObstacleProbe> {
    pub probe: &'a P,
    pub position: Vec2,
    /// Радиус для clearance (как у steering)
    pub body_radius: f32,
    /// Радиус circle cast для LOS (тоньше тела: пули узкие)
    pub los_radius: f32,
    pub probe_distance: f32,
}

impl<P: ObstacleProbe> AgentSense for ProbeSense<'_, P> {
    fn has_line_of_sight(&self, target: Vec2) -> bool {
        self.probe.has_line_of_sight(self.position, target, self.los_radius)
    }

    fn clearance01(&self, direction: Vec2) -> f32 {
        self.probe
            .clearance01(self.position, self.body_radius, direction, self.probe_distance)
    }
}

/// Арена без карты препятствий: всё видно, по сторонам одинаково
pub struct OpenField;

impl AgentSense for OpenField {
    fn has_line_of_sight(&self, _target: Vec2) -> bool {
        true
    }

    fn clearance01(&self, _direction: Vec2) -> f32 {
        0.5
    }
}
