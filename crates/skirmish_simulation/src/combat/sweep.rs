//! Swept-arc hit detection (melee)
//!
//! Удар: не мгновенная проверка, а вращающийся oriented box, который за
//! `swing_duration` проходит дугу от −arc/2 до +arc/2 вокруг facing.
//!
//! Каждый fixed тик:
//! 1. Прогресс p_prev → p (доля длительности)
//! 2. Окно режется на ceil(samples · (p − p_prev)) сэмплов (без дыр при низком тикрейте)
//! 3. На каждом сэмпле: overlap box + angle gate от НАСТОЯЩЕГО facing
//! 4. Hit-set: каждая цель получает урон максимум один раз за взмах
//!
//! Hit-set очищается только в `start_swing` (и `cancel_swing`), никогда посреди взмаха.

use std::collections::HashSet;

use bevy::prelude::*;

use super::weapon::MeleeWeapon;
use crate::shared::{angle_between_deg, direction_or_none, right_of, rotate_deg, OrientedBox};

/// Форма хитбокса (шаблон из оружия)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct HitShape {
    /// x: поперёк удара, y: вдоль
    pub size: Vec2,
    /// x: вправо от направления сэмпла, y: вперёд
    pub offset: Vec2,
}

/// Поза владельца на момент тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WielderPose {
    pub position: Vec2,
    /// Unit facing
    pub forward: Vec2,
}

/// Кандидат на попадание: hurt circle цели
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HurtTarget {
    pub entity: Entity,
    pub center: Vec2,
    pub radius: f32,
}

/// Overlap запрос: кто из целей пересекает box
pub trait TargetQuery {
    fn overlap_box(&self, query_box: &OrientedBox, out: &mut Vec<HurtTarget>);
}

impl TargetQuery for [HurtTarget] {
    fn overlap_box(&self, query_box: &OrientedBox, out: &mut Vec<HurtTarget>) {
        out.extend(
            self.iter()
                .filter(|target| query_box.overlaps_circle(target.center, target.radius)),
        );
    }
}

impl TargetQuery for Vec<HurtTarget> {
    fn overlap_box(&self, query_box: &OrientedBox, out: &mut Vec<HurtTarget>) {
        self.as_slice().overlap_box(query_box, out);
    }
}

/// Куда уходит урон
pub trait DamageSink {
    fn apply_damage(&mut self, target: Entity, amount: f32);
}

impl DamageSink for Vec<(Entity, f32)> {
    fn apply_damage(&mut self, target: Entity, amount: f32) {
        self.push((target, amount));
    }
}

/// Детектор swept-arc попаданий
#[derive(Component, Debug, Clone)]
pub struct SweptArcDetector {
    pub damage: f32,
    pub swing_duration: f32,
    /// Полный угол дуги (градусы)
    pub sweep_arc_deg: f32,
    /// Плотность сэмплов на весь взмах
    pub sweep_samples: u32,
    /// Сдвиг точки начала вперёд по facing
    pub origin_offset: f32,
    /// None: хитбокс не настроен, start_swing = no-op
    pub shape: Option<HitShape>,

    elapsed: Option<f32>,
    hit_this_swing: HashSet<Entity>,
}

impl Default for SweptArcDetector {
    fn default() -> Self {
        Self::from_weapon(&MeleeWeapon::default())
    }
}

impl SweptArcDetector {
    pub fn from_weapon(weapon: &MeleeWeapon) -> Self {
        let mut detector = Self {
            damage: 0.0,
            swing_duration: 0.0,
            sweep_arc_deg: 0.0,
            sweep_samples: 0,
            origin_offset: 0.0,
            shape: None,
            elapsed: None,
            hit_this_swing: HashSet::new(),
        };
        detector.equip(weapon);
        detector
    }

    /// Перенастроить под оружие (текущий взмах отменяется)
    pub fn equip(&mut self, weapon: &MeleeWeapon) {
        self.cancel_swing();
        self.damage = weapon.damage;
        self.swing_duration = weapon.swing_duration;
        self.sweep_arc_deg = weapon.sweep_arc_deg.clamp(0.0, 180.0);
        self.sweep_samples = weapon.sweep_samples;
        self.origin_offset = weapon.origin_offset;
        self.shape = Some(HitShape {
            size: weapon.collider_size,
            offset: weapon.collider_offset,
        });
    }

    pub fn is_active(&self) -> bool {
        self.elapsed.is_some()
    }

    pub fn elapsed(&self) -> Option<f32> {
        self.elapsed
    }

    pub fn hits_this_swing(&self) -> usize {
        self.hit_this_swing.len()
    }

    pub fn was_hit_this_swing(&self, entity: Entity) -> bool {
        self.hit_this_swing.contains(&entity)
    }

    /// Начать взмах. `false` если хитбокс не настроен
    pub fn start_swing(&mut self) -> bool {
        if self.shape.is_none() {
            return false;
        }
        self.elapsed = Some(0.0);
        self.hit_this_swing.clear();
        true
    }

    pub fn cancel_swing(&mut self) {
        self.elapsed = None;
        self.hit_this_swing.clear();
    }

    /// Fixed тик. Возвращает число принятых попаданий.
    ///
    /// `pose = None` (нет facing/владельца) обрывает взмах.
    pub fn tick(
        &mut self,
        dt: f32,
        pose: Option<WielderPose>,
        targets: &(impl TargetQuery + ?Sized),
        sink: &mut impl DamageSink,
    ) -> usize {
        let Some(previous) = self.elapsed else {
            return 0;
        };
        let (Some(shape), Some(pose)) = (self.shape, pose) else {
            self.elapsed = None;
            return 0;
        };

        let now = previous + dt.max(0.0);
        let duration = self.swing_duration.max(f32::EPSILON);
        let p_prev = (previous / duration).clamp(0.0, 1.0);
        let p = (now / duration).clamp(0.0, 1.0);

        let half = self.sweep_arc_deg * 0.5;
        let window = self.sweep_samples as f32 * (p - p_prev);
        let sub = (window.ceil() as usize).max(1);

        let mut accepted = 0;
        let mut scratch = Vec::new();
        for i in 1..=sub {
            let sub_p = p_prev + (p - p_prev) * (i as f32 / sub as f32);
            let local_angle = -half + (2.0 * half) * sub_p;
            accepted += self.sample_at(local_angle, shape, pose, targets, &mut *sink, &mut scratch);
        }

        self.elapsed = if p >= 1.0 { None } else { Some(now) };
        accepted
    }

    /// Box для сэмпла под углом `local_angle_deg` от facing
    pub fn sample_box(&self, local_angle_deg: f32, shape: HitShape, pose: WielderPose) -> OrientedBox {
        let forward = direction_or_none(pose.forward).unwrap_or(Vec2::Y);
        let direction = rotate_deg(forward, local_angle_deg);
        let origin = pose.position + forward * self.origin_offset;
        let center = origin + right_of(direction) * shape.offset.x + direction * shape.offset.y;
        OrientedBox::new(center, shape.size, direction)
    }

    fn sample_at(
        &mut self,
        local_angle_deg: f32,
        shape: HitShape,
        pose: WielderPose,
        targets: &(impl TargetQuery + ?Sized),
        sink: &mut impl DamageSink,
        scratch: &mut Vec<HurtTarget>,
    ) -> usize {
        let query_box = self.sample_box(local_angle_deg, shape, pose);
        let forward = direction_or_none(pose.forward).unwrap_or(Vec2::Y);
        let half_gate = self.sweep_arc_deg * 0.5;

        scratch.clear();
        targets.overlap_box(&query_box, scratch);

        let mut accepted = 0;
        for target in scratch.iter() {
            if self.hit_this_swing.contains(&target.entity) {
                continue;
            }
            // Гейт по дуге от настоящего facing, не от сэмпла
            if angle_between_deg(forward, target.center - pose.position) > half_gate {
                continue;
            }
            sink.apply_damage(target.entity, self.damage);
            self.hit_this_swing.insert(target.entity);
            accepted += 1;
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn pose() -> WielderPose {
        WielderPose {
            position: Vec2::ZERO,
            forward: Vec2::Y,
        }
    }

    fn target(index: u32, x: f32, y: f32) -> HurtTarget {
        HurtTarget {
            entity: Entity::from_raw(index),
            center: Vec2::new(x, y),
            radius: 0.4,
        }
    }

    fn run_swing(detector: &mut SweptArcDetector, targets: &[HurtTarget], dt: f32) -> Vec<(Entity, f32)> {
        let mut hits = Vec::new();
        assert!(detector.start_swing());
        let mut guard = 0;
        while detector.is_active() {
            detector.tick(dt, Some(pose()), targets, &mut hits);
            guard += 1;
            assert!(guard < 10_000);
        }
        hits
    }

    #[test]
    fn test_target_in_front_hit_exactly_once() {
        let mut detector = SweptArcDetector::default();
        let targets = [target(1, 0.0, 1.0)];

        let hits = run_swing(&mut detector, &targets, DT);

        assert_eq!(hits, vec![(Entity::from_raw(1), 10.0)]);
    }

    #[test]
    fn test_high_sample_density_still_hits_once() {
        let mut detector = SweptArcDetector {
            sweep_samples: 500,
            ..SweptArcDetector::default()
        };
        let targets = [target(1, 0.0, 1.0)];

        let hits = run_swing(&mut detector, &targets, DT);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_target_behind_is_gated() {
        let mut detector = SweptArcDetector::default();
        let targets = [target(1, 0.0, -0.9)];

        let hits = run_swing(&mut detector, &targets, DT);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_low_tick_rate_does_not_skip_arc() {
        // Цель на краю дуги (≈40° вправо), один огромный тик
        let mut detector = SweptArcDetector::default();
        let edge = rotate_deg(Vec2::Y, -40.0) * 1.2;
        let targets = [target(1, edge.x, edge.y)];

        let hits = run_swing(&mut detector, &targets, 1.0);
        assert_eq!(hits.len(), 1);
        assert!(!detector.is_active());
    }

    #[test]
    fn test_swing_auto_terminates() {
        let mut detector = SweptArcDetector::default();
        let targets: [HurtTarget; 0] = [];
        let mut hits = Vec::new();

        detector.start_swing();
        let ticks = (0.22 / DT).ceil() as usize;
        for _ in 0..ticks - 1 {
            detector.tick(DT, Some(pose()), &targets[..], &mut hits);
        }
        assert!(detector.is_active());
        detector.tick(DT, Some(pose()), &targets[..], &mut hits);
        assert!(!detector.is_active());
    }

    #[test]
    fn test_start_swing_without_shape_is_noop() {
        let mut detector = SweptArcDetector {
            shape: None,
            ..SweptArcDetector::default()
        };
        assert!(!detector.start_swing());
        assert!(!detector.is_active());
    }

    #[test]
    fn test_missing_pose_ends_swing() {
        let mut detector = SweptArcDetector::default();
        let targets = [target(1, 0.0, 1.0)];
        let mut hits = Vec::new();

        detector.start_swing();
        detector.tick(DT, None, &targets[..], &mut hits);

        assert!(!detector.is_active());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_cancel_clears_hit_state() {
        let mut detector = SweptArcDetector::default();
        let targets = [target(1, 0.0, 1.0)];
        let mut hits = Vec::new();

        detector.start_swing();
        while detector.hits_this_swing() == 0 && detector.is_active() {
            detector.tick(DT, Some(pose()), &targets[..], &mut hits);
        }
        assert!(detector.was_hit_this_swing(Entity::from_raw(1)));

        detector.cancel_swing();
        assert!(!detector.is_active());
        assert_eq!(detector.hits_this_swing(), 0);
    }

    #[test]
    fn test_new_swing_can_hit_again() {
        let mut detector = SweptArcDetector::default();
        let targets = [target(1, 0.0, 1.0)];

        let first = run_swing(&mut detector, &targets, DT);
        let second = run_swing(&mut detector, &targets, DT);
        assert_eq!(first.len() + second.len(), 2);
    }

    #[test]
    fn test_sample_box_follows_facing() {
        let detector = SweptArcDetector::default();
        let shape = detector.shape.unwrap();
        let facing_x = WielderPose {
            position: Vec2::new(2.0, 2.0),
            forward: Vec2::X,
        };

        let center_box = detector.sample_box(0.0, shape, facing_x);
        // origin 0.25 + offset.y 0.65 вдоль +X
        assert!((center_box.center - Vec2::new(2.9, 2.0)).length() < 1e-5);
        assert!((center_box.up - Vec2::X).length() < 1e-5);
    }
}
