//! Tests for local avoidance steering.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::avoidance::{AvoidanceSteering, SteerContext, SteerOutcome};
    use super::super::kinematic::resolve_step;
    use crate::navigation::{CastHit, ObstacleMap, ObstacleProbe};

    /// Пустая арена 20×20
    fn open_map() -> ObstacleMap {
        ObstacleMap::open(20, 20, 1.0)
    }

    /// Стена на колонке x = 5
    fn wall_map() -> ObstacleMap {
        let row = ".....#....\n";
        ObstacleMap::from_ascii(&row.repeat(10), 1.0).unwrap()
    }

    fn ctx(x: f32, y: f32, speed: f32) -> SteerContext {
        SteerContext {
            position: Vec2::new(x, y),
            current_speed: speed,
        }
    }

    /// Probe который говорит "всё заблокировано", но контакта не сообщает
    struct BlindWalls;

    impl ObstacleProbe for BlindWalls {
        fn circle_cast(&self, _: Vec2, _: f32, _: Vec2, _: f32) -> Option<CastHit> {
            None
        }

        fn clearance01(&self, _: Vec2, _: f32, _: Vec2, _: f32) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_zero_speed_returns_zero_for_any_direction() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        for dir in [Vec2::X, Vec2::NEG_Y, Vec2::new(0.3, -0.9), Vec2::ZERO] {
            let v = steering.steer(&map, ctx(10.0, 10.0, 1.0), dir, 0.0, Vec2::new(15.0, 10.0), 0.016);
            assert_eq!(v, Vec2::ZERO);
        }
        assert_eq!(steering.last_outcome(), SteerOutcome::Idle);
    }

    #[test]
    fn test_degenerate_direction_returns_zero() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        let v = steering.steer(&map, ctx(10.0, 10.0, 1.0), Vec2::new(0.001, 0.0), 5.0, Vec2::ZERO, 0.016);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn test_open_field_keeps_course() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        let v = steering.steer(&map, ctx(10.0, 10.0, 1.0), Vec2::X, 4.0, Vec2::new(16.0, 10.0), 0.016);

        assert!((v - Vec2::new(4.0, 0.0)).length() < 1e-4, "v = {:?}", v);
        assert_eq!(steering.last_outcome(), SteerOutcome::Fan);
    }

    #[test]
    fn test_fan_leans_toward_target() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        // Хотим +X, цель строго сверху: выигрывает крайний луч веера (+45°)
        let v = steering.steer(&map, ctx(10.0, 10.0, 1.0), Vec2::X, 1.0, Vec2::new(10.0, 18.0), 0.016);

        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!((v - expected).length() < 1e-3, "v = {:?}", v);
    }

    #[test]
    fn test_fully_blocked_slides_along_wall() {
        let map = wall_map();
        let mut steering = AvoidanceSteering::default();

        // Впритык к стене: все лучи веера ниже hard block
        let v = steering.steer(&map, ctx(4.5, 5.0, 1.0), Vec2::X, 3.0, Vec2::new(8.0, 5.0), 0.016);

        assert_eq!(steering.last_outcome(), SteerOutcome::WallSlide);
        assert!(v.x.abs() < 1e-3, "slide должен идти вдоль стены: {:?}", v);
        assert!((v.length() - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_touching_wall_steers_away_from_it() {
        let map = wall_map();
        let mut steering = AvoidanceSteering::default();
        // Тело 0.4 легально стоит в 0.41 от стены, steering радиус 0.42 её задевает
        let mut position = Vec2::new(4.59, 5.0);
        let dt = 1.0 / 60.0;

        let v = steering.steer(&map, ctx(position.x, position.y, 0.0), Vec2::NEG_X, 4.5, Vec2::new(1.0, 5.0), dt);
        assert_eq!(steering.last_outcome(), SteerOutcome::Fan);
        assert!((v - Vec2::new(-4.5, 0.0)).length() < 1e-3, "v = {:?}", v);

        for _ in 0..10 {
            let v = steering.steer(&map, ctx(position.x, position.y, 4.5), Vec2::NEG_X, 4.5, Vec2::new(1.0, 5.0), dt);
            assert_eq!(steering.last_outcome(), SteerOutcome::Fan);
            position = resolve_step(Some(&map), position, v * dt, 0.4);
        }

        assert!(position.x < 4.0, "position = {:?}", position);
        assert!((position.y - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_fallback_turn_without_contact() {
        let mut steering = AvoidanceSteering::default();

        let v = steering.steer(&BlindWalls, ctx(0.0, 0.0, 1.0), Vec2::X, 2.0, Vec2::new(5.0, 0.0), 0.016);

        assert_eq!(steering.last_outcome(), SteerOutcome::FallbackTurn);
        assert!((v - Vec2::new(0.0, 2.0)).length() < 1e-3, "v = {:?}", v);
    }

    #[test]
    fn test_smoothing_blends_with_previous_choice() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        steering.steer(&map, ctx(10.0, 10.0, 1.0), Vec2::X, 1.0, Vec2::new(16.0, 10.0), 0.016);
        let v = steering.steer(&map, ctx(10.0, 10.0, 1.0), Vec2::Y, 1.0, Vec2::new(10.0, 16.0), 0.016);

        // lerp(X, Y, 0.8): ещё немного тянет в +X
        assert!(v.x > 0.05, "v = {:?}", v);
        assert!(v.y > v.x);
        assert!((v.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_stuck_detector_forces_perpendicular() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();
        let target = Vec2::new(16.0, 10.0);

        // Стоим на месте (current_speed = 0), хотя хотим двигаться
        for _ in 0..3 {
            steering.steer(&map, ctx(10.0, 10.0, 0.0), Vec2::X, 2.0, target, 0.1);
            assert_ne!(steering.last_outcome(), SteerOutcome::Unstuck);
        }
        let heading = steering.last_direction();

        let v = steering.steer(&map, ctx(10.0, 10.0, 0.0), Vec2::X, 2.0, target, 0.1);

        assert_eq!(steering.last_outcome(), SteerOutcome::Unstuck);
        assert_eq!(steering.stuck_timer(), 0.0);
        assert!(v.normalize().dot(heading).abs() < 1e-3, "ожидали перпендикуляр: {:?}", v);
    }

    #[test]
    fn test_slow_desired_speed_still_counts_as_stuck() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();
        let target = Vec2::new(16.0, 10.0);

        for _ in 0..3 {
            steering.steer(&map, ctx(10.0, 10.0, 0.0), Vec2::X, 0.005, target, 0.1);
        }
        assert!((steering.stuck_timer() - 0.3).abs() < 1e-4);

        steering.steer(&map, ctx(10.0, 10.0, 0.0), Vec2::X, 0.005, target, 0.1);
        assert_eq!(steering.last_outcome(), SteerOutcome::Unstuck);
    }

    #[test]
    fn test_moving_agent_never_accumulates_stuck_time() {
        let map = open_map();
        let mut steering = AvoidanceSteering::default();

        for _ in 0..20 {
            steering.steer(&map, ctx(10.0, 10.0, 3.0), Vec2::X, 3.0, Vec2::new(16.0, 10.0), 0.1);
        }
        assert_eq!(steering.stuck_timer(), 0.0);
    }

    #[test]
    fn test_unstuck_prefers_clearer_side() {
        // Стена сверху (y = 6), агент под ней, идём вправо
        let map = ObstacleMap::from_ascii(
            "..........\n\
             ..........\n\
             ..........\n\
             ##########\n\
             ..........\n\
             ..........\n\
             ..........",
            1.0,
        )
        .unwrap();
        let mut steering = AvoidanceSteering::default();
        let target = Vec2::new(9.0, 2.4);

        for _ in 0..3 {
            steering.steer(&map, ctx(3.0, 2.4, 0.0), Vec2::X, 1.0, target, 0.1);
        }
        let v = steering.steer(&map, ctx(3.0, 2.4, 0.0), Vec2::X, 1.0, target, 0.1);

        assert_eq!(steering.last_outcome(), SteerOutcome::Unstuck);
        // Вверху стена, значит уходим вниз
        assert!(v.y < -0.99, "v = {:?}", v);
    }
}
