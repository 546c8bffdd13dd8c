//! Property tests over the physics and rules formulas.

use std::f64::consts::PI;
use std::sync::Arc;

use glam::DVec2;
use ironclash_api::rules::{
    body_turn_rate, bullet_damage, bullet_speed, normal_absolute_angle, normal_relative_angle,
    ACTOR_SIZE, DECELERATION, MAX_VELOCITY,
};
use proptest::prelude::*;

use crate::actor::{ActorCell, ActorId, ActorKind};
use crate::field::BattleField;
use crate::physics::{check_wall_collision, next_velocity};
use crate::sync::TurnGate;

proptest! {
    #[test]
    fn velocity_step_is_bounded(v in -8.0..8.0f64, d in -500.0..500.0f64) {
        let next = next_velocity(v, d, MAX_VELOCITY);
        prop_assert!((next - v).abs() <= DECELERATION + 1e-9);
        prop_assert!(next.abs() <= MAX_VELOCITY + 1e-9);
    }

    #[test]
    fn commanded_move_completes_without_overshoot(d in 0.1..300.0f64) {
        let mut v = 0.0;
        let mut remaining = d;
        for _ in 0..400 {
            v = next_velocity(v, remaining, MAX_VELOCITY);
            remaining -= v;
            prop_assert!(remaining > -1e-6);
            if v == 0.0 && remaining.abs() < 1e-9 {
                break;
            }
        }
        prop_assert!(remaining.abs() < 1e-6);
        prop_assert!(v.abs() < 1e-6);
    }

    #[test]
    fn wall_collision_keeps_the_actor_on_the_field(
        x in -200.0..1000.0f64,
        y in -200.0..800.0f64,
        heading in 0.0..(2.0 * PI),
        v in -8.0..8.0f64,
    ) {
        let field = BattleField::new(800.0, 600.0);
        let mut cell = ActorCell::new(
            ActorId(0),
            "p".into(),
            ActorKind::Advanced,
            None,
            DVec2::new(x, y),
            heading,
            Arc::new(TurnGate::new()),
        );
        cell.velocity = v;
        check_wall_collision(&mut cell, &field);
        let half = ACTOR_SIZE / 2.0;
        prop_assert!(cell.position.x >= half - 1e-9);
        prop_assert!(cell.position.x <= 800.0 - half + 1e-9);
        prop_assert!(cell.position.y >= half - 1e-9);
        prop_assert!(cell.position.y <= 600.0 - half + 1e-9);
    }

    #[test]
    fn bullet_damage_is_monotone_in_power(a in 0.1..3.0f64, b in 0.1..3.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(bullet_damage(lo) <= bullet_damage(hi) + 1e-12);
    }

    #[test]
    fn bullet_speed_stays_in_range(power in -10.0..10.0f64) {
        let speed = bullet_speed(power);
        prop_assert!((11.0..=19.7 + 1e-9).contains(&speed));
    }

    #[test]
    fn turn_rate_is_monotone_decreasing_in_speed(a in 0.0..8.0f64, b in 0.0..8.0f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(body_turn_rate(hi) <= body_turn_rate(lo) + 1e-12);
    }

    #[test]
    fn relative_angle_is_normalized(angle in -100.0..100.0f64) {
        let n = normal_relative_angle(angle);
        prop_assert!((-PI..PI).contains(&n));
        // Same direction modulo a full turn.
        let turns = (angle - n) / (2.0 * PI);
        prop_assert!((turns - turns.round()).abs() < 1e-6);
    }

    #[test]
    fn absolute_angle_is_normalized(angle in -100.0..100.0f64) {
        let n = normal_absolute_angle(angle);
        prop_assert!((0.0..2.0 * PI).contains(&n));
    }
}
