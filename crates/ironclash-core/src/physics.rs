//! Movement physics: velocity stepping, heading updates, wall and
//! actor-to-actor collisions.
//!
//! The velocity rule is the exact-stop formulation: acceleration is 1
//! unit/tick², braking is 2, and the per-tick target speed is chosen so a
//! commanded move lands on its target with no oscillation. A reversal
//! brakes through zero before accelerating the other way.
//!
//! All functions here mutate [`ActorCell`]s and push events into their
//! outboxes; round-level consequences (scoring, death events) are left to
//! the scheduler.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;
use ironclash_api::events::{Event, HitActorEvent, HitWallEvent};
use ironclash_api::rules::{
    body_turn_rate, normal_absolute_angle, normal_relative_angle, wall_hit_damage, ACCELERATION,
    ACTOR_SIZE, DECELERATION, GUN_TURN_RATE, MAX_BODY_TURN_RATE, MAX_VELOCITY, RADAR_TURN_RATE,
    RAM_DAMAGE,
};

use crate::actor::{ActorCell, ActorId, ActorState, StoppedMovement};
use crate::field::BattleField;
use crate::intent::Intention;

/// Velocities closer to zero than this are treated as stopped.
const NEAR_ZERO: f64 = 0.000_000_01;

// =============================================================================
// Velocity
// =============================================================================

/// Steps a velocity one tick toward covering `distance`, under a speed cap.
///
/// Exact-stop rule: the returned speed never overshoots the remaining
/// distance's braking envelope, so repeated application covers `distance`
/// exactly and ends at zero.
#[must_use]
pub fn next_velocity(velocity: f64, distance: f64, max_velocity: f64) -> f64 {
    if distance < 0.0 {
        // Symmetric case: flip, solve, flip back.
        return -next_velocity(-velocity, -distance, max_velocity);
    }
    let goal = if distance == f64::INFINITY {
        max_velocity
    } else {
        max_velocity.min(max_velocity_for(distance))
    };
    if velocity >= 0.0 {
        (velocity + ACCELERATION).min(goal).max(velocity - DECELERATION)
    } else {
        // Moving away from the target: brake through zero. Part of the
        // tick's budget may already accelerate forward.
        (velocity + max_decel(-velocity)).min(goal).max(velocity - ACCELERATION)
    }
}

/// Highest speed from which `distance` can still be covered exactly.
#[must_use]
pub fn max_velocity_for(distance: f64) -> f64 {
    let decel_time = 1.0_f64.max(((((4.0 * 2.0 / DECELERATION) * distance + 1.0).sqrt() - 1.0) / 2.0).ceil());
    if decel_time == f64::INFINITY {
        return MAX_VELOCITY;
    }
    let decel_dist = (decel_time / 2.0) * (decel_time - 1.0) * DECELERATION;
    (decel_time - 1.0) * DECELERATION + (distance - decel_dist) / decel_time
}

/// Speed change available in one tick when reversing from `speed` (> 0):
/// braking for part of the tick, accelerating the other way for the rest.
fn max_decel(speed: f64) -> f64 {
    let decel_time = speed / DECELERATION;
    let accel_time = 1.0 - decel_time;
    decel_time.min(1.0) * DECELERATION + accel_time.max(0.0) * ACCELERATION
}

/// Distance covered while braking from `speed` to a standstill.
#[must_use]
pub fn distance_until_stop(speed: f64, max_velocity: f64) -> f64 {
    let mut speed = speed.abs();
    let mut distance = 0.0;
    while speed > 0.0 {
        speed = next_velocity(speed, 0.0, max_velocity);
        distance += speed;
    }
    distance
}

// =============================================================================
// Intentions
// =============================================================================

/// Folds a committed intention into the actor's outstanding commands.
pub fn apply_intention(cell: &mut ActorCell, intent: &Intention) {
    if let Some(limit) = intent.max_velocity {
        cell.max_velocity = limit.clamp(0.0, MAX_VELOCITY);
    }
    if let Some(limit) = intent.max_body_turn_rate {
        cell.max_body_turn_rate = limit.clamp(0.0, MAX_BODY_TURN_RATE);
    }
    if let Some(distance) = intent.move_distance {
        cell.distance_remaining = distance;
        cell.over_driving = false;
    }
    if let Some(turn) = intent.body_turn {
        cell.body_turn_remaining = turn;
    }
    if let Some(turn) = intent.gun_turn {
        cell.gun_turn_remaining = turn;
    }
    if let Some(turn) = intent.radar_turn {
        cell.radar_turn_remaining = turn;
    }
    if let Some(overwrite) = intent.stop {
        if cell.stopped.is_none() || overwrite {
            cell.stopped = Some(StoppedMovement {
                distance: cell.distance_remaining,
                body_turn: cell.body_turn_remaining,
                gun_turn: cell.gun_turn_remaining,
                radar_turn: cell.radar_turn_remaining,
            });
        }
        cell.distance_remaining = 0.0;
        cell.body_turn_remaining = 0.0;
        cell.gun_turn_remaining = 0.0;
        cell.radar_turn_remaining = 0.0;
    }
    if intent.resume {
        if let Some(saved) = cell.stopped.take() {
            cell.distance_remaining = saved.distance;
            cell.body_turn_remaining = saved.body_turn;
            cell.gun_turn_remaining = saved.gun_turn;
            cell.radar_turn_remaining = saved.radar_turn;
        }
    }
    cell.pending_fire = intent.fire;
    cell.pending_mine = intent.mine;
}

// =============================================================================
// Headings
// =============================================================================

fn step_turn(remaining: &mut f64, rate: f64) -> f64 {
    let turn = remaining.clamp(-rate, rate);
    *remaining -= turn;
    turn
}

/// Applies one tick of body, gun and radar turning. The gun rides the body
/// and the radar rides the gun: a body turn carries both headings without
/// consuming their own remaining turn.
pub fn update_headings(cell: &mut ActorCell) {
    let body_rate = cell.max_body_turn_rate.min(body_turn_rate(cell.velocity));
    let body = step_turn(&mut cell.body_turn_remaining, body_rate);
    cell.body_heading += body;
    cell.gun_heading += body;
    cell.radar_heading += body;

    let gun = step_turn(&mut cell.gun_turn_remaining, GUN_TURN_RATE);
    cell.gun_heading += gun;
    cell.radar_heading += gun;

    let radar = step_turn(&mut cell.radar_turn_remaining, RADAR_TURN_RATE);
    cell.radar_heading += radar;

    cell.body_heading = normal_absolute_angle(cell.body_heading);
    cell.gun_heading = normal_absolute_angle(cell.gun_heading);
    cell.radar_heading = normal_absolute_angle(cell.radar_heading);
}

// =============================================================================
// Movement
// =============================================================================

/// Applies one tick of translation along the body heading.
pub fn update_movement(cell: &mut ActorCell) {
    let mut distance = cell.distance_remaining;
    cell.velocity = next_velocity(cell.velocity, distance, cell.max_velocity);

    if cell.velocity.abs() < NEAR_ZERO && cell.over_driving {
        cell.distance_remaining = 0.0;
        distance = 0.0;
        cell.over_driving = false;
    }
    // Moving toward (or at) the target: note whether stopping now would
    // overshoot, so the overshoot gets cancelled once we do stop.
    if distance * cell.velocity >= 0.0 {
        cell.over_driving = distance_until_stop(cell.velocity, cell.max_velocity) > distance.abs();
    }
    cell.distance_remaining = distance - cell.velocity;

    if cell.velocity != 0.0 {
        cell.position.x += cell.velocity * cell.body_heading.sin();
        cell.position.y += cell.velocity * cell.body_heading.cos();
    }
}

// =============================================================================
// Walls
// =============================================================================

/// Stops and repositions an actor that drove out of the field. Returns
/// true if the impact killed it (wall damage applies to kinds that pay it).
pub fn check_wall_collision(cell: &mut ActorCell, field: &BattleField) -> bool {
    let half = ACTOR_SIZE / 2.0;
    let mut fix = DVec2::ZERO;
    let mut angle = 0.0;
    let mut hit = false;

    if cell.position.x > field.width - half {
        hit = true;
        fix.x = field.width - half - cell.position.x;
        angle = normal_relative_angle(FRAC_PI_2 - cell.body_heading);
    }
    if cell.position.x < half {
        hit = true;
        fix.x = half - cell.position.x;
        angle = normal_relative_angle(-FRAC_PI_2 - cell.body_heading);
    }
    if cell.position.y > field.height - half {
        hit = true;
        fix.y = field.height - half - cell.position.y;
        angle = normal_relative_angle(-cell.body_heading);
    }
    if cell.position.y < half {
        hit = true;
        fix.y = half - cell.position.y;
        angle = normal_relative_angle(PI - cell.body_heading);
    }

    if !hit {
        return false;
    }

    cell.outbox.push(Event::HitWall(HitWallEvent { bearing: angle }));

    // At a non-axis-aligned heading, back out along the travel direction
    // rather than snapping perpendicular to the wall.
    if cell.body_heading % FRAC_PI_2 != 0.0 {
        let tan_heading = cell.body_heading.tan();
        if fix.x == 0.0 {
            fix.x = fix.y * tan_heading;
        } else if fix.y == 0.0 {
            fix.y = fix.x / tan_heading;
        } else if (fix.x / tan_heading).abs() > fix.y.abs() {
            fix.y = fix.x / tan_heading;
        } else if (fix.y * tan_heading).abs() > fix.x.abs() {
            fix.x = fix.y * tan_heading;
        }
    }
    cell.position += fix;
    cell.position = field.clamp_center(cell.position);

    let mut killed = false;
    if cell.kind.takes_wall_damage() {
        let damage = wall_hit_damage(cell.velocity);
        if damage > 0.0 {
            killed = cell.damage(damage);
        }
    }
    cell.distance_remaining = 0.0;
    cell.velocity = 0.0;
    if cell.is_alive() {
        cell.state = ActorState::HitWall;
    }
    killed
}

// =============================================================================
// Ramming
// =============================================================================

/// One at-fault collision, reported to the scheduler for scoring and
/// death handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamOutcome {
    /// The actor that drove into the other.
    pub attacker: ActorId,
    /// The actor driven into.
    pub victim: ActorId,
    /// True if the collision killed the victim.
    pub victim_killed: bool,
    /// True if the collision killed the attacker.
    pub attacker_killed: bool,
}

pub(crate) fn pair_mut(
    cells: &mut [ActorCell],
    a: usize,
    b: usize,
) -> (&mut ActorCell, &mut ActorCell) {
    if a < b {
        let (lo, hi) = cells.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = cells.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Checks actor `i` against every other live actor after its move.
///
/// Only the side moving toward the other is at fault; it rolls its move
/// back, stops, and both sides take ram damage and get a collision event.
pub fn check_actor_collisions(cells: &mut [ActorCell], i: usize) -> Vec<RamOutcome> {
    let mut outcomes = Vec::new();
    if !cells[i].is_alive() {
        return outcomes;
    }
    for j in 0..cells.len() {
        if j == i || !cells[j].is_alive() {
            continue;
        }
        if !cells[i].bounding_box().intersects(&cells[j].bounding_box()) {
            continue;
        }
        let (me, other) = pair_mut(cells, i, j);

        let delta = other.position - me.position;
        let angle = delta.x.atan2(delta.y);
        let bearing = normal_relative_angle(angle - me.body_heading);
        let moving_toward = (me.velocity > 0.0 && bearing.abs() < FRAC_PI_2)
            || (me.velocity < 0.0 && bearing.abs() > FRAC_PI_2);
        if !moving_toward {
            continue;
        }

        // Roll the at-fault move back so actors never interpenetrate
        // further than one tick of travel.
        me.position.x -= me.velocity * me.body_heading.sin();
        me.position.y -= me.velocity * me.body_heading.cos();
        me.velocity = 0.0;
        me.distance_remaining = 0.0;

        let attacker_killed = me.damage(RAM_DAMAGE);
        let victim_killed = other.damage(RAM_DAMAGE);

        me.outbox.push(Event::HitActor(HitActorEvent {
            name: other.name.clone(),
            bearing,
            energy: other.energy,
            at_fault: true,
        }));
        other.outbox.push(Event::HitActor(HitActorEvent {
            name: me.name.clone(),
            bearing: normal_relative_angle(PI + angle - other.body_heading),
            energy: me.energy,
            at_fault: false,
        }));
        if me.is_alive() {
            me.state = ActorState::HitActor;
        }
        if other.is_alive() {
            other.state = ActorState::HitActor;
        }

        outcomes.push(RamOutcome {
            attacker: me.id,
            victim: other.id,
            victim_killed,
            attacker_killed,
        });
    }
    outcomes
}
