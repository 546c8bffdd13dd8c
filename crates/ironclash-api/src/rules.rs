//! Battle rules: the constants and closed-form formulas every actor and the
//! engine agree on.
//!
//! Constants cover rules that never change between battles. Functions cover
//! rules that depend on another quantity (speed, projectile power). The
//! engine reproduces these formulas exactly; robots may call them to plan.
//!
//! # Units
//!
//! Distances are field units per tick, angles are radians, energy is energy
//! points. Heading 0 points along +Y and increases clockwise, so one tick of
//! straight motion is `x += v * sin(h)`, `y += v * cos(h)`.

use std::f64::consts::PI;

// =============================================================================
// Body movement
// =============================================================================

/// Acceleration of an actor when speeding up, in units/tick².
pub const ACCELERATION: f64 = 1.0;

/// Deceleration of an actor when braking, in units/tick².
pub const DECELERATION: f64 = 2.0;

/// The maximum speed of an actor, in units/tick.
pub const MAX_VELOCITY: f64 = 8.0;

/// Maximum body turn rate at zero speed, in radians/tick (10 degrees).
pub const MAX_BODY_TURN_RATE: f64 = 10.0 * PI / 180.0;

/// Gun turn rate, in radians/tick (20 degrees).
pub const GUN_TURN_RATE: f64 = 20.0 * PI / 180.0;

/// Radar turn rate, in radians/tick (45 degrees).
pub const RADAR_TURN_RATE: f64 = 45.0 * PI / 180.0;

/// Side length of an actor's axis-aligned bounding box, in field units.
pub const ACTOR_SIZE: f64 = 36.0;

/// Radar detection radius, in field units.
pub const RADAR_SCAN_RADIUS: f64 = 1200.0;

/// Returns the body turn rate available at a given speed, in radians/tick.
///
/// Steering authority falls off linearly with speed: full rate when
/// stationary, reduced rate at [`MAX_VELOCITY`]. Monotonically decreasing
/// in `|velocity|`.
#[must_use]
pub fn body_turn_rate(velocity: f64) -> f64 {
    (10.0 - 0.75 * velocity.abs()) * PI / 180.0
}

/// Returns the energy lost by an advanced actor hitting a wall at a given
/// speed. Zero below 2 units/tick.
#[must_use]
pub fn wall_hit_damage(velocity: f64) -> f64 {
    (velocity.abs() / 2.0 - 1.0).max(0.0)
}

// =============================================================================
// Bullets
// =============================================================================

/// Minimum bullet power: the least energy that can be put into one shot.
pub const MIN_BULLET_POWER: f64 = 0.1;

/// Maximum bullet power.
pub const MAX_BULLET_POWER: f64 = 3.0;

/// Number of frames a projectile explosion is rendered before the
/// projectile becomes inactive and is reaped.
pub const EXPLOSION_FRAMES: u32 = 17;

/// Returns the damage dealt by a bullet of the given power.
///
/// `4 * power`, plus `2 * (power - 1)` for power above 1. Monotonically
/// increasing in power over the valid range.
#[must_use]
pub fn bullet_damage(power: f64) -> f64 {
    let mut damage = 4.0 * power;
    if power > 1.0 {
        damage += 2.0 * (power - 1.0);
    }
    damage
}

/// Returns the energy returned to a bullet's owner when it hits a victim.
#[must_use]
pub fn bullet_energy_bonus(power: f64) -> f64 {
    3.0 * power
}

/// Returns the speed of a bullet of the given power, in units/tick.
///
/// Power is clamped to the valid range first, so the result is always in
/// `[11, 19.7]`.
#[must_use]
pub fn bullet_speed(power: f64) -> f64 {
    20.0 - 3.0 * power.clamp(MIN_BULLET_POWER, MAX_BULLET_POWER)
}

/// Returns the gun heat generated by firing a bullet of the given power.
/// The gun cannot fire again until its heat has cooled back to zero.
#[must_use]
pub fn gun_heat(power: f64) -> f64 {
    1.0 + power / 5.0
}

// =============================================================================
// Mines
// =============================================================================

/// Minimum mine power: the least energy that can be stored in a mine.
pub const MIN_MINE_POWER: f64 = 5.0;

/// Maximum mine power.
pub const MAX_MINE_POWER: f64 = 15.0;

/// Trigger radius of a floating mine, in field units.
pub const MINE_RADIUS: f64 = 12.0;

/// Returns the damage dealt by a mine of the given power.
///
/// `3 * power`, with a +5 bonus at exactly maximum power.
#[must_use]
pub fn mine_damage(power: f64) -> f64 {
    let mut damage = 3.0 * power;
    if power >= MAX_MINE_POWER {
        damage += 5.0;
    }
    damage
}

/// Returns the energy returned to a mine's owner when it detonates on a
/// victim.
#[must_use]
pub fn mine_energy_bonus(power: f64) -> f64 {
    3.0 * power
}

// =============================================================================
// Ramming
// =============================================================================

/// Energy lost by each actor in an actor-to-actor collision.
pub const RAM_DAMAGE: f64 = 0.6;

/// Score credited per ram to the at-fault actor, 2x the damage inflicted.
pub const RAM_SCORE: f64 = 2.0 * RAM_DAMAGE;

// =============================================================================
// Angles
// =============================================================================

/// Normalizes an angle into `[0, 2*PI)`.
#[must_use]
pub fn normal_absolute_angle(angle: f64) -> f64 {
    let a = angle % (2.0 * PI);
    if a < 0.0 {
        a + 2.0 * PI
    } else {
        a
    }
}

/// Normalizes an angle into `[-PI, PI)`.
#[must_use]
pub fn normal_relative_angle(angle: f64) -> f64 {
    let a = angle % (2.0 * PI);
    if a < -PI {
        a + 2.0 * PI
    } else if a >= PI {
        a - 2.0 * PI
    } else {
        a
    }
}
