//! The per-tick intention an actor commits.
//!
//! An intention is pure data. The actor thread fills one in between commit
//! boundaries; the scheduler takes it at the boundary and applies it before
//! physics. Fields are `Option` so an absent command leaves the previous
//! remaining movement untouched.

/// Everything one actor asked for this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intention {
    /// New move target in units along the body heading. Replaces any
    /// outstanding movement.
    pub move_distance: Option<f64>,
    /// New body turn in radians, clockwise positive. Replaces any
    /// outstanding body turn.
    pub body_turn: Option<f64>,
    /// New gun turn in radians, relative to the body.
    pub gun_turn: Option<f64>,
    /// New radar turn in radians, relative to the gun.
    pub radar_turn: Option<f64>,
    /// New speed cap.
    pub max_velocity: Option<f64>,
    /// New body turn rate cap.
    pub max_body_turn_rate: Option<f64>,
    /// Bullet power to fire this tick.
    pub fire: Option<f64>,
    /// Mine power to place this tick.
    pub mine: Option<f64>,
    /// Stop request; the payload is the `overwrite` flag.
    pub stop: Option<bool>,
    /// Resume the movement remembered by the last stop.
    pub resume: bool,
}

impl Intention {
    /// True if the intention carries no commands at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Intention::default()
    }
}
