//! Status snapshots: the immutable per-tick view of an actor's own state.
//!
//! The engine owns the authoritative status and hands the actor's thread a
//! fresh copy at every commit boundary. Mutating the live status afterwards
//! never changes a snapshot that has already been published.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An actor's own state as of the most recently published tick.
///
/// All fields are plain values; holding a snapshot never aliases live
/// simulation state. The `*_remaining` fields report how much of the queued
/// movement/turn commands is still outstanding, which is what the blocking
/// wrappers poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Tick this snapshot was taken at.
    pub tick: u64,
    /// Round number, starting at 0.
    pub round: u32,
    /// Remaining energy.
    pub energy: f64,
    /// Position of the actor's center.
    pub position: DVec2,
    /// Body heading in radians, 0 = +Y, clockwise positive.
    pub body_heading: f64,
    /// Gun heading in radians.
    pub gun_heading: f64,
    /// Radar heading in radians.
    pub radar_heading: f64,
    /// Signed speed along the body heading, in units/tick.
    pub velocity: f64,
    /// Current gun heat; the gun fires only at zero.
    pub gun_heat: f64,
    /// Distance still to travel from the last move command.
    pub distance_remaining: f64,
    /// Body turn still to apply, radians.
    pub body_turn_remaining: f64,
    /// Gun turn still to apply, radians.
    pub gun_turn_remaining: f64,
    /// Radar turn still to apply, radians.
    pub radar_turn_remaining: f64,
    /// Number of other actors still alive.
    pub others: u32,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            round: 0,
            energy: 100.0,
            position: DVec2::ZERO,
            body_heading: 0.0,
            gun_heading: 0.0,
            radar_heading: 0.0,
            velocity: 0.0,
            gun_heat: 0.0,
            distance_remaining: 0.0,
            body_turn_remaining: 0.0,
            gun_turn_remaining: 0.0,
            radar_turn_remaining: 0.0,
            others: 0,
        }
    }
}
