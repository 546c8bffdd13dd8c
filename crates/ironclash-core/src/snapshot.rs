//! Whole-battle snapshots for observers.
//!
//! At the end of every tick the engine publishes an immutable
//! [`TickSnapshot`] describing every live actor and projectile. Observers
//! (renderers, recorders, tests) consume snapshots only; they can never
//! reach live simulation state through one.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::actor::{ActorId, ActorState};

/// One actor's public state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Stable actor id, equal to the entrant index across rounds.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Lifecycle state.
    pub state: ActorState,
    /// Remaining energy.
    pub energy: f64,
    /// Center position.
    pub position: DVec2,
    /// Body heading, radians.
    pub body_heading: f64,
    /// Gun heading, radians.
    pub gun_heading: f64,
    /// Radar heading, radians.
    pub radar_heading: f64,
    /// Signed speed along the body heading.
    pub velocity: f64,
    /// Current gun heat.
    pub gun_heat: f64,
}

/// A bullet in flight (or exploding) at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    /// Owner's actor id.
    pub owner: ActorId,
    /// Current position.
    pub position: DVec2,
    /// Heading, radians.
    pub heading: f64,
    /// Power.
    pub power: f64,
    /// True while the explosion animation frames are still playing.
    pub exploding: bool,
}

/// A placed mine at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineSnapshot {
    /// Owner's actor id.
    pub owner: ActorId,
    /// Position.
    pub position: DVec2,
    /// Power.
    pub power: f64,
    /// True once armed (one tick after placement).
    pub armed: bool,
    /// True while the explosion animation frames are still playing.
    pub exploding: bool,
}

/// Immutable view of the whole battle at the end of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Round number, starting at 0.
    pub round: u32,
    /// Tick number within the round.
    pub tick: u64,
    /// All actors, dead ones included, in id order.
    pub actors: Vec<ActorSnapshot>,
    /// Bullets in flight or exploding.
    pub bullets: Vec<BulletSnapshot>,
    /// Mines placed or exploding.
    pub mines: Vec<MineSnapshot>,
}
