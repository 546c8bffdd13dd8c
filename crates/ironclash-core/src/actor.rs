//! Per-actor simulation state.
//!
//! An [`ActorCell`] is the scheduler's authoritative record for one actor:
//! pose, energy, outstanding movement, pending weapon commands, and the
//! gate to its thread. Robot code never sees a cell; it sees snapshots.

use std::sync::Arc;

use glam::DVec2;
use ironclash_api::events::Event;
use ironclash_api::robot::Capabilities;
use ironclash_api::rules::{MAX_BODY_TURN_RATE, MAX_VELOCITY};
use ironclash_api::snapshot::StatusSnapshot;
use serde::{Deserialize, Serialize};

use crate::field::BoundingBox;
use crate::sync::TurnGate;

/// Starting energy of a regular actor.
pub const INITIAL_ENERGY: f64 = 100.0;

/// Starting energy of a sentinel.
pub const SENTINEL_ENERGY: f64 = 400.0;

/// Gun heat every actor starts a round with.
pub const INITIAL_GUN_HEAT: f64 = 3.0;

/// Consecutive skipped turns before an actor is removed from the round.
pub const MAX_CONSECUTIVE_SKIPS: u32 = 30;

/// Stable actor identifier, equal to the entrant index. Identical across
/// rounds of one battle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActorId(pub u64);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What flavor of actor an entrant fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Standard actor: core movement and events only.
    Basic,
    /// Full capability set, but pays energy for hitting walls.
    Advanced,
    /// Arena hazard: high energy, excluded from scoring and from the
    /// contestant count that ends a round.
    Sentinel,
}

impl ActorKind {
    /// Capability set implied by the kind.
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        match self {
            ActorKind::Basic => Capabilities::basic(),
            ActorKind::Advanced | ActorKind::Sentinel => Capabilities::advanced(),
        }
    }

    /// True if wall impacts cost this kind energy.
    #[must_use]
    pub fn takes_wall_damage(self) -> bool {
        matches!(self, ActorKind::Advanced | ActorKind::Sentinel)
    }

    /// True if this kind participates in scoring and round-end counting.
    #[must_use]
    pub fn is_contestant(self) -> bool {
        !matches!(self, ActorKind::Sentinel)
    }

    /// Starting energy for this kind.
    #[must_use]
    pub fn initial_energy(self) -> f64 {
        match self {
            ActorKind::Basic | ActorKind::Advanced => INITIAL_ENERGY,
            ActorKind::Sentinel => SENTINEL_ENERGY,
        }
    }
}

/// Lifecycle state, published in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    /// Alive and unobstructed.
    Active,
    /// Alive, stopped against a wall this tick.
    HitWall,
    /// Alive, stopped against another actor this tick.
    HitActor,
    /// Dead for the rest of the round.
    Dead,
}

/// Movement remembered by a stop, restored by a resume.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoppedMovement {
    /// Remaining move distance.
    pub distance: f64,
    /// Remaining body turn.
    pub body_turn: f64,
    /// Remaining gun turn.
    pub gun_turn: f64,
    /// Remaining radar turn.
    pub radar_turn: f64,
}

/// The scheduler's authoritative per-actor record.
pub struct ActorCell {
    /// Stable id.
    pub id: ActorId,
    /// Display name, unique within the battle.
    pub name: String,
    /// Kind, fixed at entry.
    pub kind: ActorKind,
    /// Team tag; actors sharing a tag neither score off each other nor
    /// count as enemies for round end.
    pub team: Option<u32>,
    /// Lifecycle state.
    pub state: ActorState,
    /// Remaining energy.
    pub energy: f64,
    /// Center position.
    pub position: DVec2,
    /// Body heading, radians, 0 = +Y, clockwise.
    pub body_heading: f64,
    /// Gun heading, radians.
    pub gun_heading: f64,
    /// Radar heading, radians.
    pub radar_heading: f64,
    /// Radar heading at the start of the tick, for the swept-arc scan.
    pub last_radar_heading: f64,
    /// Signed speed along the body heading.
    pub velocity: f64,
    /// Gun heat. Firing is refused while above zero.
    pub gun_heat: f64,
    /// Outstanding move distance, signed.
    pub distance_remaining: f64,
    /// Outstanding body turn, signed radians.
    pub body_turn_remaining: f64,
    /// Outstanding gun turn, signed radians.
    pub gun_turn_remaining: f64,
    /// Outstanding radar turn, signed radians.
    pub radar_turn_remaining: f64,
    /// Speed cap set by the robot.
    pub max_velocity: f64,
    /// Body turn rate cap set by the robot.
    pub max_body_turn_rate: f64,
    /// True while braking past the point where stopping overshoots the
    /// move target.
    pub over_driving: bool,
    /// Movement remembered by the last stop.
    pub stopped: Option<StoppedMovement>,
    /// Bullet power queued for this tick.
    pub pending_fire: Option<f64>,
    /// Mine power queued for this tick.
    pub pending_mine: Option<f64>,
    /// Events generated for this actor since its last feed.
    pub outbox: Vec<Event>,
    /// Consecutive skipped turns.
    pub consecutive_skips: u32,
    /// Gate to the actor's thread.
    pub gate: Arc<TurnGate>,
}

impl ActorCell {
    /// Creates a cell at rest at `position`, facing `heading` with gun and
    /// radar aligned.
    #[must_use]
    pub fn new(
        id: ActorId,
        name: String,
        kind: ActorKind,
        team: Option<u32>,
        position: DVec2,
        heading: f64,
        gate: Arc<TurnGate>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            team,
            state: ActorState::Active,
            energy: kind.initial_energy(),
            position,
            body_heading: heading,
            gun_heading: heading,
            radar_heading: heading,
            last_radar_heading: heading,
            velocity: 0.0,
            gun_heat: INITIAL_GUN_HEAT,
            distance_remaining: 0.0,
            body_turn_remaining: 0.0,
            gun_turn_remaining: 0.0,
            radar_turn_remaining: 0.0,
            max_velocity: MAX_VELOCITY,
            max_body_turn_rate: MAX_BODY_TURN_RATE,
            over_driving: false,
            stopped: None,
            pending_fire: None,
            pending_mine: None,
            outbox: Vec::new(),
            consecutive_skips: 0,
            gate,
        }
    }

    /// True unless dead.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state != ActorState::Dead
    }

    /// Applies damage. Returns true if this killed the actor.
    pub fn damage(&mut self, amount: f64) -> bool {
        self.energy -= amount;
        if self.energy <= 0.0 && self.is_alive() {
            self.kill();
            true
        } else {
            false
        }
    }

    /// Marks the actor dead and freezes its motion.
    pub fn kill(&mut self) {
        self.state = ActorState::Dead;
        self.energy = 0.0;
        self.velocity = 0.0;
        self.distance_remaining = 0.0;
        self.body_turn_remaining = 0.0;
        self.gun_turn_remaining = 0.0;
        self.radar_turn_remaining = 0.0;
        self.pending_fire = None;
        self.pending_mine = None;
    }

    /// Body bounding box at the current position.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::actor(self.position)
    }

    /// True if `other` is on the same team.
    #[must_use]
    pub fn is_teammate(&self, other: &ActorCell) -> bool {
        match (self.team, other.team) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Builds the status snapshot published to the actor's thread.
    #[must_use]
    pub fn status(&self, tick: u64, round: u32, others: u32) -> StatusSnapshot {
        StatusSnapshot {
            tick,
            round,
            energy: self.energy,
            position: self.position,
            body_heading: self.body_heading,
            gun_heading: self.gun_heading,
            radar_heading: self.radar_heading,
            velocity: self.velocity,
            gun_heat: self.gun_heat,
            distance_remaining: self.distance_remaining,
            body_turn_remaining: self.body_turn_remaining,
            gun_turn_remaining: self.gun_turn_remaining,
            radar_turn_remaining: self.radar_turn_remaining,
            others,
        }
    }

    /// True if every scalar in the cell is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.energy.is_finite()
            && self.position.is_finite()
            && self.body_heading.is_finite()
            && self.gun_heading.is_finite()
            && self.radar_heading.is_finite()
            && self.velocity.is_finite()
            && self.gun_heat.is_finite()
            && self.distance_remaining.is_finite()
            && self.body_turn_remaining.is_finite()
            && self.gun_turn_remaining.is_finite()
            && self.radar_turn_remaining.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: ActorKind) -> ActorCell {
        ActorCell::new(
            ActorId(0),
            "t".into(),
            kind,
            None,
            DVec2::new(100.0, 100.0),
            0.0,
            Arc::new(TurnGate::new()),
        )
    }

    #[test]
    fn damage_kills_at_zero() {
        let mut c = cell(ActorKind::Basic);
        assert!(!c.damage(50.0));
        assert!(c.is_alive());
        assert!(c.damage(50.0));
        assert_eq!(c.state, ActorState::Dead);
        assert_eq!(c.energy, 0.0);
        // Already dead: no double kill
        assert!(!c.damage(10.0));
    }

    #[test]
    fn kill_freezes_motion() {
        let mut c = cell(ActorKind::Advanced);
        c.velocity = 8.0;
        c.distance_remaining = 100.0;
        c.pending_fire = Some(3.0);
        c.kill();
        assert_eq!(c.velocity, 0.0);
        assert_eq!(c.distance_remaining, 0.0);
        assert_eq!(c.pending_fire, None);
    }

    #[test]
    fn kind_capabilities() {
        assert!(!ActorKind::Basic
            .capabilities()
            .contains(Capabilities::STATUS_EXTENDED));
        assert!(ActorKind::Advanced
            .capabilities()
            .contains(Capabilities::STATUS_EXTENDED));
        assert!(ActorKind::Advanced.takes_wall_damage());
        assert!(!ActorKind::Basic.takes_wall_damage());
        assert!(!ActorKind::Sentinel.is_contestant());
        assert_eq!(ActorKind::Sentinel.initial_energy(), SENTINEL_ENERGY);
    }

    #[test]
    fn teammates_share_tags() {
        let mut a = cell(ActorKind::Basic);
        let mut b = cell(ActorKind::Basic);
        assert!(!a.is_teammate(&b));
        a.team = Some(1);
        b.team = Some(1);
        assert!(a.is_teammate(&b));
        b.team = Some(2);
        assert!(!a.is_teammate(&b));
    }
}
