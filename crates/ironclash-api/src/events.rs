//! Battle events: everything the simulation can tell an actor, one record
//! per occurrence per affected actor.
//!
//! Each event kind has a default priority. Priorities `0..=99` can be
//! reassigned per kind through
//! [`Bot::set_event_priority`](crate::bot::Bot::set_event_priority);
//! reserved kinds (status, skipped turn, win, death, round/battle ended)
//! cannot. Delivery order is descending priority, newest first within equal
//! priority.

use serde::{Deserialize, Serialize};

use crate::robot::Capabilities;
use crate::snapshot::StatusSnapshot;

/// Priority of reserved event kinds. Above the assignable `0..=99` range.
pub const RESERVED_PRIORITY: i32 = 100;

/// Priority of the per-tick status event. Reserved.
pub const STATUS_PRIORITY: i32 = 99;

/// Highest priority a robot may assign to a non-reserved event kind.
pub const MAX_ASSIGNABLE_PRIORITY: i32 = 99;

// =============================================================================
// Projectiles
// =============================================================================

/// Which projectile family an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// A fired bullet, travelling in a straight line.
    Bullet,
    /// A placed mine, stationary once armed.
    Mine,
}

// =============================================================================
// Event payloads
// =============================================================================

/// Per-tick status delivery; the "main loop" hook of the handler contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Fresh snapshot of the actor's own state.
    pub status: StatusSnapshot,
}

/// Another actor was swept by this actor's radar this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedActorEvent {
    /// Name of the scanned actor.
    pub name: String,
    /// Bearing to the scanned actor relative to own body heading, radians.
    pub bearing: f64,
    /// Distance to the scanned actor's center.
    pub distance: f64,
    /// Scanned actor's remaining energy.
    pub energy: f64,
    /// Scanned actor's body heading.
    pub heading: f64,
    /// Scanned actor's velocity.
    pub velocity: f64,
}

/// The actor drove into a field wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitWallEvent {
    /// Angle of impact relative to own body heading, radians.
    pub bearing: f64,
}

/// The actor collided with another actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitActorEvent {
    /// Name of the other actor.
    pub name: String,
    /// Bearing to the other actor relative to own body heading, radians.
    pub bearing: f64,
    /// Other actor's energy after the collision.
    pub energy: f64,
    /// True if this actor was moving toward the other (the at-fault side).
    pub at_fault: bool,
}

/// The actor was hit by someone else's projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitByProjectileEvent {
    /// Bullet or mine.
    pub kind: ProjectileKind,
    /// Name of the projectile's owner.
    pub owner: String,
    /// The projectile's power.
    pub power: f64,
    /// Direction the projectile came from, relative to own body heading.
    pub bearing: f64,
}

/// One of the actor's own projectiles hit a victim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileHitEvent {
    /// Bullet or mine.
    pub kind: ProjectileKind,
    /// Name of the victim.
    pub victim: String,
    /// Damage dealt.
    pub damage: f64,
    /// Victim's energy after the hit.
    pub victim_energy: f64,
}

/// One of the actor's own projectiles collided with another projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileHitProjectileEvent {
    /// Bullet or mine (this actor's side).
    pub kind: ProjectileKind,
    /// Owner of the other projectile.
    pub other_owner: String,
}

/// One of the actor's own projectiles left the field without hitting
/// anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileMissedEvent {
    /// Bullet or mine.
    pub kind: ProjectileKind,
}

/// Another actor died this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorDeathEvent {
    /// Name of the dead actor.
    pub name: String,
}

/// The actor failed to reach its commit boundary in time and lost a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTurnEvent {
    /// The tick that was skipped.
    pub skipped_tick: u64,
}

/// A registered condition held true this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    /// Name of the condition that fired.
    pub name: String,
}

/// The actor died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent;

/// The actor (or its team) won the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvent;

/// The round is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundEndedEvent {
    /// Round that ended, starting at 0.
    pub round: u32,
    /// Tick the round ended at.
    pub tick: u64,
}

/// The whole battle is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEndedEvent {
    /// True if the battle was aborted rather than played out.
    pub aborted: bool,
}

// =============================================================================
// Event
// =============================================================================

/// Anything the simulation can report to one actor in one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Per-tick status snapshot.
    Status(StatusEvent),
    /// Radar swept another actor.
    ScannedActor(ScannedActorEvent),
    /// Drove into a wall.
    HitWall(HitWallEvent),
    /// Collided with another actor.
    HitActor(HitActorEvent),
    /// Hit by someone else's projectile.
    HitByProjectile(HitByProjectileEvent),
    /// Own projectile hit a victim.
    ProjectileHit(ProjectileHitEvent),
    /// Own projectile destroyed by another projectile.
    ProjectileHitProjectile(ProjectileHitProjectileEvent),
    /// Own projectile left the field.
    ProjectileMissed(ProjectileMissedEvent),
    /// Another actor died.
    ActorDeath(ActorDeathEvent),
    /// Lost a tick to the inactivity timeout.
    SkippedTurn(SkippedTurnEvent),
    /// A registered condition fired.
    Custom(CustomEvent),
    /// This actor died.
    Death(DeathEvent),
    /// This actor won the round.
    Win(WinEvent),
    /// Round over.
    RoundEnded(RoundEndedEvent),
    /// Battle over.
    BattleEnded(BattleEndedEvent),
}

impl Event {
    /// Returns the kind tag for this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Status(_) => EventKind::Status,
            Event::ScannedActor(_) => EventKind::ScannedActor,
            Event::HitWall(_) => EventKind::HitWall,
            Event::HitActor(_) => EventKind::HitActor,
            Event::HitByProjectile(_) => EventKind::HitByProjectile,
            Event::ProjectileHit(_) => EventKind::ProjectileHit,
            Event::ProjectileHitProjectile(_) => EventKind::ProjectileHitProjectile,
            Event::ProjectileMissed(_) => EventKind::ProjectileMissed,
            Event::ActorDeath(_) => EventKind::ActorDeath,
            Event::SkippedTurn(_) => EventKind::SkippedTurn,
            Event::Custom(_) => EventKind::Custom,
            Event::Death(_) => EventKind::Death,
            Event::Win(_) => EventKind::Win,
            Event::RoundEnded(_) => EventKind::RoundEnded,
            Event::BattleEnded(_) => EventKind::BattleEnded,
        }
    }
}

/// Kind tag for [`Event`], used for priority lookup and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Per-tick status snapshot.
    Status,
    /// Radar swept another actor.
    ScannedActor,
    /// Drove into a wall.
    HitWall,
    /// Collided with another actor.
    HitActor,
    /// Hit by someone else's projectile.
    HitByProjectile,
    /// Own projectile hit a victim.
    ProjectileHit,
    /// Own projectile destroyed by another projectile.
    ProjectileHitProjectile,
    /// Own projectile left the field.
    ProjectileMissed,
    /// Another actor died.
    ActorDeath,
    /// Lost a tick to the inactivity timeout.
    SkippedTurn,
    /// A registered condition fired.
    Custom,
    /// This actor died.
    Death,
    /// This actor won the round.
    Win,
    /// Round over.
    RoundEnded,
    /// Battle over.
    BattleEnded,
}

impl EventKind {
    /// Default delivery priority for this kind.
    #[must_use]
    pub fn default_priority(self) -> i32 {
        match self {
            EventKind::ScannedActor => 10,
            EventKind::HitByProjectile => 20,
            EventKind::HitWall => 30,
            EventKind::HitActor => 40,
            EventKind::ProjectileHit => 50,
            EventKind::ProjectileHitProjectile => 55,
            EventKind::ProjectileMissed => 60,
            EventKind::ActorDeath => 70,
            EventKind::Custom => 80,
            EventKind::Status => STATUS_PRIORITY,
            EventKind::SkippedTurn
            | EventKind::Death
            | EventKind::Win
            | EventKind::RoundEnded
            | EventKind::BattleEnded => RESERVED_PRIORITY,
        }
    }

    /// True for kinds whose priority cannot be reassigned and which survive
    /// stale-event pruning.
    #[must_use]
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            EventKind::Status
                | EventKind::SkippedTurn
                | EventKind::Death
                | EventKind::Win
                | EventKind::RoundEnded
                | EventKind::BattleEnded
        )
    }

    /// The capability an actor must hold to receive this kind at all.
    #[must_use]
    pub fn required_capability(self) -> Capabilities {
        match self {
            EventKind::Custom => Capabilities::CUSTOM_EVENTS,
            _ => Capabilities::BASIC,
        }
    }
}
