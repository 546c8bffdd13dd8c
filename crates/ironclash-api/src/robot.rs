//! The robot contract: capabilities and the event-handler trait.
//!
//! A robot is a bundle of event handlers. There is no free-running main
//! loop; the per-tick [`StatusEvent`](crate::events::StatusEvent) is the
//! place to drive movement, and every handler receives the [`Bot`] handle to
//! queue commands or block on the convenience wrappers.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::bot::Bot;
use crate::error::BotResult;
use crate::events::{
    ActorDeathEvent, BattleEndedEvent, CustomEvent, DeathEvent, HitActorEvent,
    HitByProjectileEvent, HitWallEvent, ProjectileHitEvent, ProjectileHitProjectileEvent,
    ProjectileMissedEvent, RoundEndedEvent, ScannedActorEvent, SkippedTurnEvent, StatusEvent,
    WinEvent,
};

bitflags! {
    /// What an actor is allowed to do and observe.
    ///
    /// Capabilities are declared once at entry and enforced by the engine on
    /// every gated operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        /// Core movement, gun, radar and the standard event set.
        const BASIC = 1 << 0;
        /// Per-tick tuning of movement limits (max velocity, turn rate)
        /// and independent stop/resume state.
        const STATUS_EXTENDED = 1 << 1;
        /// Debug painting hooks on the observer surface.
        const PAINT = 1 << 2;
        /// Keyboard/mouse input forwarding when a UI is attached.
        const INTERACTIVE = 1 << 3;
        /// Team membership and friendly-fire exclusion.
        const TEAM = 1 << 4;
        /// Registration of custom conditions and receipt of custom events.
        const CUSTOM_EVENTS = 1 << 5;
        /// Persistent per-robot data store, sandboxed and quota'd.
        const DATA_STORE = 1 << 6;
    }
}

impl Capabilities {
    /// The minimal capability set every actor holds.
    #[must_use]
    pub fn basic() -> Self {
        Capabilities::BASIC
    }

    /// The full capability set of an advanced actor.
    #[must_use]
    pub fn advanced() -> Self {
        Capabilities::BASIC
            | Capabilities::STATUS_EXTENDED
            | Capabilities::CUSTOM_EVENTS
            | Capabilities::DATA_STORE
    }
}

/// The handler set a robot implements.
///
/// Every handler has a default empty implementation, so a robot overrides
/// only what it cares about. Handlers run on the actor's own thread between
/// commit boundaries; blocking calls on `bot` inside a handler advance the
/// simulation tick by tick and may return
/// [`BotError::Interrupted`](crate::error::BotError::Interrupted) when a
/// same-or-higher-priority event arrives for an interruptible priority.
#[allow(unused_variables)]
pub trait Robot: Send {
    /// Called once per tick with a fresh status snapshot. Drive movement
    /// from here.
    fn on_status(&mut self, bot: &mut Bot, ev: &StatusEvent) -> BotResult {
        Ok(())
    }

    /// The radar swept another actor.
    fn on_scanned_actor(&mut self, bot: &mut Bot, ev: &ScannedActorEvent) -> BotResult {
        Ok(())
    }

    /// The actor drove into a wall.
    fn on_hit_wall(&mut self, bot: &mut Bot, ev: &HitWallEvent) -> BotResult {
        Ok(())
    }

    /// The actor collided with another actor.
    fn on_hit_actor(&mut self, bot: &mut Bot, ev: &HitActorEvent) -> BotResult {
        Ok(())
    }

    /// The actor was hit by someone else's projectile.
    fn on_hit_by_projectile(&mut self, bot: &mut Bot, ev: &HitByProjectileEvent) -> BotResult {
        Ok(())
    }

    /// One of the actor's projectiles hit a victim.
    fn on_projectile_hit(&mut self, bot: &mut Bot, ev: &ProjectileHitEvent) -> BotResult {
        Ok(())
    }

    /// One of the actor's projectiles was destroyed by another projectile.
    fn on_projectile_hit_projectile(
        &mut self,
        bot: &mut Bot,
        ev: &ProjectileHitProjectileEvent,
    ) -> BotResult {
        Ok(())
    }

    /// One of the actor's projectiles left the field.
    fn on_projectile_missed(&mut self, bot: &mut Bot, ev: &ProjectileMissedEvent) -> BotResult {
        Ok(())
    }

    /// Another actor died.
    fn on_actor_death(&mut self, bot: &mut Bot, ev: &ActorDeathEvent) -> BotResult {
        Ok(())
    }

    /// The actor missed a commit boundary and lost a tick.
    fn on_skipped_turn(&mut self, bot: &mut Bot, ev: &SkippedTurnEvent) -> BotResult {
        Ok(())
    }

    /// A registered condition held true.
    fn on_custom_event(&mut self, bot: &mut Bot, ev: &CustomEvent) -> BotResult {
        Ok(())
    }

    /// The actor died this round.
    fn on_death(&mut self, bot: &mut Bot, ev: &DeathEvent) -> BotResult {
        Ok(())
    }

    /// The actor won this round.
    fn on_win(&mut self, bot: &mut Bot, ev: &WinEvent) -> BotResult {
        Ok(())
    }

    /// The round ended.
    fn on_round_ended(&mut self, bot: &mut Bot, ev: &RoundEndedEvent) -> BotResult {
        Ok(())
    }

    /// The battle ended.
    fn on_battle_ended(&mut self, bot: &mut Bot, ev: &BattleEndedEvent) -> BotResult {
        Ok(())
    }
}
