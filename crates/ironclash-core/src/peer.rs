//! The engine's implementation of the actor boundary.
//!
//! One [`EnginePeer`] lives on each actor thread. Queue methods build up an
//! [`Intention`]; [`BotPeer::commit`] trades it through the [`TurnGate`]
//! for the next tick's feed. Invalid numeric arguments are diagnosed and
//! dropped rather than failing the robot: a buggy robot wastes its own
//! tick, it does not earn an error path it might not handle.

use std::sync::Arc;

use ironclash_api::error::{BotError, BotResult};
use ironclash_api::peer::{BotPeer, TickFeed};
use ironclash_api::robot::Capabilities;
use ironclash_api::snapshot::StatusSnapshot;
use tracing::warn;

use crate::intent::Intention;
use crate::sandbox::Sandbox;
use crate::sync::TurnGate;

/// The per-actor handle handed to [`Bot::new`](ironclash_api::bot::Bot::new)
/// on the actor's thread.
pub struct EnginePeer {
    name: String,
    gate: Arc<TurnGate>,
    intent: Intention,
    status: StatusSnapshot,
    sandbox: Sandbox,
}

impl EnginePeer {
    /// Creates the peer for one actor.
    #[must_use]
    pub fn new(
        name: String,
        gate: Arc<TurnGate>,
        initial_status: StatusSnapshot,
        sandbox: Sandbox,
    ) -> Self {
        Self {
            name,
            gate,
            intent: Intention::default(),
            status: initial_status,
            sandbox,
        }
    }

    fn check_finite(&self, op: &str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            warn!(actor = %self.name, op, value, "dropping non-finite command argument");
            false
        }
    }
}

impl BotPeer for EnginePeer {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.sandbox.capabilities()
    }

    fn queue_move(&mut self, distance: f64) -> BotResult {
        if self.check_finite("move", distance) {
            self.intent.move_distance = Some(distance);
        }
        Ok(())
    }

    fn queue_body_turn(&mut self, radians: f64) -> BotResult {
        if self.check_finite("body_turn", radians) {
            self.intent.body_turn = Some(radians);
        }
        Ok(())
    }

    fn queue_gun_turn(&mut self, radians: f64) -> BotResult {
        if self.check_finite("gun_turn", radians) {
            self.intent.gun_turn = Some(radians);
        }
        Ok(())
    }

    fn queue_radar_turn(&mut self, radians: f64) -> BotResult {
        if self.check_finite("radar_turn", radians) {
            self.intent.radar_turn = Some(radians);
        }
        Ok(())
    }

    fn queue_fire(&mut self, power: f64) -> BotResult {
        if self.check_finite("fire", power) {
            self.intent.fire = Some(power);
        }
        Ok(())
    }

    fn queue_mine(&mut self, power: f64) -> BotResult {
        if self.check_finite("mine", power) {
            self.intent.mine = Some(power);
        }
        Ok(())
    }

    fn set_max_velocity(&mut self, limit: f64) -> BotResult {
        self.sandbox.require(Capabilities::STATUS_EXTENDED)?;
        if self.check_finite("max_velocity", limit) {
            self.intent.max_velocity = Some(limit);
        }
        Ok(())
    }

    fn set_max_body_turn_rate(&mut self, limit: f64) -> BotResult {
        self.sandbox.require(Capabilities::STATUS_EXTENDED)?;
        if self.check_finite("max_body_turn_rate", limit) {
            self.intent.max_body_turn_rate = Some(limit);
        }
        Ok(())
    }

    fn queue_stop(&mut self, overwrite: bool) -> BotResult {
        self.intent.stop = Some(overwrite);
        Ok(())
    }

    fn queue_resume(&mut self) -> BotResult {
        self.intent.resume = true;
        Ok(())
    }

    fn commit(&mut self) -> BotResult<TickFeed> {
        let intent = std::mem::take(&mut self.intent);
        let feed = self.gate.commit(intent).map_err(|_| BotError::Removed)?;
        self.status = feed.status.clone();
        Ok(feed)
    }

    fn status(&self) -> StatusSnapshot {
        self.status.clone()
    }

    fn data_write(&mut self, name: &str, contents: &[u8]) -> BotResult {
        self.sandbox.data_write(name, contents)
    }

    fn data_read(&mut self, name: &str) -> BotResult<Option<Vec<u8>>> {
        self.sandbox.data_read(name)
    }
}
