//! The engine-facing half of the actor boundary.
//!
//! [`BotPeer`] is what the engine hands to each actor thread: a command
//! queue, a commit boundary, and the sandboxed extras. Robot code never
//! touches it directly; the [`Bot`](crate::bot::Bot) wrapper owns one and
//! layers the event loop and blocking wrappers on top.
//!
//! The trait is object-safe on purpose. The engine supplies the real
//! implementation and tests supply mocks.

use crate::error::BotResult;
use crate::events::Event;
use crate::robot::Capabilities;
use crate::snapshot::StatusSnapshot;

/// Everything the engine publishes to one actor at a commit boundary.
#[derive(Debug, Clone, Default)]
pub struct TickFeed {
    /// The tick that just started.
    pub tick: u64,
    /// The actor's own status as of the end of the previous tick.
    pub status: StatusSnapshot,
    /// Events generated for this actor since its last commit.
    pub events: Vec<Event>,
}

/// The per-actor handle the engine implements.
///
/// All `queue_*` methods only record intent; nothing takes effect until
/// [`commit`](BotPeer::commit) hands the accumulated intention to the
/// scheduler and blocks until the next tick is published.
pub trait BotPeer: Send {
    /// The actor's display name.
    fn name(&self) -> &str;

    /// The actor's declared capability set.
    fn capabilities(&self) -> Capabilities;

    /// Queues a move of `distance` units along the body heading. Negative
    /// distance moves backwards. Replaces any previously queued move.
    fn queue_move(&mut self, distance: f64) -> BotResult;

    /// Queues a clockwise body turn of `radians`. Negative turns
    /// counter-clockwise. Replaces any previously queued body turn.
    fn queue_body_turn(&mut self, radians: f64) -> BotResult;

    /// Queues a gun turn, relative to the body turn already applied.
    fn queue_gun_turn(&mut self, radians: f64) -> BotResult;

    /// Queues a radar turn, relative to the gun turn already applied.
    fn queue_radar_turn(&mut self, radians: f64) -> BotResult;

    /// Queues a shot of the given power for the next tick. No-op with a
    /// diagnostic if power is not finite or not positive; the engine clamps
    /// a positive power into the valid range and refuses the shot if the
    /// gun is hot.
    fn queue_fire(&mut self, power: f64) -> BotResult;

    /// Queues placement of a mine of the given power at the actor's
    /// current position. Non-positive power is refused.
    fn queue_mine(&mut self, power: f64) -> BotResult;

    /// Caps the actor's speed for subsequent ticks. Requires
    /// [`Capabilities::STATUS_EXTENDED`].
    fn set_max_velocity(&mut self, limit: f64) -> BotResult;

    /// Caps the actor's body turn rate for subsequent ticks. Requires
    /// [`Capabilities::STATUS_EXTENDED`].
    fn set_max_body_turn_rate(&mut self, limit: f64) -> BotResult;

    /// Queues a stop, remembering the interrupted movement for a later
    /// resume. With `overwrite` set, discards any previously remembered
    /// movement instead of keeping the oldest.
    fn queue_stop(&mut self, overwrite: bool) -> BotResult;

    /// Queues a resume of the movement remembered by the last stop.
    fn queue_resume(&mut self) -> BotResult;

    /// Commits the queued intention, blocks until the engine publishes the
    /// next tick, and returns that tick's feed.
    ///
    /// Errors with [`BotError::Removed`](crate::error::BotError::Removed)
    /// once the actor is out of the round.
    fn commit(&mut self) -> BotResult<TickFeed>;

    /// The most recently published status snapshot, without committing.
    fn status(&self) -> StatusSnapshot;

    /// Writes a named blob to the actor's persistent data store. Requires
    /// [`Capabilities::DATA_STORE`].
    fn data_write(&mut self, name: &str, contents: &[u8]) -> BotResult;

    /// Reads a named blob from the actor's persistent data store, or `None`
    /// if it does not exist. Requires [`Capabilities::DATA_STORE`].
    fn data_read(&mut self, name: &str) -> BotResult<Option<Vec<u8>>>;
}
