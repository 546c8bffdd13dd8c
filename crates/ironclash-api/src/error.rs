//! Errors surfaced to robot code through the [`Bot`](crate::bot::Bot) handle.
//!
//! All of these are local to one actor. None of them can take down the
//! round: the engine treats `Removed` as the normal shutdown path, treats
//! any other error escaping a robot as that actor's death, and keeps
//! simulating everyone else.

use thiserror::Error;

/// Errors a robot can observe from its own handle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    /// The actor has been removed from the round (death, runaway-turn limit,
    /// or round end). Every subsequent operation fails with this.
    #[error("actor removed from the round")]
    Removed,

    /// The running event handler was preempted by an event of equal or
    /// higher priority. Control-flow only: the dispatch loop absorbs it.
    #[error("event handler interrupted by a higher-priority event")]
    Interrupted,

    /// A capability-gated operation was attempted without the capability.
    #[error("capability denied: {0}")]
    Denied(String),

    /// A sandboxed data-store operation failed (bad name, quota, I/O).
    #[error("data store: {0}")]
    DataStore(String),
}

/// Result alias used throughout the robot contract.
pub type BotResult<T = ()> = Result<T, BotError>;
