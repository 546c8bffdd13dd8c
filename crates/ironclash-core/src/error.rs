//! Engine-side errors.
//!
//! Robot misbehavior is never an engine error; it is handled in-simulation
//! (skipped turns, removal, death). These types cover the failures that
//! invalidate a battle itself.

use thiserror::Error;

/// Rejected battle configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Field dimensions outside the supported range.
    #[error("field size {width}x{height} outside {min}..={max}")]
    FieldSize {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
        /// Smallest allowed side.
        min: f64,
        /// Largest allowed side.
        max: f64,
    },

    /// A battle needs at least one round.
    #[error("round count must be at least 1")]
    NoRounds,

    /// Gun cooling rate must be positive or guns never recharge.
    #[error("gun cooling rate {0} is not positive")]
    CoolingRate(f64),

    /// A zero commit budget would skip every robot every tick.
    #[error("commit timeout must be non-zero")]
    ZeroCommitTimeout,

    /// A round needs at least one tick.
    #[error("tick cap must be at least 1")]
    NoTicks,

    /// Too few entrants to fight.
    #[error("need at least 2 entrants, got {0}")]
    TooFewEntrants(usize),

    /// The field cannot hold this many actors without overlap.
    #[error("field too small to place {actors} actors")]
    FieldTooCrowded {
        /// Number of actors requested.
        actors: usize,
    },
}

/// A simulation invariant was violated mid-battle.
///
/// These abort the battle. Any of them means engine state is corrupt, not
/// that a robot did something odd.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// The battle was misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An actor's state stopped being finite.
    #[error("actor {name} has non-finite state at tick {tick}")]
    NonFiniteState {
        /// Actor name.
        name: String,
        /// Tick at which the check failed.
        tick: u64,
    },

    /// An actor's center left the legal placement region.
    #[error("actor {name} escaped the field at tick {tick}: ({x}, {y})")]
    OutOfBounds {
        /// Actor name.
        name: String,
        /// Tick at which the check failed.
        tick: u64,
        /// Offending x coordinate.
        x: f64,
        /// Offending y coordinate.
        y: f64,
    },

    /// The scheduler lost contact with an actor thread in a way that is
    /// not the normal crash/skip path.
    #[error("actor thread for {name} failed: {reason}")]
    ActorThread {
        /// Actor name.
        name: String,
        /// What went wrong.
        reason: String,
    },
}
