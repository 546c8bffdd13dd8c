//! # Ironclash Core
//!
//! Deterministic turn-based battle engine for Ironclash.
//!
//! The engine runs one thread per robot plus a scheduler thread. Robots
//! implement the [`Robot`](ironclash_api::Robot) contract from
//! `ironclash-api`; this crate supplies the other side of the boundary and
//! the whole simulation: movement physics, weapons, radar, scoring, and
//! round/battle lifecycle.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ironclash_core::{ActorKind, Battle, BattleConfig, Entrant};
//!
//! let mut battle = Battle::new(BattleConfig::default())?;
//! battle.add_entrant(Entrant::new("walls", ActorKind::Advanced, || Box::new(Walls)));
//! battle.add_entrant(Entrant::new("tracker", ActorKind::Advanced, || Box::new(Tracker)));
//! let results = battle.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod battle;
pub mod config;
pub mod error;
pub mod field;
pub mod intent;
pub mod peer;
pub mod physics;
pub mod projectile;
pub mod sandbox;
pub mod score;
pub mod snapshot;
pub mod sync;

pub use actor::{ActorId, ActorKind, ActorState};
pub use battle::{Battle, BattleObserver, Entrant, RobotFactory};
pub use config::BattleConfig;
pub use error::{BattleError, ConfigError};
pub use field::BattleField;
pub use score::{ActorResults, ActorScore};
pub use snapshot::TickSnapshot;

#[cfg(test)]
mod tests;
