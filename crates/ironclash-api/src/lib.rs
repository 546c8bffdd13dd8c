//! # Ironclash API
//!
//! The robot contract for Ironclash battles.
//!
//! Robot authors depend on this crate alone. It defines the
//! [`Robot`](robot::Robot) handler trait, the [`Bot`](bot::Bot) handle
//! robots act through, the event model, and the shared battle rules. The
//! `ironclash-core` engine implements the other side of the
//! [`BotPeer`](peer::BotPeer) boundary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ironclash_api::{Bot, BotResult, Robot, StatusEvent};
//!
//! struct Spinner;
//!
//! impl Robot for Spinner {
//!     fn on_status(&mut self, bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
//!         bot.turn_body(std::f64::consts::FRAC_PI_4)?;
//!         bot.ahead(50.0)
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bot;
pub mod condition;
pub mod error;
pub mod events;
pub mod peer;
pub mod queue;
pub mod robot;
pub mod rules;
pub mod snapshot;

pub use bot::Bot;
pub use condition::Condition;
pub use error::{BotError, BotResult};
pub use events::{Event, EventKind, ProjectileKind, StatusEvent};
pub use peer::{BotPeer, TickFeed};
pub use robot::{Capabilities, Robot};
pub use snapshot::StatusSnapshot;
