//! Engine test suite.
//!
//! - `integration.rs`: full battles driven end to end through real actor
//!   threads
//! - `determinism.rs`: equal seeds and entrants give equal snapshot streams
//! - `properties.rs`: property tests over the physics and rules formulas
//! - `helpers.rs`: canned robots and observers

mod determinism;
mod helpers;
mod integration;
mod properties;

pub use helpers::*;
