//! Battle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest allowed field side.
pub const MIN_FIELD_SIDE: f64 = 400.0;

/// Largest allowed field side.
pub const MAX_FIELD_SIDE: f64 = 5000.0;

/// Everything that parameterizes one battle.
///
/// Validated once at battle start; the engine assumes a validated config
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Field width in field units.
    pub field_width: f64,
    /// Field height in field units.
    pub field_height: f64,
    /// Number of rounds to play.
    pub rounds: u32,
    /// Gun heat removed per tick.
    pub gun_cooling_rate: f64,
    /// Wall-clock budget an actor gets to commit each tick before the
    /// scheduler skips it.
    #[serde(with = "duration_millis")]
    pub commit_timeout: Duration,
    /// Hard tick cap per round. The round is drawn when it is reached.
    pub max_ticks: u64,
    /// Seed for all randomness (placement). Equal seeds and entrant lists
    /// give equal battles.
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            rounds: 1,
            gun_cooling_rate: 0.1,
            commit_timeout: Duration::from_millis(10),
            max_ticks: 5000,
            seed: 0,
        }
    }
}

impl BattleConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side_ok = |s: f64| (MIN_FIELD_SIDE..=MAX_FIELD_SIDE).contains(&s);
        if !side_ok(self.field_width) || !side_ok(self.field_height) {
            return Err(ConfigError::FieldSize {
                width: self.field_width,
                height: self.field_height,
                min: MIN_FIELD_SIDE,
                max: MAX_FIELD_SIDE,
            });
        }
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.gun_cooling_rate <= 0.0 || !self.gun_cooling_rate.is_finite() {
            return Err(ConfigError::CoolingRate(self.gun_cooling_rate));
        }
        if self.commit_timeout.is_zero() {
            return Err(ConfigError::ZeroCommitTimeout);
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::NoTicks);
        }
        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        u64::try_from(d.as_millis())
            .map_err(serde::ser::Error::custom)?
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
