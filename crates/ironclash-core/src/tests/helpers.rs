//! Canned robots and observers for engine tests.

use std::time::Duration;

use ironclash_api::bot::Bot;
use ironclash_api::error::BotResult;
use ironclash_api::events::StatusEvent;
use ironclash_api::robot::Robot;

use crate::battle::BattleObserver;
use crate::config::BattleConfig;
use crate::score::ActorResults;
use crate::snapshot::TickSnapshot;

/// Installs a fmt subscriber once so `RUST_LOG=debug cargo test` shows
/// engine diagnostics. Later calls are no-ops.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A battle config suitable for tests: a generous commit budget so loaded
/// CI machines never skip well-behaved robots, and a short tick cap so a
/// draw ends quickly.
pub fn test_config() -> BattleConfig {
    init_test_logging();
    BattleConfig {
        commit_timeout: Duration::from_millis(500),
        max_ticks: 60,
        ..BattleConfig::default()
    }
}

/// Does nothing, forever.
pub struct IdleBot;

impl Robot for IdleBot {}

/// Drives forward a fixed distance once, then idles.
pub struct MoverBot {
    pub distance: f64,
    moved: bool,
}

impl MoverBot {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            moved: false,
        }
    }
}

impl Robot for MoverBot {
    fn on_status(&mut self, bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
        if self.moved {
            return Ok(());
        }
        self.moved = true;
        bot.ahead(self.distance)
    }
}

/// Spins its gun and pulls the trigger every tick. The engine refuses the
/// shot while the gun is hot, so this fires as fast as cooling allows.
pub struct SpinBot;

impl Robot for SpinBot {
    fn on_status(&mut self, bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
        bot.queue_gun_turn(0.3)?;
        bot.queue_fire(3.0)
    }
}

/// Outruns its commit budget every tick.
pub struct SleepyBot {
    pub nap: Duration,
}

impl Robot for SleepyBot {
    fn on_status(&mut self, _bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
        std::thread::sleep(self.nap);
        Ok(())
    }
}

/// Panics on its first status event.
pub struct PanicBot;

impl Robot for PanicBot {
    fn on_status(&mut self, _bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
        panic!("intentional test panic");
    }
}

/// Records everything the engine publishes.
#[derive(Default)]
pub struct RecordingObserver {
    pub snapshots: Vec<TickSnapshot>,
    pub round_ends: Vec<(u32, u64)>,
    pub results: Option<Vec<ActorResults>>,
}

impl BattleObserver for RecordingObserver {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn on_round_end(&mut self, round: u32, final_tick: u64) {
        self.round_ends.push((round, final_tick));
    }

    fn on_battle_end(&mut self, results: &[ActorResults]) {
        self.results = Some(results.to_vec());
    }
}
