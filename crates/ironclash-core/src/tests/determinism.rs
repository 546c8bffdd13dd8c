//! Equal seeds and entrants must give equal battles.
//!
//! The commit budget here is generous so no robot is ever skipped; a skip
//! is wall-clock dependent and breaks replay by construction.

use std::time::Duration;

use crate::actor::ActorKind;
use crate::battle::{Battle, Entrant};
use crate::config::BattleConfig;

use super::{init_test_logging, IdleBot, MoverBot, RecordingObserver, SpinBot};

fn scripted_battle(seed: u64) -> RecordingObserver {
    init_test_logging();
    let config = BattleConfig {
        seed,
        max_ticks: 40,
        gun_cooling_rate: 1.0,
        commit_timeout: Duration::from_millis(500),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config).unwrap();
    battle
        .add_entrant(Entrant::new("mover", ActorKind::Advanced, || {
            Box::new(MoverBot::new(75.0))
        }))
        .add_entrant(Entrant::new("spinner", ActorKind::Advanced, || {
            Box::new(SpinBot)
        }))
        .add_entrant(Entrant::new("idle", ActorKind::Advanced, || {
            Box::new(IdleBot)
        }));
    let mut obs = RecordingObserver::default();
    battle.run_with(&mut obs).unwrap();
    obs
}

#[test]
fn equal_seeds_give_equal_snapshot_streams() {
    let a = scripted_battle(42);
    let b = scripted_battle(42);
    assert_eq!(a.snapshots.len(), b.snapshots.len());
    assert_eq!(a.snapshots, b.snapshots);
    assert_eq!(a.round_ends, b.round_ends);
    assert_eq!(a.results, b.results);
}

#[test]
fn different_seeds_place_actors_differently() {
    let a = scripted_battle(1);
    let b = scripted_battle(2);
    let first_a = &a.snapshots[0].actors[0];
    let first_b = &b.snapshots[0].actors[0];
    assert_ne!(first_a.position, first_b.position);
}
