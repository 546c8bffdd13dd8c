//! Full battles driven end to end through real actor threads.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ironclash_api::bot::Bot;
use ironclash_api::error::BotResult;
use ironclash_api::events::{BattleEndedEvent, RoundEndedEvent, WinEvent};
use ironclash_api::robot::Robot;
use ironclash_api::rules::ACTOR_SIZE;

use crate::actor::{ActorKind, ActorState};
use crate::battle::{Battle, BattleObserver, Entrant};
use crate::config::BattleConfig;
use crate::error::{BattleError, ConfigError};
use crate::snapshot::TickSnapshot;

use super::{test_config, IdleBot, MoverBot, PanicBot, RecordingObserver, SleepyBot, SpinBot};

fn idle(name: &str) -> Entrant {
    Entrant::new(name, ActorKind::Advanced, || Box::new(IdleBot))
}

#[test]
fn idle_battle_draws_at_the_tick_cap() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle.add_entrant(idle("a")).add_entrant(idle("b"));
    let mut obs = RecordingObserver::default();
    let results = battle.run_with(&mut obs).unwrap();

    assert_eq!(obs.round_ends, vec![(0, 60)]);
    assert_eq!(obs.snapshots.len(), 60);
    // A draw: every survivor places first, nobody gets the survivor bonus.
    for r in &results {
        assert_eq!(r.score.firsts, 1);
        assert_eq!(r.score.last_survivor_bonus, 0.0);
        assert_eq!(r.total, 0.0);
    }
}

#[test]
fn mover_travels_and_everyone_stays_in_bounds() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(Entrant::new("mover", ActorKind::Advanced, || {
            Box::new(MoverBot::new(100.0))
        }))
        .add_entrant(idle("idle"));
    let mut obs = RecordingObserver::default();
    battle.run_with(&mut obs).unwrap();

    // The mover either got moving or slammed straight into a wall.
    assert!(obs
        .snapshots
        .iter()
        .any(|s| s.actors[0].velocity != 0.0 || s.actors[0].state == ActorState::HitWall));

    let half = ACTOR_SIZE / 2.0;
    for snap in &obs.snapshots {
        for actor in &snap.actors {
            assert!(actor.position.x >= half - 1e-9 && actor.position.x <= 800.0 - half + 1e-9);
            assert!(actor.position.y >= half - 1e-9 && actor.position.y <= 600.0 - half + 1e-9);
        }
    }
}

#[test]
fn stalled_robot_is_removed_and_the_other_wins() {
    let config = BattleConfig {
        commit_timeout: Duration::from_millis(1),
        max_ticks: 2000,
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config).unwrap();
    battle
        .add_entrant(Entrant::new("sleepy", ActorKind::Advanced, || {
            Box::new(SleepyBot {
                nap: Duration::from_millis(50),
            })
        }))
        .add_entrant(idle("idle"));
    let results = battle.run().unwrap();

    let winner = &results[0];
    assert_eq!(winner.name, "idle");
    assert_eq!(winner.rank, 1);
    assert_eq!(winner.score.survival, 50.0);
    assert_eq!(winner.score.last_survivor_bonus, 10.0);
    assert_eq!(winner.score.firsts, 1);
    assert_eq!(results[1].name, "sleepy");
    assert_eq!(results[1].total, 0.0);
}

#[test]
fn panicking_robot_is_removed() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(Entrant::new("panicky", ActorKind::Advanced, || {
            Box::new(PanicBot)
        }))
        .add_entrant(idle("idle"));
    let mut obs = RecordingObserver::default();
    let results = battle.run_with(&mut obs).unwrap();

    assert_eq!(results[0].name, "idle");
    assert_eq!(results[0].score.survival, 50.0);
    // The crash ends the round well before the tick cap.
    assert!(obs.round_ends[0].1 < 10);
    let last = obs.snapshots.last().unwrap();
    let panicky = last.actors.iter().find(|a| a.name == "panicky").unwrap();
    assert_eq!(panicky.state, ActorState::Dead);
}

#[test]
fn hot_gun_blocks_firing_until_cooled() {
    let config = BattleConfig {
        gun_cooling_rate: 1.0,
        max_ticks: 30,
        commit_timeout: Duration::from_millis(500),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config).unwrap();
    battle
        .add_entrant(Entrant::new("spinner", ActorKind::Advanced, || {
            Box::new(SpinBot)
        }))
        .add_entrant(idle("idle"));
    let mut obs = RecordingObserver::default();
    battle.run_with(&mut obs).unwrap();

    // Guns start at heat 3 and cool by the rate before each release, so
    // the spinner's standing fire intention first succeeds on tick 3.
    let first_shot = obs.snapshots.iter().position(|s| !s.bullets.is_empty());
    assert_eq!(first_shot, Some(2));
}

#[test]
fn idle_actors_hold_pose_while_ticks_advance() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle.add_entrant(idle("a")).add_entrant(idle("b"));
    let mut obs = RecordingObserver::default();
    battle.run_with(&mut obs).unwrap();

    let first = &obs.snapshots[0];
    for (i, snap) in obs.snapshots.iter().enumerate() {
        assert_eq!(snap.tick, i as u64 + 1);
        for (actor, start) in snap.actors.iter().zip(&first.actors) {
            assert_eq!(actor.position, start.position);
            assert_eq!(actor.body_heading, start.body_heading);
            assert_eq!(actor.velocity, 0.0);
        }
    }
}

#[test]
fn captured_snapshots_survive_later_mutation() {
    #[derive(Default)]
    struct Pinning {
        first: Option<TickSnapshot>,
        first_gun_headings: Vec<f64>,
        last: Option<TickSnapshot>,
    }

    impl BattleObserver for Pinning {
        fn on_tick(&mut self, snapshot: &TickSnapshot) {
            if self.first.is_none() {
                self.first_gun_headings =
                    snapshot.actors.iter().map(|a| a.gun_heading).collect();
                self.first = Some(snapshot.clone());
            }
            self.last = Some(snapshot.clone());
        }
    }

    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(Entrant::new("spinner", ActorKind::Advanced, || {
            Box::new(SpinBot)
        }))
        .add_entrant(idle("idle"));
    let mut obs = Pinning::default();
    battle.run_with(&mut obs).unwrap();

    let first = obs.first.unwrap();
    let last = obs.last.unwrap();
    // The spinner kept turning its gun after the capture...
    assert_ne!(first.actors[0].gun_heading, last.actors[0].gun_heading);
    // ...without that reaching back into the captured snapshot.
    let held: Vec<f64> = first.actors.iter().map(|a| a.gun_heading).collect();
    assert_eq!(held, obs.first_gun_headings);
}

#[test]
fn single_team_ends_the_round_immediately() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(idle("a").with_team(7))
        .add_entrant(idle("b").with_team(7));
    let mut obs = RecordingObserver::default();
    let results = battle.run_with(&mut obs).unwrap();

    assert_eq!(obs.round_ends, vec![(0, 1)]);
    for r in &results {
        assert_eq!(r.score.firsts, 1);
    }
}

#[test]
fn sentinels_are_unranked_and_do_not_hold_the_round_open() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(idle("idle"))
        .add_entrant(Entrant::new("hazard", ActorKind::Sentinel, || {
            Box::new(IdleBot)
        }));
    let mut obs = RecordingObserver::default();
    let results = battle.run_with(&mut obs).unwrap();

    // One contestant group left, so the round is over at once even though
    // the sentinel is alive.
    assert_eq!(obs.round_ends, vec![(0, 1)]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "idle");
}

#[test]
fn plays_every_round_and_reports_standings_once() {
    let config = BattleConfig {
        rounds: 3,
        max_ticks: 4,
        commit_timeout: Duration::from_millis(500),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config).unwrap();
    battle.add_entrant(idle("a")).add_entrant(idle("b"));
    let mut obs = RecordingObserver::default();
    let results = battle.run_with(&mut obs).unwrap();

    assert_eq!(obs.round_ends, vec![(0, 4), (1, 4), (2, 4)]);
    assert_eq!(obs.snapshots.len(), 12);
    assert_eq!(obs.results.as_deref(), Some(results.as_slice()));
}

#[test]
fn duplicate_entrant_names_are_disambiguated() {
    let config = BattleConfig {
        max_ticks: 2,
        commit_timeout: Duration::from_millis(500),
        ..BattleConfig::default()
    };
    let mut battle = Battle::new(config).unwrap();
    battle.add_entrant(idle("idle")).add_entrant(idle("idle"));
    let mut results = battle.run().unwrap();

    results.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(results[0].name, "idle");
    assert_eq!(results[1].name, "idle (2)");
}

#[test]
fn rejects_fewer_than_two_entrants() {
    let mut battle = Battle::new(test_config()).unwrap();
    battle.add_entrant(idle("solo"));
    assert!(matches!(
        battle.run(),
        Err(BattleError::Config(ConfigError::TooFewEntrants(1)))
    ));
}

#[test]
fn winner_hears_win_then_round_ended_then_battle_ended() {
    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<&'static str>>>);

    struct EndWatcher(Log);

    impl Robot for EndWatcher {
        fn on_win(&mut self, _bot: &mut Bot, _ev: &WinEvent) -> BotResult {
            self.0 .0.lock().unwrap().push("win");
            Ok(())
        }
        fn on_round_ended(&mut self, _bot: &mut Bot, _ev: &RoundEndedEvent) -> BotResult {
            self.0 .0.lock().unwrap().push("round");
            Ok(())
        }
        fn on_battle_ended(&mut self, _bot: &mut Bot, _ev: &BattleEndedEvent) -> BotResult {
            self.0 .0.lock().unwrap().push("battle");
            Ok(())
        }
    }

    let log = Log::default();
    let watcher_log = log.clone();
    let mut battle = Battle::new(test_config()).unwrap();
    battle
        .add_entrant(Entrant::new("watcher", ActorKind::Advanced, move || {
            Box::new(EndWatcher(watcher_log.clone()))
        }))
        .add_entrant(Entrant::new("panicky", ActorKind::Advanced, || {
            Box::new(PanicBot)
        }));
    battle.run().unwrap();

    assert_eq!(*log.0.lock().unwrap(), vec!["win", "round", "battle"]);
}
