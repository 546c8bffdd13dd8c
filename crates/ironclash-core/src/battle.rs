//! The battle scheduler.
//!
//! One thread per actor plus this scheduler thread. Every tick the
//! scheduler publishes a feed to each live actor, waits a bounded budget
//! for each to commit its intention, then runs the simulation pipeline:
//! intents, weapons, movement, collisions, projectiles, radar, deaths.
//! Actors that miss the budget lose the tick (their stale intention is
//! discarded); actors that miss too many in a row, or whose thread
//! panics, are removed from the round.
//!
//! Determinism: all randomness comes from the seeded placement generator,
//! intents are applied in actor-id order, and actor storage iterates in id
//! order, so two battles with equal configs and entrants produce equal
//! snapshot streams as long as no actor overruns its commit budget.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::DVec2;
use ironclash_api::bot::Bot;
use ironclash_api::error::BotError;
use ironclash_api::events::{
    ActorDeathEvent, BattleEndedEvent, DeathEvent, Event, RoundEndedEvent, ScannedActorEvent,
    SkippedTurnEvent, StatusEvent, WinEvent,
};
use ironclash_api::peer::TickFeed;
use ironclash_api::robot::Robot;
use ironclash_api::rules::{
    normal_relative_angle, ACTOR_SIZE, RADAR_SCAN_RADIUS, RAM_DAMAGE, RAM_SCORE,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::actor::{ActorCell, ActorId, ActorKind, ActorState, MAX_CONSECUTIVE_SKIPS};
use crate::config::BattleConfig;
use crate::error::{BattleError, ConfigError};
use crate::field::BattleField;
use crate::peer::EnginePeer;
use crate::physics;
use crate::projectile::ProjectileEngine;
use crate::sandbox::{Sandbox, DEFAULT_DATA_QUOTA};
use crate::score::{ActorResults, ScoreBoard};
use crate::snapshot::{ActorSnapshot, TickSnapshot};
use crate::sync::{GateWait, TurnGate};

/// Builds a fresh robot instance for each round.
pub type RobotFactory = Arc<dyn Fn() -> Box<dyn Robot> + Send + Sync>;

/// One robot entered into a battle.
#[derive(Clone)]
pub struct Entrant {
    name: String,
    kind: ActorKind,
    team: Option<u32>,
    data_dir: Option<PathBuf>,
    factory: RobotFactory,
}

impl Entrant {
    /// Creates an entrant. The factory is invoked once per round so every
    /// round starts from fresh robot state.
    pub fn new<F>(name: impl Into<String>, kind: ActorKind, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Robot> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            team: None,
            data_dir: None,
            factory: Arc::new(factory),
        }
    }

    /// Puts the entrant on a team. Teammates do not score off each other
    /// and do not count as enemies for ending a round.
    #[must_use]
    pub fn with_team(mut self, team: u32) -> Self {
        self.team = Some(team);
        self
    }

    /// Gives the entrant a persistent data store rooted at `dir`.
    #[must_use]
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }
}

/// Receives the immutable per-tick snapshots. Renderers, recorders and
/// tests implement this.
#[allow(unused_variables)]
pub trait BattleObserver {
    /// Called at the end of every tick.
    fn on_tick(&mut self, snapshot: &TickSnapshot) {}

    /// Called when a round finishes.
    fn on_round_end(&mut self, round: u32, final_tick: u64) {}

    /// Called once after the last round with the final standings.
    fn on_battle_end(&mut self, results: &[ActorResults]) {}
}

struct NullObserver;

impl BattleObserver for NullObserver {}

/// A configured battle, ready to run.
pub struct Battle {
    config: BattleConfig,
    entrants: Vec<Entrant>,
}

impl Battle {
    /// Creates a battle from a validated configuration.
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            entrants: Vec::new(),
        })
    }

    /// Enters a robot into the battle.
    pub fn add_entrant(&mut self, entrant: Entrant) -> &mut Self {
        self.entrants.push(entrant);
        self
    }

    /// Runs the battle to completion and returns the final standings.
    pub fn run(&self) -> Result<Vec<ActorResults>, BattleError> {
        self.run_with(&mut NullObserver)
    }

    /// Runs the battle, feeding every tick snapshot to `observer`.
    pub fn run_with(
        &self,
        observer: &mut dyn BattleObserver,
    ) -> Result<Vec<ActorResults>, BattleError> {
        if self.entrants.len() < 2 {
            return Err(ConfigError::TooFewEntrants(self.entrants.len()).into());
        }
        let field = BattleField::new(self.config.field_width, self.config.field_height);
        let capacity =
            ((field.width / (ACTOR_SIZE * 2.0)) * (field.height / (ACTOR_SIZE * 2.0))) as usize;
        if self.entrants.len() > capacity {
            return Err(ConfigError::FieldTooCrowded {
                actors: self.entrants.len(),
            }
            .into());
        }

        let names = self.unique_names();
        let contestants: Vec<ActorId> = self
            .entrants
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind.is_contestant())
            .map(|(i, _)| ActorId(i as u64))
            .collect();
        let mut scores = ScoreBoard::new(contestants.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        info!(
            entrants = self.entrants.len(),
            rounds = self.config.rounds,
            seed = self.config.seed,
            "battle starting"
        );
        for round in 0..self.config.rounds {
            let last_round = round + 1 == self.config.rounds;
            self.run_round(round, &field, &names, &mut rng, &mut scores, observer, last_round)?;
        }

        let results = scores.results(&names);
        observer.on_battle_end(&results);
        info!("battle finished");
        Ok(results)
    }

    fn unique_names(&self) -> BTreeMap<ActorId, String> {
        let mut seen: BTreeMap<String, u32> = BTreeMap::new();
        let mut names = BTreeMap::new();
        for (i, entrant) in self.entrants.iter().enumerate() {
            let count = seen.entry(entrant.name.clone()).or_insert(0);
            *count += 1;
            let name = if *count == 1 {
                entrant.name.clone()
            } else {
                format!("{} ({})", entrant.name, count)
            };
            names.insert(ActorId(i as u64), name);
        }
        names
    }

    #[allow(clippy::too_many_arguments)]
    fn run_round(
        &self,
        round: u32,
        field: &BattleField,
        names: &BTreeMap<ActorId, String>,
        rng: &mut ChaCha8Rng,
        scores: &mut ScoreBoard,
        observer: &mut dyn BattleObserver,
        last_round: bool,
    ) -> Result<(), BattleError> {
        debug!(round, "round starting");
        let mut cells: Vec<ActorCell> = Vec::new();
        let mut handles = Vec::new();
        let mut spawn_error: Option<BattleError> = None;
        let others = self.entrants.len() as u32 - 1;

        for (idx, entrant) in self.entrants.iter().enumerate() {
            let id = ActorId(idx as u64);
            let name = names[&id].clone();
            let position = place_actor(field, &cells, rng);
            let heading = rng.gen_range(0.0..std::f64::consts::TAU);
            let gate = Arc::new(TurnGate::new());
            let cell = ActorCell::new(
                id,
                name.clone(),
                entrant.kind,
                entrant.team,
                position,
                heading,
                Arc::clone(&gate),
            );

            let sandbox = Sandbox::new(
                entrant.kind.capabilities(),
                entrant.data_dir.clone(),
                DEFAULT_DATA_QUOTA,
            );
            let peer = EnginePeer::new(
                name.clone(),
                Arc::clone(&gate),
                cell.status(0, round, others),
                sandbox,
            );
            let factory = Arc::clone(&entrant.factory);
            match thread::Builder::new()
                .name(format!("actor-{name}"))
                .spawn(move || actor_main(&factory, peer, &gate))
            {
                Ok(handle) => {
                    handles.push(handle);
                    cells.push(cell);
                }
                Err(e) => {
                    spawn_error = Some(BattleError::ActorThread {
                        name,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        // A failed spawn still falls through to teardown below, so the
        // threads already started get halted and joined.
        let result = match spawn_error {
            Some(err) => Err(err),
            None => self.round_loop(round, field, &mut cells, scores, observer, last_round),
        };

        // Teardown: halt every gate, join threads that exit promptly,
        // detach runaways.
        for cell in &cells {
            cell.gate.halt();
        }
        let deadline = Instant::now() + Duration::from_millis(500);
        for (handle, cell) in handles.into_iter().zip(cells.iter()) {
            while !cell.gate.is_exited() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(1));
            }
            if cell.gate.is_exited() {
                let _ = handle.join();
            } else {
                warn!(actor = %cell.name, "actor thread unresponsive at round end, detaching");
                drop(handle);
            }
        }
        scores.end_round();
        result
    }

    fn round_loop(
        &self,
        round: u32,
        field: &BattleField,
        cells: &mut Vec<ActorCell>,
        scores: &mut ScoreBoard,
        observer: &mut dyn BattleObserver,
        last_round: bool,
    ) -> Result<(), BattleError> {
        let mut projectiles = ProjectileEngine::new();
        let mut death_order: Vec<ActorId> = Vec::new();
        let mut tick: u64 = 0;

        loop {
            tick += 1;
            let alive_before: Vec<bool> = cells.iter().map(ActorCell::is_alive).collect();
            let alive_total = alive_before.iter().filter(|a| **a).count() as u32;

            // Publish feeds in id order. Dead actors are woken only while
            // they still have final events (their death) to hear about.
            for cell in cells.iter_mut() {
                let alive = cell.is_alive();
                if !alive && cell.outbox.is_empty() {
                    continue;
                }
                let others = if alive { alive_total - 1 } else { alive_total };
                let status = cell.status(tick, round, others);
                let mut events = std::mem::take(&mut cell.outbox);
                if alive {
                    events.push(Event::Status(StatusEvent {
                        status: status.clone(),
                    }));
                }
                cell.gate.wake(TickFeed { tick, status, events });
            }

            // Wait for commits, enforcing the per-tick budget.
            for cell in cells.iter_mut() {
                if !cell.is_alive() {
                    continue;
                }
                match cell.gate.wait_sleeping(self.config.commit_timeout) {
                    GateWait::Yielded => {
                        cell.consecutive_skips = 0;
                    }
                    GateWait::TimedOut => {
                        cell.gate.skip();
                        cell.consecutive_skips += 1;
                        cell.outbox.push(Event::SkippedTurn(SkippedTurnEvent {
                            skipped_tick: tick,
                        }));
                        debug!(actor = %cell.name, tick, skips = cell.consecutive_skips, "skipped turn");
                        if cell.consecutive_skips >= MAX_CONSECUTIVE_SKIPS {
                            warn!(
                                actor = %cell.name,
                                limit = MAX_CONSECUTIVE_SKIPS,
                                "removed after too many consecutive skipped turns"
                            );
                            cell.kill();
                        }
                    }
                    GateWait::Crashed => {
                        warn!(actor = %cell.name, "robot crashed, removed from the round");
                        cell.kill();
                    }
                }
            }

            // Apply intents in id order.
            for cell in cells.iter_mut() {
                if !cell.is_alive() {
                    continue;
                }
                if let Some(intent) = cell.gate.take_intent() {
                    physics::apply_intention(cell, &intent);
                }
            }

            // Gun cooling and weapon release.
            for cell in cells.iter_mut() {
                if !cell.is_alive() {
                    continue;
                }
                cell.gun_heat = (cell.gun_heat - self.config.gun_cooling_rate).max(0.0);
                projectiles.fire(cell);
                projectiles.place_mine(cell);
            }

            // Movement and collisions, per actor in id order.
            for i in 0..cells.len() {
                if !cells[i].is_alive() {
                    continue;
                }
                {
                    let cell = &mut cells[i];
                    cell.state = ActorState::Active;
                    cell.last_radar_heading = cell.radar_heading;
                    physics::update_headings(cell);
                    physics::update_movement(cell);
                    physics::check_wall_collision(cell, field);
                }
                for ram in physics::check_actor_collisions(cells, i) {
                    let attacker = &cells[ram.attacker.0 as usize];
                    let victim = &cells[ram.victim.0 as usize];
                    let counts = !attacker.is_teammate(victim)
                        && attacker.kind.is_contestant()
                        && victim.kind.is_contestant();
                    if counts {
                        scores.ram_damage(ram.attacker, ram.victim, RAM_DAMAGE, RAM_SCORE);
                        if ram.victim_killed {
                            scores.kill(ram.attacker, ram.victim, true);
                        }
                    }
                }
            }

            projectiles.update(cells, field, scores);

            radar_scan(cells);

            // Deaths since the start of the tick: events and survival
            // scores.
            for i in 0..cells.len() {
                if !alive_before[i] || cells[i].is_alive() {
                    continue;
                }
                death_order.push(cells[i].id);
                cells[i].outbox.push(Event::Death(DeathEvent));
                let dead_name = cells[i].name.clone();
                let dead_is_contestant = cells[i].kind.is_contestant();
                info!(actor = %dead_name, tick, "actor destroyed");
                let mut survivors = Vec::new();
                for cell in cells.iter_mut() {
                    if cell.is_alive() {
                        cell.outbox.push(Event::ActorDeath(ActorDeathEvent {
                            name: dead_name.clone(),
                        }));
                        if cell.kind.is_contestant() {
                            survivors.push(cell.id);
                        }
                    }
                }
                if dead_is_contestant {
                    scores.survival(&survivors);
                }
            }

            // Post-tick invariants. A violation means the engine is
            // broken, so the whole battle aborts.
            let bounds = field.center_bounds();
            for cell in cells.iter().filter(|c| c.is_alive()) {
                if !cell.is_finite() {
                    return Err(BattleError::NonFiniteState {
                        name: cell.name.clone(),
                        tick,
                    });
                }
                if !bounds.contains(cell.position) {
                    return Err(BattleError::OutOfBounds {
                        name: cell.name.clone(),
                        tick,
                        x: cell.position.x,
                        y: cell.position.y,
                    });
                }
            }

            let snapshot = build_snapshot(round, tick, cells, &projectiles);
            observer.on_tick(&snapshot);

            if contestant_groups(cells) <= 1 || tick >= self.config.max_ticks {
                self.finish_round(round, tick, cells, scores, &death_order, last_round);
                observer.on_round_end(round, tick);
                debug!(round, tick, "round over");
                return Ok(());
            }
        }
    }

    fn finish_round(
        &self,
        round: u32,
        tick: u64,
        cells: &mut [ActorCell],
        scores: &mut ScoreBoard,
        death_order: &[ActorId],
        last_round: bool,
    ) {
        let won = contestant_groups(cells) == 1
            && cells.iter().any(|c| c.is_alive() && c.kind.is_contestant());
        let winners: Vec<ActorId> = cells
            .iter()
            .filter(|c| c.is_alive() && c.kind.is_contestant())
            .map(|c| c.id)
            .collect();
        let contestant_count = cells.iter().filter(|c| c.kind.is_contestant()).count();

        if won {
            let enemies = (contestant_count - winners.len()) as u32;
            for id in &winners {
                scores.last_survivor(*id, enemies);
            }
        } else {
            // Drawn round: survivors still place first.
            for id in &winners {
                scores.placement(*id, 1);
            }
        }
        let mut place = winners.len() as u32 + 1;
        for id in death_order.iter().rev() {
            if cells[id.0 as usize].kind.is_contestant() {
                scores.placement(*id, place);
                place += 1;
            }
        }

        // Equal-priority events dispatch newest first, so push in reverse
        // of the order the robot should handle them: win, round end,
        // battle end.
        for cell in cells.iter_mut() {
            if !cell.is_alive() {
                continue;
            }
            if last_round {
                cell.outbox
                    .push(Event::BattleEnded(BattleEndedEvent { aborted: false }));
            }
            cell.outbox
                .push(Event::RoundEnded(RoundEndedEvent { round, tick }));
            if won && cell.kind.is_contestant() {
                cell.outbox.push(Event::Win(WinEvent));
            }
        }

        // One final feed so round-end events reach the actor threads
        // before their gates are halted.
        let alive_total = cells.iter().filter(|c| c.is_alive()).count() as u32;
        for cell in cells.iter_mut() {
            if cell.outbox.is_empty() {
                continue;
            }
            let others = alive_total.saturating_sub(u32::from(cell.is_alive()));
            let status = cell.status(tick, round, others);
            let events = std::mem::take(&mut cell.outbox);
            cell.gate.wake(TickFeed {
                tick: tick + 1,
                status,
                events,
            });
        }
    }
}

fn actor_main(factory: &RobotFactory, peer: EnginePeer, gate: &Arc<TurnGate>) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut robot = (**factory)();
        let mut bot = Bot::new(Box::new(peer));
        loop {
            match bot.process_turn(robot.as_mut()) {
                Ok(()) => {}
                Err(BotError::Removed) => break,
                Err(err) => {
                    warn!(actor = bot.name(), error = %err, "robot error, leaving the round");
                    gate.report_crash();
                    break;
                }
            }
        }
    }));
    if result.is_err() {
        gate.report_crash();
    }
    gate.mark_exited();
}

/// Picks a spawn position not overlapping any already-placed actor. Falls
/// back to the least bad candidate if the field is tight.
fn place_actor(field: &BattleField, placed: &[ActorCell], rng: &mut ChaCha8Rng) -> DVec2 {
    let bounds = field.center_bounds();
    let mut best = bounds.min;
    let mut best_clearance = f64::NEG_INFINITY;
    for _ in 0..200 {
        let candidate = DVec2::new(
            rng.gen_range(bounds.min.x..=bounds.max.x),
            rng.gen_range(bounds.min.y..=bounds.max.y),
        );
        let clearance = placed
            .iter()
            .map(|c| c.position.distance(candidate))
            .fold(f64::INFINITY, f64::min);
        if clearance >= ACTOR_SIZE * 2.0 {
            return candidate;
        }
        if clearance > best_clearance {
            best_clearance = clearance;
            best = candidate;
        }
    }
    best
}

/// Number of distinct opposing sides still alive: teams count once,
/// teamless contestants count individually. Sentinels never count.
fn contestant_groups(cells: &[ActorCell]) -> usize {
    let mut groups = BTreeSet::new();
    for cell in cells.iter().filter(|c| c.is_alive() && c.kind.is_contestant()) {
        match cell.team {
            Some(team) => groups.insert((0u8, u64::from(team))),
            None => groups.insert((1u8, cell.id.0)),
        };
    }
    groups.len()
}

/// Sweeps each live actor's radar arc over every other live actor. The
/// radar only sees while it moves: a stationary radar scans nothing.
fn radar_scan(cells: &mut [ActorCell]) {
    let mut scans: Vec<(usize, ScannedActorEvent)> = Vec::new();
    for (i, scanner) in cells.iter().enumerate() {
        if !scanner.is_alive() {
            continue;
        }
        let sweep = normal_relative_angle(scanner.radar_heading - scanner.last_radar_heading);
        if sweep == 0.0 {
            continue;
        }
        for (j, target) in cells.iter().enumerate() {
            if i == j || !target.is_alive() {
                continue;
            }
            let to = target.position - scanner.position;
            let distance = to.length();
            if distance > RADAR_SCAN_RADIUS {
                continue;
            }
            let angle = to.x.atan2(to.y);
            let rel = normal_relative_angle(angle - scanner.last_radar_heading);
            let within = if sweep > 0.0 {
                (0.0..=sweep).contains(&rel)
            } else {
                (sweep..=0.0).contains(&rel)
            };
            if !within {
                continue;
            }
            scans.push((
                i,
                ScannedActorEvent {
                    name: target.name.clone(),
                    bearing: normal_relative_angle(angle - scanner.body_heading),
                    distance,
                    energy: target.energy,
                    heading: target.body_heading,
                    velocity: target.velocity,
                },
            ));
        }
    }
    for (i, scan) in scans {
        cells[i].outbox.push(Event::ScannedActor(scan));
    }
}

fn build_snapshot(
    round: u32,
    tick: u64,
    cells: &[ActorCell],
    projectiles: &ProjectileEngine,
) -> TickSnapshot {
    let (bullets, mines) = projectiles.snapshots();
    TickSnapshot {
        round,
        tick,
        actors: cells
            .iter()
            .map(|c| ActorSnapshot {
                id: c.id,
                name: c.name.clone(),
                state: c.state,
                energy: c.energy,
                position: c.position,
                body_heading: c.body_heading,
                gun_heading: c.gun_heading,
                radar_heading: c.radar_heading,
                velocity: c.velocity,
                gun_heat: c.gun_heat,
            })
            .collect(),
        bullets,
        mines,
    }
}
