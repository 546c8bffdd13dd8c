//! The robot-facing handle: event loop, blocking wrappers, conditions.
//!
//! [`Bot`] wraps the engine's [`BotPeer`] and owns the actor-side event
//! queue. The actor thread drives it with [`Bot::process_turn`], which
//! commits the queued intention, absorbs the next tick's feed, and
//! dispatches queued events to the robot's handlers in priority order.
//!
//! Blocking wrappers like [`Bot::ahead`] queue a command and then commit
//! tick after tick until the engine reports the command complete. Called
//! inside an event handler they keep dispatching the simulation, so a robot
//! that drives everything from `on_status` never starves the scheduler.

use tracing::debug;

use crate::condition::Condition;
use crate::error::{BotError, BotResult};
use crate::events::{CustomEvent, Event, MAX_ASSIGNABLE_PRIORITY};
use crate::events::EventKind;
use crate::peer::BotPeer;
use crate::queue::{EventQueue, PriorityTable};
use crate::robot::{Capabilities, Robot};
use crate::snapshot::StatusSnapshot;

/// Sentinel priority meaning "not currently inside a handler".
const NO_HANDLER: i32 = i32::MIN;

/// The handle robot code uses to act and observe.
pub struct Bot {
    peer: Box<dyn BotPeer>,
    queue: EventQueue,
    priorities: PriorityTable,
    conditions: Vec<Condition>,
    interruptible: [bool; (MAX_ASSIGNABLE_PRIORITY + 1) as usize],
    current_priority: i32,
    status: StatusSnapshot,
    tick: u64,
}

impl Bot {
    /// Wraps an engine peer. Called by the engine when it spins up the
    /// actor's thread.
    #[must_use]
    pub fn new(peer: Box<dyn BotPeer>) -> Self {
        let status = peer.status();
        Self {
            peer,
            queue: EventQueue::new(),
            priorities: PriorityTable::default(),
            conditions: Vec::new(),
            interruptible: [false; (MAX_ASSIGNABLE_PRIORITY + 1) as usize],
            current_priority: NO_HANDLER,
            status,
            tick: 0,
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// The actor's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.peer.name()
    }

    /// The actor's declared capability set.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.peer.capabilities()
    }

    /// The status snapshot of the most recently absorbed tick.
    #[must_use]
    pub fn status(&self) -> &StatusSnapshot {
        &self.status
    }

    /// The current tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // =========================================================================
    // Non-blocking command queueing
    // =========================================================================

    /// Queues a move along the body heading. Takes effect at the next
    /// commit.
    pub fn queue_move(&mut self, distance: f64) -> BotResult {
        self.peer.queue_move(distance)
    }

    /// Queues a clockwise body turn.
    pub fn queue_body_turn(&mut self, radians: f64) -> BotResult {
        self.peer.queue_body_turn(radians)
    }

    /// Queues a gun turn, relative to the body.
    pub fn queue_gun_turn(&mut self, radians: f64) -> BotResult {
        self.peer.queue_gun_turn(radians)
    }

    /// Queues a radar turn, relative to the gun.
    pub fn queue_radar_turn(&mut self, radians: f64) -> BotResult {
        self.peer.queue_radar_turn(radians)
    }

    /// Queues a shot for the next tick.
    pub fn queue_fire(&mut self, power: f64) -> BotResult {
        self.peer.queue_fire(power)
    }

    /// Queues a mine placement for the next tick.
    pub fn queue_mine(&mut self, power: f64) -> BotResult {
        self.peer.queue_mine(power)
    }

    /// Caps the actor's speed. Requires [`Capabilities::STATUS_EXTENDED`].
    pub fn set_max_velocity(&mut self, limit: f64) -> BotResult {
        self.peer.set_max_velocity(limit)
    }

    /// Caps the actor's body turn rate. Requires
    /// [`Capabilities::STATUS_EXTENDED`].
    pub fn set_max_body_turn_rate(&mut self, limit: f64) -> BotResult {
        self.peer.set_max_body_turn_rate(limit)
    }

    // =========================================================================
    // Event configuration
    // =========================================================================

    /// Reassigns the delivery priority of a non-reserved event kind.
    /// Reserved kinds and priorities outside `0..=99` are refused.
    pub fn set_event_priority(&mut self, kind: EventKind, priority: i32) -> BotResult {
        if self.priorities.set(kind, priority) {
            Ok(())
        } else {
            Err(BotError::Denied(format!(
                "cannot assign priority {priority} to {kind:?}"
            )))
        }
    }

    /// Marks the priority of the currently running handler as interruptible
    /// (or not). While a handler at an interruptible priority is blocked in
    /// a wrapper like [`Bot::ahead`], the arrival of an event at the same or
    /// higher priority makes the wrapper return
    /// [`BotError::Interrupted`].
    pub fn set_interruptible(&mut self, interruptible: bool) {
        if (0..=MAX_ASSIGNABLE_PRIORITY).contains(&self.current_priority) {
            self.interruptible[self.current_priority as usize] = interruptible;
        }
    }

    /// Registers a custom condition. Requires
    /// [`Capabilities::CUSTOM_EVENTS`]. The condition is evaluated at every
    /// commit; each tick it holds true queues one custom event.
    pub fn add_condition(&mut self, condition: Condition) -> BotResult {
        if !self.capabilities().contains(Capabilities::CUSTOM_EVENTS) {
            return Err(BotError::Denied("custom events capability".into()));
        }
        self.conditions.push(condition);
        Ok(())
    }

    /// Removes all conditions with the given name. Returns how many were
    /// removed.
    pub fn remove_condition(&mut self, name: &str) -> usize {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.name() != name);
        before - self.conditions.len()
    }

    // =========================================================================
    // Data store
    // =========================================================================

    /// Writes a named blob to the sandboxed data store.
    pub fn data_write(&mut self, name: &str, contents: &[u8]) -> BotResult {
        self.peer.data_write(name, contents)
    }

    /// Reads a named blob from the sandboxed data store.
    pub fn data_read(&mut self, name: &str) -> BotResult<Option<Vec<u8>>> {
        self.peer.data_read(name)
    }

    // =========================================================================
    // The commit boundary
    // =========================================================================

    /// Commits the queued intention and absorbs the next tick.
    ///
    /// Returns [`BotError::Interrupted`] when called from inside a handler
    /// at an interruptible priority and an event of the same or higher
    /// priority is now pending. Blocking wrappers call this in a loop, so
    /// the error propagates out of the wrapper to the handler, and the
    /// dispatch loop in [`Bot::process_turn`] absorbs it.
    pub fn execute(&mut self) -> BotResult {
        let feed = self.peer.commit()?;
        self.tick = feed.tick;
        self.status = feed.status;
        let caps = self.capabilities();
        for event in feed.events {
            self.queue.add(event, feed.tick, &self.priorities, caps);
        }
        for cond in &self.conditions {
            if cond.test(&self.status) {
                self.queue.add_with_priority(
                    Event::Custom(CustomEvent {
                        name: cond.name().to_owned(),
                    }),
                    feed.tick,
                    cond.priority(),
                );
            }
        }
        self.queue.prune(feed.tick);

        if self.current_priority != NO_HANDLER {
            let interruptible = (0..=MAX_ASSIGNABLE_PRIORITY)
                .contains(&self.current_priority)
                && self.interruptible[self.current_priority as usize];
            if interruptible {
                if let Some(top) = self.queue.top_priority() {
                    if top >= self.current_priority {
                        debug!(
                            handler_priority = self.current_priority,
                            pending_priority = top,
                            "interrupting blocked handler"
                        );
                        return Err(BotError::Interrupted);
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs one full turn: commit, absorb, then dispatch every queued event
    /// to `robot` in priority order.
    ///
    /// [`BotError::Interrupted`] escaping a handler is absorbed here; the
    /// interrupted handler simply ends and dispatch continues with the event
    /// that caused the interruption. Any other error propagates and takes
    /// the actor out of the round.
    pub fn process_turn(&mut self, robot: &mut dyn Robot) -> BotResult {
        self.execute()?;
        while let Some(queued) = self.queue.pop_top() {
            let previous = self.current_priority;
            self.current_priority = queued.priority;
            let result = self.dispatch(robot, &queued.event);
            self.current_priority = previous;
            match result {
                Ok(()) | Err(BotError::Interrupted) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, robot: &mut dyn Robot, event: &Event) -> BotResult {
        match event {
            Event::Status(ev) => robot.on_status(self, ev),
            Event::ScannedActor(ev) => robot.on_scanned_actor(self, ev),
            Event::HitWall(ev) => robot.on_hit_wall(self, ev),
            Event::HitActor(ev) => robot.on_hit_actor(self, ev),
            Event::HitByProjectile(ev) => robot.on_hit_by_projectile(self, ev),
            Event::ProjectileHit(ev) => robot.on_projectile_hit(self, ev),
            Event::ProjectileHitProjectile(ev) => robot.on_projectile_hit_projectile(self, ev),
            Event::ProjectileMissed(ev) => robot.on_projectile_missed(self, ev),
            Event::ActorDeath(ev) => robot.on_actor_death(self, ev),
            Event::SkippedTurn(ev) => robot.on_skipped_turn(self, ev),
            Event::Custom(ev) => robot.on_custom_event(self, ev),
            Event::Death(ev) => robot.on_death(self, ev),
            Event::Win(ev) => robot.on_win(self, ev),
            Event::RoundEnded(ev) => robot.on_round_ended(self, ev),
            Event::BattleEnded(ev) => robot.on_battle_ended(self, ev),
        }
    }

    // =========================================================================
    // Blocking wrappers
    // =========================================================================

    /// Moves forward the given distance, blocking until the movement
    /// completes (or is cut short by a wall or collision).
    pub fn ahead(&mut self, distance: f64) -> BotResult {
        self.peer.queue_move(distance)?;
        self.execute()?;
        while self.status.distance_remaining != 0.0 {
            self.execute()?;
        }
        Ok(())
    }

    /// Moves backward the given distance, blocking.
    pub fn back(&mut self, distance: f64) -> BotResult {
        self.ahead(-distance)
    }

    /// Turns the body clockwise by `radians`, blocking until done.
    pub fn turn_body(&mut self, radians: f64) -> BotResult {
        self.peer.queue_body_turn(radians)?;
        self.execute()?;
        while self.status.body_turn_remaining != 0.0 {
            self.execute()?;
        }
        Ok(())
    }

    /// Turns the gun clockwise by `radians`, blocking until done.
    pub fn turn_gun(&mut self, radians: f64) -> BotResult {
        self.peer.queue_gun_turn(radians)?;
        self.execute()?;
        while self.status.gun_turn_remaining != 0.0 {
            self.execute()?;
        }
        Ok(())
    }

    /// Turns the radar clockwise by `radians`, blocking until done.
    pub fn turn_radar(&mut self, radians: f64) -> BotResult {
        self.peer.queue_radar_turn(radians)?;
        self.execute()?;
        while self.status.radar_turn_remaining != 0.0 {
            self.execute()?;
        }
        Ok(())
    }

    /// Fires a shot and waits one tick.
    pub fn fire(&mut self, power: f64) -> BotResult {
        self.peer.queue_fire(power)?;
        self.execute()
    }

    /// Places a mine and waits one tick.
    pub fn place_mine(&mut self, power: f64) -> BotResult {
        self.peer.queue_mine(power)?;
        self.execute()
    }

    /// Stops all movement, remembering it for [`Bot::resume`]. Blocks one
    /// tick.
    pub fn stop(&mut self, overwrite: bool) -> BotResult {
        self.peer.queue_stop(overwrite)?;
        self.execute()
    }

    /// Resumes the movement remembered by the last stop. Blocks one tick.
    pub fn resume(&mut self) -> BotResult {
        self.peer.queue_resume()?;
        self.execute()
    }

    /// Does nothing for one tick.
    pub fn do_nothing(&mut self) -> BotResult {
        self.execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{HitWallEvent, ScannedActorEvent, StatusEvent};
    use crate::peer::TickFeed;
    use std::collections::VecDeque;

    /// A scripted peer: each commit pops the next feed off a queue.
    struct MockPeer {
        feeds: VecDeque<TickFeed>,
        caps: Capabilities,
        moves: Vec<f64>,
        fires: Vec<f64>,
    }

    impl MockPeer {
        fn new(feeds: Vec<TickFeed>) -> Self {
            Self {
                feeds: feeds.into(),
                caps: Capabilities::advanced(),
                moves: Vec::new(),
                fires: Vec::new(),
            }
        }
    }

    impl BotPeer for MockPeer {
        fn name(&self) -> &str {
            "mock"
        }
        fn capabilities(&self) -> Capabilities {
            self.caps
        }
        fn queue_move(&mut self, distance: f64) -> BotResult {
            self.moves.push(distance);
            Ok(())
        }
        fn queue_body_turn(&mut self, _radians: f64) -> BotResult {
            Ok(())
        }
        fn queue_gun_turn(&mut self, _radians: f64) -> BotResult {
            Ok(())
        }
        fn queue_radar_turn(&mut self, _radians: f64) -> BotResult {
            Ok(())
        }
        fn queue_fire(&mut self, power: f64) -> BotResult {
            self.fires.push(power);
            Ok(())
        }
        fn queue_mine(&mut self, _power: f64) -> BotResult {
            Ok(())
        }
        fn set_max_velocity(&mut self, _limit: f64) -> BotResult {
            Ok(())
        }
        fn set_max_body_turn_rate(&mut self, _limit: f64) -> BotResult {
            Ok(())
        }
        fn queue_stop(&mut self, _overwrite: bool) -> BotResult {
            Ok(())
        }
        fn queue_resume(&mut self) -> BotResult {
            Ok(())
        }
        fn commit(&mut self) -> BotResult<TickFeed> {
            self.feeds.pop_front().ok_or(BotError::Removed)
        }
        fn status(&self) -> StatusSnapshot {
            StatusSnapshot::default()
        }
        fn data_write(&mut self, _name: &str, _contents: &[u8]) -> BotResult {
            Ok(())
        }
        fn data_read(&mut self, _name: &str) -> BotResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn feed(tick: u64, events: Vec<Event>) -> TickFeed {
        TickFeed {
            tick,
            status: StatusSnapshot {
                tick,
                ..StatusSnapshot::default()
            },
            events,
        }
    }

    fn status_event() -> Event {
        Event::Status(StatusEvent {
            status: StatusSnapshot::default(),
        })
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Robot for Recorder {
        fn on_status(&mut self, _bot: &mut Bot, _ev: &StatusEvent) -> BotResult {
            self.calls.push("status");
            Ok(())
        }
        fn on_scanned_actor(&mut self, _bot: &mut Bot, _ev: &ScannedActorEvent) -> BotResult {
            self.calls.push("scan");
            Ok(())
        }
        fn on_hit_wall(&mut self, _bot: &mut Bot, _ev: &HitWallEvent) -> BotResult {
            self.calls.push("wall");
            Ok(())
        }
    }

    fn scan_event() -> Event {
        Event::ScannedActor(ScannedActorEvent {
            name: "enemy".into(),
            bearing: 0.0,
            distance: 50.0,
            energy: 100.0,
            heading: 0.0,
            velocity: 0.0,
        })
    }

    #[test]
    fn dispatches_in_priority_order() {
        let peer = MockPeer::new(vec![feed(
            1,
            vec![scan_event(), Event::HitWall(HitWallEvent { bearing: 0.0 }), status_event()],
        )]);
        let mut bot = Bot::new(Box::new(peer));
        let mut robot = Recorder::default();
        bot.process_turn(&mut robot).unwrap();
        // status (99), wall (30), scan (10)
        assert_eq!(robot.calls, vec!["status", "wall", "scan"]);
    }

    #[test]
    fn removed_propagates() {
        let peer = MockPeer::new(vec![]);
        let mut bot = Bot::new(Box::new(peer));
        let mut robot = Recorder::default();
        assert_eq!(bot.process_turn(&mut robot), Err(BotError::Removed));
    }

    #[test]
    fn conditions_generate_custom_events() {
        struct CustomCounter(u32);
        impl Robot for CustomCounter {
            fn on_custom_event(&mut self, _bot: &mut Bot, ev: &CustomEvent) -> BotResult {
                assert_eq!(ev.name, "always");
                self.0 += 1;
                Ok(())
            }
        }

        let peer = MockPeer::new(vec![feed(1, vec![]), feed(2, vec![])]);
        let mut bot = Bot::new(Box::new(peer));
        bot.add_condition(Condition::new("always", |_| true)).unwrap();
        let mut robot = CustomCounter(0);
        bot.process_turn(&mut robot).unwrap();
        bot.process_turn(&mut robot).unwrap();
        // Level-triggered: fires each tick it holds.
        assert_eq!(robot.0, 2);
    }

    #[test]
    fn remove_condition_by_name() {
        let peer = MockPeer::new(vec![]);
        let mut bot = Bot::new(Box::new(peer));
        bot.add_condition(Condition::new("a", |_| true)).unwrap();
        bot.add_condition(Condition::new("a", |_| false)).unwrap();
        bot.add_condition(Condition::new("b", |_| true)).unwrap();
        assert_eq!(bot.remove_condition("a"), 2);
        assert_eq!(bot.remove_condition("a"), 0);
    }

    #[test]
    fn set_event_priority_rejects_reserved() {
        let peer = MockPeer::new(vec![]);
        let mut bot = Bot::new(Box::new(peer));
        assert!(bot.set_event_priority(EventKind::ScannedActor, 90).is_ok());
        assert!(bot.set_event_priority(EventKind::Death, 5).is_err());
        assert!(bot.set_event_priority(EventKind::HitWall, 120).is_err());
    }

    #[test]
    fn blocked_handler_is_interrupted_by_equal_priority() {
        // A robot that, on its first scan, marks the priority interruptible
        // and blocks in ahead(). The next feed carries another scan, which
        // must interrupt the blocked wrapper.
        struct Interruptee {
            scans: u32,
            interrupted: bool,
        }
        impl Robot for Interruptee {
            fn on_scanned_actor(&mut self, bot: &mut Bot, _ev: &ScannedActorEvent) -> BotResult {
                self.scans += 1;
                if self.scans == 1 {
                    bot.set_interruptible(true);
                    match bot.ahead(1000.0) {
                        Err(BotError::Interrupted) => {
                            self.interrupted = true;
                            Err(BotError::Interrupted)
                        }
                        other => other,
                    }
                } else {
                    Ok(())
                }
            }
        }

        // Feed 1 has the first scan; the wrapper's commits consume feeds 2
        // and 3, where feed 3 carries a second scan. distance_remaining is
        // nonzero in every scripted status so ahead() keeps committing.
        let moving = |tick: u64, events: Vec<Event>| TickFeed {
            tick,
            status: StatusSnapshot {
                tick,
                distance_remaining: 500.0,
                ..StatusSnapshot::default()
            },
            events,
        };
        let peer = MockPeer::new(vec![
            moving(1, vec![scan_event()]),
            moving(2, vec![]),
            moving(3, vec![scan_event()]),
        ]);
        let mut bot = Bot::new(Box::new(peer));
        let mut robot = Interruptee {
            scans: 0,
            interrupted: false,
        };
        bot.process_turn(&mut robot).unwrap();
        assert!(robot.interrupted);
        // The interrupting scan was dispatched too.
        assert_eq!(robot.scans, 2);
    }
}
