//! The commit boundary between the scheduler thread and one actor thread.
//!
//! Each actor gets one [`TurnGate`]. The actor side blocks in
//! [`TurnGate::commit`] until the scheduler publishes the next tick's feed;
//! the scheduler side blocks in [`TurnGate::wait_sleeping`] with a bounded
//! timeout, so a stalled robot costs the battle at most the commit budget
//! per tick.
//!
//! The gate is also where skips are enforced: after a skip the actor's
//! stale intention is discarded at its next commit, so a late command never
//! leaks into a later tick.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use ironclash_api::peer::TickFeed;

use crate::intent::Intention;

/// What [`TurnGate::wait_sleeping`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateWait {
    /// The actor committed within the budget.
    Yielded,
    /// The actor is still running; skip it this tick.
    TimedOut,
    /// The actor thread panicked.
    Crashed,
}

#[derive(Default)]
struct GateState {
    feed: Option<TickFeed>,
    intent: Option<Intention>,
    sleeping: bool,
    discard_pending: bool,
    halted: bool,
    crashed: bool,
    exited: bool,
}

/// One actor's side channel to the scheduler.
pub struct TurnGate {
    state: Mutex<GateState>,
    to_actor: Condvar,
    to_engine: Condvar,
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnGate {
    /// Creates a fresh gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            to_actor: Condvar::new(),
            to_engine: Condvar::new(),
        }
    }

    // =========================================================================
    // Actor side
    // =========================================================================

    /// Hands the tick's intention to the scheduler and blocks until the
    /// next feed is published.
    ///
    /// If the actor was skipped since its last commit, the intention is
    /// discarded instead of stored. Errors once the gate is halted.
    pub fn commit(&self, intent: Intention) -> Result<TickFeed, GateHalted> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        // A feed published before the halt (round-end events) still gets
        // delivered; only the commit after it fails.
        if state.halted && state.feed.is_none() {
            return Err(GateHalted);
        }
        if !state.halted {
            if state.discard_pending {
                state.discard_pending = false;
            } else {
                state.intent = Some(intent);
            }
        }
        state.sleeping = true;
        self.to_engine.notify_one();

        loop {
            if let Some(feed) = state.feed.take() {
                state.sleeping = false;
                return Ok(feed);
            }
            if state.halted {
                state.sleeping = false;
                return Err(GateHalted);
            }
            state = self
                .to_actor
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Called from the actor thread's panic handler.
    pub fn report_crash(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.crashed = true;
        self.to_engine.notify_one();
    }

    /// Marks the actor thread as having returned. The scheduler joins
    /// exited threads and detaches the rest.
    pub fn mark_exited(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.exited = true;
        self.to_engine.notify_one();
    }

    // =========================================================================
    // Scheduler side
    // =========================================================================

    /// Publishes the next tick's feed and wakes the actor.
    ///
    /// If the previous feed was never consumed (the actor was skipped), its
    /// undelivered events are carried forward in front of the new ones.
    pub fn wake(&self, mut feed: TickFeed) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stale) = state.feed.take() {
            let mut events = stale.events;
            events.extend(feed.events);
            feed.events = events;
        }
        state.feed = Some(feed);
        self.to_actor.notify_one();
    }

    /// Blocks until the actor commits, crashes, or the budget elapses.
    pub fn wait_sleeping(&self, budget: Duration) -> GateWait {
        let deadline = std::time::Instant::now() + budget;
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if state.crashed {
                return GateWait::Crashed;
            }
            if state.sleeping && state.feed.is_none() {
                return GateWait::Yielded;
            }
            let now = std::time::Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now).filter(|d| !d.is_zero())
            else {
                return GateWait::TimedOut;
            };
            let (guard, _) = self
                .to_engine
                .wait_timeout(state, remaining)
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
        }
    }

    /// Takes the committed intention, if any.
    #[must_use]
    pub fn take_intent(&self) -> Option<Intention> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.intent.take()
    }

    /// Records a skip: the actor's next commit discards its stale
    /// intention instead of delivering it.
    pub fn skip(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.intent = None;
        state.discard_pending = true;
    }

    /// Shuts the gate down. Every blocked or future [`TurnGate::commit`]
    /// returns an error, which the peer surfaces as removal.
    pub fn halt(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.halted = true;
        self.to_actor.notify_all();
        self.to_engine.notify_all();
    }

    /// True once the actor thread has returned.
    #[must_use]
    pub fn is_exited(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .exited
    }

    /// True once the actor thread has panicked.
    #[must_use]
    pub fn is_crashed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .crashed
    }
}

/// The gate has been halted; the actor is out of the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateHalted;
